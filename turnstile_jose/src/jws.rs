//! JSON Web Signature (JWS) verification
//!
//! The specifications for this standard can be found in [RFC7515][].
//!
//! [RFC7515]: https://tools.ietf.org/html/rfc7515

use std::error::Error as StdError;

use crate::jwa;

/// A JWS verifier
pub trait Verifier {
    /// The error returned on a failure to verify
    type Error: StdError + Send + Sync + 'static;

    /// Whether the specific algorithm provided is compatible
    /// with this verifier
    fn can_verify(&self, alg: jwa::Algorithm) -> bool;

    /// Attempts to verify the data against the signature using the
    /// specified algorithm
    fn verify(&self, alg: jwa::Algorithm, data: &[u8], signature: &[u8])
        -> Result<(), Self::Error>;
}

impl<V: Verifier + ?Sized> Verifier for &'_ V {
    type Error = V::Error;

    #[inline]
    fn can_verify(&self, alg: jwa::Algorithm) -> bool {
        V::can_verify(self, alg)
    }

    #[inline]
    fn verify(
        &self,
        alg: jwa::Algorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), Self::Error> {
        V::verify(self, alg, data, signature)
    }
}
