//! JSON Web Algorithms (JWA) identifiers
//!
//! The specifications for these algorithms can be found in [RFC7518][].
//! Every registered signing algorithm can be named in a token header so that
//! a disallowed algorithm is reported as such, but only the RSA family can
//! be verified against a certificate.
//!
//! [RFC7518]: https://tools.ietf.org/html/rfc7518

use std::fmt;

use serde::{Deserialize, Serialize};

/// A JWS signing algorithm, as named in the `alg` header
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
#[non_exhaustive]
pub enum Algorithm {
    /// HMAC using SHA-256
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
    /// RSASSA-PKCS1-v1_5 using SHA-256
    RS256,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    RS384,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    RS512,
    /// RSASSA-PSS using SHA-256 and MGF1 with SHA-256
    PS256,
    /// RSASSA-PSS using SHA-384 and MGF1 with SHA-384
    PS384,
    /// RSASSA-PSS using SHA-512 and MGF1 with SHA-512
    PS512,
    /// ECDSA using P-256 and SHA-256
    ES256,
    /// ECDSA using P-384 and SHA-384
    ES384,
    /// ECDSA using P-521 and SHA-512
    ES512,
    /// Unsecured token, no signature
    #[serde(rename = "none")]
    None,
}

impl Algorithm {
    pub(crate) fn rsa_verification_params(
        self,
    ) -> Option<&'static ring::signature::RsaParameters> {
        match self {
            Self::RS256 => Some(&ring::signature::RSA_PKCS1_2048_8192_SHA256),
            Self::RS384 => Some(&ring::signature::RSA_PKCS1_2048_8192_SHA384),
            Self::RS512 => Some(&ring::signature::RSA_PKCS1_2048_8192_SHA512),
            Self::PS256 => Some(&ring::signature::RSA_PSS_2048_8192_SHA256),
            Self::PS384 => Some(&ring::signature::RSA_PSS_2048_8192_SHA384),
            Self::PS512 => Some(&ring::signature::RSA_PSS_2048_8192_SHA512),
            _ => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
            Self::PS256 => "PS256",
            Self::PS384 => "PS384",
            Self::PS512 => "PS512",
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
            Self::ES512 => "ES512",
            Self::None => "none",
        };

        f.write_str(s)
    }
}
