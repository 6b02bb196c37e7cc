//! X.509 signing certificates
//!
//! Identity providers publish the certificates of their signing keys in the
//! `x5c` member of each JWK: a chain of base64 (standard alphabet, padded)
//! DER certificates, leaf first. [`pem_frame`] turns one such entry into a
//! PEM document, and [`Certificate`] extracts the RSA public key from it.

use std::fmt;

use x509_parser::{pem::parse_x509_pem, prelude::*, public_key::PublicKey};

use crate::{error, jwa, jws};

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";
const PEM_LINE_WIDTH: usize = 64;

/// Wraps a base64 certificate (such as an `x5c` chain entry) in PEM
/// certificate framing
///
/// Whitespace in the payload is dropped and the payload is re-wrapped onto
/// lines of 64 characters.
///
/// ```
/// use turnstile_jose::cert::pem_frame;
///
/// assert_eq!(
///     pem_frame("TUlJQw=="),
///     "-----BEGIN CERTIFICATE-----\nTUlJQw==\n-----END CERTIFICATE-----\n",
/// );
/// ```
#[must_use]
pub fn pem_frame(base64_der: &str) -> String {
    let payload: Vec<char> = base64_der.chars().filter(|c| !c.is_whitespace()).collect();

    let mut pem = String::with_capacity(
        PEM_BEGIN.len() + PEM_END.len() + payload.len() + payload.len() / PEM_LINE_WIDTH + 3,
    );
    pem.push_str(PEM_BEGIN);
    pem.push('\n');
    for line in payload.chunks(PEM_LINE_WIDTH) {
        pem.extend(line);
        pem.push('\n');
    }
    pem.push_str(PEM_END);
    pem.push('\n');
    pem
}

/// An X.509 certificate holding an RSA signing key
#[derive(Clone, PartialEq, Eq)]
#[must_use]
pub struct Certificate {
    subject: String,
    /// PKCS#1 `RSAPublicKey`, as found in the certificate's subject public key info
    public_key: Vec<u8>,
}

impl Certificate {
    /// Parses a PEM encoded certificate
    ///
    /// # Errors
    ///
    /// The PEM document is malformed, or does not hold an X.509 certificate
    /// with an RSA public key.
    pub fn from_pem(pem: &str) -> Result<Self, error::KeyRejected> {
        let (_, pem) = parse_x509_pem(pem.as_bytes())
            .map_err(|e| error::key_rejected(format!("invalid PEM: {e}")))?;

        if pem.label != "CERTIFICATE" {
            return Err(error::key_rejected(format!(
                "expected a CERTIFICATE PEM block, found {}",
                pem.label
            )));
        }

        Self::from_der(&pem.contents)
    }

    /// Parses a base64 encoded certificate, such as an `x5c` chain entry
    ///
    /// # Errors
    ///
    /// The entry is not valid base64, or does not hold an X.509 certificate
    /// with an RSA public key.
    pub fn from_x5c(entry: &str) -> Result<Self, error::KeyRejected> {
        Self::from_pem(&pem_frame(entry))
    }

    /// Parses a DER encoded certificate
    ///
    /// # Errors
    ///
    /// The data is not an X.509 certificate with an RSA public key.
    pub fn from_der(der: &[u8]) -> Result<Self, error::KeyRejected> {
        let (_, cert) = X509Certificate::from_der(der)
            .map_err(|e| error::key_rejected(format!("invalid X.509 certificate: {e}")))?;

        let spki = cert.public_key();
        match spki.parsed() {
            Ok(PublicKey::RSA(_)) => {}
            Ok(_) => {
                return Err(error::key_rejected(
                    "certificate does not hold an RSA public key",
                ))
            }
            Err(e) => {
                return Err(error::key_rejected(format!(
                    "invalid subject public key: {e}"
                )))
            }
        }

        Ok(Self {
            subject: cert.subject().to_string(),
            public_key: spki.subject_public_key.data.to_vec(),
        })
    }

    /// The distinguished name of the certificate subject
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

impl jws::Verifier for Certificate {
    type Error = error::JwkVerifyError;

    fn can_verify(&self, alg: jwa::Algorithm) -> bool {
        alg.rsa_verification_params().is_some()
    }

    fn verify(
        &self,
        alg: jwa::Algorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), Self::Error> {
        let params = alg
            .rsa_verification_params()
            .ok_or_else(|| error::incompatible_algorithm(alg))?;

        ring::signature::UnparsedPublicKey::new(params, &self.public_key)
            .verify(data, signature)
            .map_err(|_| error::signature_mismatch())?;

        Ok(())
    }
}
