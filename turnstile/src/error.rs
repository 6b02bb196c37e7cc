//! Errors raised while authorizing a request

use thiserror::Error;
use turnstile_jose::{
    error::{JwtVerifyError, KeyRejected},
    jwks::KeyId,
};

/// Indicates that the signing certificate could not be obtained
#[derive(Debug, Error)]
pub enum KeyFetchError {
    /// The JWKS endpoint could not be reached or returned an unsuccessful status
    #[error("JWKS request failed")]
    Request(#[from] reqwest::Error),

    /// The response body is not a JSON key set document
    #[error("JWKS response is not a valid key set")]
    InvalidDocument(#[source] reqwest::Error),

    /// The key set holds no keys
    #[error("JWKS holds no keys")]
    EmptyKeySet,

    /// The selected key has no `x5c` certificate chain
    #[error("selected key has no x5c certificate chain")]
    MissingCertificateChain,

    /// No key in the set carries the key ID named by the token
    #[error("no key in the JWKS matches key ID '{0}'")]
    NoMatchingKey(KeyId),

    /// The leaf certificate of the selected key cannot be used
    #[error("selected key holds an unusable certificate")]
    InvalidCertificate(#[source] KeyRejected),
}

/// Indicates why a request was not authorized
///
/// Callers never observe these; every one of them becomes a Deny decision.
#[derive(Debug, Error)]
pub enum AuthorizeError {
    /// The request carried no authorization header
    #[error("authorization header missing")]
    MissingHeader,

    /// The authorization header does not hold a bearer token
    #[error("authorization header is not a bearer token")]
    MalformedHeader,

    /// The signing certificate could not be obtained
    #[error("unable to obtain signing certificate")]
    KeyFetch(#[from] KeyFetchError),

    /// The token signature does not match the signing certificate
    #[error("token signature does not match signing certificate")]
    InvalidSignature,

    /// The token is past its expiration time
    #[error("token expired")]
    ExpiredToken,

    /// The token is signed with an algorithm other than the approved one
    #[error("token signed with an unapproved algorithm")]
    AlgorithmMismatch,

    /// The token is malformed or its claims were rejected
    #[error("invalid token")]
    InvalidToken(#[source] JwtVerifyError),
}

impl From<JwtVerifyError> for AuthorizeError {
    fn from(err: JwtVerifyError) -> Self {
        if err.is_signature_mismatch() {
            Self::InvalidSignature
        } else if err.is_expired() {
            Self::ExpiredToken
        } else if err.is_algorithm_mismatch() {
            Self::AlgorithmMismatch
        } else {
            Self::InvalidToken(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use color_eyre::Result;
    use turnstile_jose::{
        jwa,
        jwt::{Claims, Headers, Subject},
        sign::SigningKey,
        Certificate,
    };

    use super::*;

    fn verify(key: &SigningKey, alg: jwa::Algorithm, claims: &Claims) -> Result<JwtVerifyError> {
        let cert = Certificate::from_x5c(&key.x5c_entry()?)?;
        let token = key.sign_token(&Headers::new(alg), claims)?;
        let validator = turnstile_jose::jwt::Validator::default()
            .add_approved_algorithm(jwa::Algorithm::RS256)
            .require_subject();

        Ok(token.verify(&cert, &validator).unwrap_err())
    }

    #[test]
    fn maps_signature_mismatch() -> Result<()> {
        let signer = SigningKey::generate()?;
        let trusted = SigningKey::generate()?;
        let cert = Certificate::from_x5c(&trusted.x5c_entry()?)?;
        let token = signer.sign_token(
            &Headers::new(jwa::Algorithm::RS256),
            &Claims::new().with_subject(Subject::from_static("x")),
        )?;
        let validator = turnstile_jose::jwt::Validator::default()
            .add_approved_algorithm(jwa::Algorithm::RS256);

        let err = AuthorizeError::from(token.verify(&cert, &validator).unwrap_err());
        assert!(matches!(err, AuthorizeError::InvalidSignature));
        Ok(())
    }

    #[test]
    fn maps_unapproved_algorithm() -> Result<()> {
        let key = SigningKey::generate()?;
        let err = verify(&key, jwa::Algorithm::HS256, &Claims::new())?;
        assert!(matches!(
            AuthorizeError::from(err),
            AuthorizeError::AlgorithmMismatch
        ));
        Ok(())
    }

    #[test]
    fn maps_expiration() -> Result<()> {
        let key = SigningKey::generate()?;
        let claims = Claims::new()
            .with_subject(Subject::from_static("x"))
            .with_expiration(turnstile_jose::clock::UnixTime(1));
        let err = verify(&key, jwa::Algorithm::RS256, &claims)?;
        assert!(matches!(AuthorizeError::from(err), AuthorizeError::ExpiredToken));
        Ok(())
    }

    #[test]
    fn other_rejections_keep_their_source() -> Result<()> {
        let key = SigningKey::generate()?;
        let err = AuthorizeError::from(verify(&key, jwa::Algorithm::RS256, &Claims::new())?);

        assert!(matches!(err, AuthorizeError::InvalidToken(_)));
        assert!(err.source().is_some());
        Ok(())
    }
}
