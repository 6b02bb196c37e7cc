//! Common errors

#![allow(missing_copy_implementations)]

use std::error::Error as StdError;

use thiserror::Error;

/// The certificate holds a key that cannot verify the requested algorithm
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("key incompatible with algorithm '{alg}'")]
pub struct IncompatibleAlgorithm {
    alg: crate::jwa::Algorithm,
}

#[inline]
pub(crate) fn incompatible_algorithm(alg: crate::jwa::Algorithm) -> IncompatibleAlgorithm {
    IncompatibleAlgorithm { alg }
}

/// The token does not split into exactly three dot-separated sections
#[derive(Clone, Copy, Debug, Error)]
#[error("malformed JWT")]
pub struct MalformedJwt {
    _p: (),
}

pub(crate) const fn malformed_jwt() -> MalformedJwt {
    MalformedJwt { _p: () }
}

/// The header section is not base64url encoded JSON naming a known algorithm
#[derive(Debug, Error)]
#[error("malformed JWT header")]
pub struct MalformedJwtHeader {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn malformed_jwt_header(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> MalformedJwtHeader {
    MalformedJwtHeader {
        source: source.into(),
    }
}

/// The payload section is not base64url encoded JSON claims
#[derive(Debug, Error)]
#[error("malformed JWT payload")]
pub struct MalformedJwtPayload {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn malformed_jwt_payload(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> MalformedJwtPayload {
    MalformedJwtPayload {
        source: source.into(),
    }
}

/// The signature section is not base64url encoded
#[derive(Debug, Error)]
#[error("malformed JWT signature")]
pub struct MalformedJwtSignature {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn malformed_jwt_signature(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> MalformedJwtSignature {
    MalformedJwtSignature {
        source: source.into(),
    }
}

/// The signature was not produced by the certificate's key
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("signature mismatch")]
pub struct SignatureMismatch {
    _p: (),
}

pub(crate) const fn signature_mismatch() -> SignatureMismatch {
    SignatureMismatch { _p: () }
}

/// A certificate could not be parsed or holds no RSA key
#[derive(Debug, Error)]
#[error("key rejected")]
pub struct KeyRejected {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn key_rejected(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> KeyRejected {
    KeyRejected {
        source: source.into(),
    }
}

/// Key generation or signing failed
#[derive(Debug, Error)]
#[error("unexpected error")]
pub struct Unexpected {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

#[cfg(any(test, feature = "private-keys"))]
pub(crate) fn unexpected(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> Unexpected {
    Unexpected {
        source: source.into(),
    }
}

/// A signature could not be verified with a certificate
#[derive(Debug, Error)]
pub enum JwkVerifyError {
    /// The token cannot be verified with this algorithm
    #[error(transparent)]
    IncompatibleAlgorithm(#[from] IncompatibleAlgorithm),

    /// Signature is invalid
    #[error(transparent)]
    SignatureMismatch(#[from] SignatureMismatch),
}

impl JwkVerifyError {
    /// The certificate cannot verify the requested algorithm
    #[must_use]
    pub fn is_incompatible_alg(&self) -> bool {
        matches!(self, Self::IncompatibleAlgorithm(_))
    }

    /// The signature does not match
    #[must_use]
    pub fn is_signature_mismatch(&self) -> bool {
        matches!(self, Self::SignatureMismatch(_))
    }
}

/// A token failed verification
#[derive(Debug, Error)]
pub enum JwtVerifyError {
    /// The JWT was rejected by the signing key
    #[error("token rejected by signing key")]
    JwkVerifyError(#[from] JwkVerifyError),

    /// The JWT is malformed, without a discernible header, payload, and signature
    #[error(transparent)]
    MalformedToken(#[from] MalformedJwt),

    /// The JWT header is malformed
    #[error(transparent)]
    MalformedTokenHeader(#[from] MalformedJwtHeader),

    /// The JWT payload is malformed
    #[error(transparent)]
    MalformedTokenPayload(#[from] MalformedJwtPayload),

    /// The JWT signature is malformed
    #[error(transparent)]
    MalformedTokenSignature(#[from] MalformedJwtSignature),

    /// The JWT was rejected by the claims validator
    #[error("token rejected by claims validator")]
    ClaimsRejected(#[from] ClaimsRejected),
}

impl JwtVerifyError {
    /// Whether the token signature did not match the signing key
    #[must_use]
    pub fn is_signature_mismatch(&self) -> bool {
        matches!(self, Self::JwkVerifyError(e) if e.is_signature_mismatch())
    }

    /// Whether the token was rejected because of its signing algorithm
    #[must_use]
    pub fn is_algorithm_mismatch(&self) -> bool {
        match self {
            Self::JwkVerifyError(e) => e.is_incompatible_alg(),
            Self::ClaimsRejected(ClaimsRejected::InvalidAlgorithm) => true,
            _ => false,
        }
    }

    /// Whether the token was rejected because it has expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::ClaimsRejected(ClaimsRejected::TokenExpired))
    }
}

/// The validation plan rejected the token
#[derive(Debug, Error)]
pub enum ClaimsRejected {
    /// The `alg` header names an algorithm that is not approved
    #[error("invalid algorithm")]
    InvalidAlgorithm,

    /// None of the `aud` members is allowed
    #[error("invalid audience")]
    InvalidAudience,

    /// The `iss` claim names another issuer
    #[error("invalid issuer")]
    InvalidIssuer,

    /// The `exp` claim is in the past
    #[error("token expired")]
    TokenExpired,

    /// The `nbf` claim is in the future
    #[error("token not yet valid")]
    TokenNotYetValid,

    /// A claim the validator requires is absent
    #[error("required {_0} claim missing")]
    MissingRequiredClaim(&'static str),
}
