//! Primitives for verifying RS256 bearer tokens against X.509 signing
//! certificates published through a JSON Web Key Set (JWKS).
//!
//! * JSON Web Token (JWT): [RFC7519][], decomposed and verified by [`jwt`]
//! * JSON Web Key Set (JWKS): [RFC7517][], the `x5c` certificate chains of
//!   which are consumed by [`cert`]
//! * JSON Web Algorithms (JWA): [RFC7518][], restricted to the RSA family
//!
//! [RFC7517]: https://tools.ietf.org/html/rfc7517
//! [RFC7518]: https://tools.ietf.org/html/rfc7518
//! [RFC7519]: https://tools.ietf.org/html/rfc7519
//!
//! # Example
//!
//! ```no_run
//! use turnstile_jose::{cert::Certificate, jwa, jwt, JwtRef};
//!
//! # fn pem() -> &'static str { "" }
//! let certificate = Certificate::from_pem(pem()).expect("valid certificate");
//!
//! let validator = jwt::Validator::default()
//!     .add_approved_algorithm(jwa::Algorithm::RS256)
//!     .require_subject();
//!
//! let token = JwtRef::from_str("eyJhbGciOiJSUzI1NiJ9.e30.c2ln");
//! let validated = token.verify(&certificate, &validator);
//! # let _ = validated;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

pub mod cert;
pub mod clock;
pub mod error;
pub mod jwa;
pub mod jwks;
pub mod jws;
pub mod jwt;

#[cfg(any(test, feature = "private-keys"))]
#[cfg_attr(docsrs, doc(cfg(feature = "private-keys")))]
pub mod sign;

#[doc(inline)]
pub use cert::Certificate;
#[doc(inline)]
pub use jwks::Jwks;
#[doc(inline)]
pub use jwt::{Jwt, JwtRef};
