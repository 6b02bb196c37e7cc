//! A custom authorizer for API gateways that verifies RS256 bearer tokens
//!
//! The authorizer receives the raw authorization header of a request,
//! extracts the bearer token, obtains the signing certificate and checks
//! the token's signature and claims. The outcome is a [`Decision`]: an
//! Allow policy for the token's subject, or a Deny policy for a
//! placeholder principal. Callers never learn why a request was denied;
//! the reason is only logged.
//!
//! The signing certificate comes from one of two places:
//!
//! * a remote JSON Web Key Set, fetched anew for every authorization and
//!   never cached, or
//! * a certificate pinned in configuration.
//!
//! # Example
//!
//! ```no_run
//! use turnstile::{Authorizer, AuthorizerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthorizerConfig::remote_jwks("https://tenant.auth0.com/.well-known/jwks.json");
//! let authorizer = Authorizer::from_config(&config)?;
//!
//! let decision = authorizer.authorize(Some("Bearer eyJ...")).await;
//! println!("{}", decision.principal_id());
//! # Ok(())
//! # }
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

mod authority;
mod authorizer;
pub mod bearer;
pub mod config;
mod error;
pub mod fetcher;
pub mod policy;

pub use authority::Authority;
pub use authorizer::Authorizer;
pub use config::{AuthorizerConfig, ConfigError, KeySelection, KeySource};
pub use error::{AuthorizeError, KeyFetchError};
pub use policy::Decision;
