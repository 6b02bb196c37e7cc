use std::error::Error as StdError;

use turnstile_jose::{error::ClaimsRejected, jwt::Subject};

use crate::{
    bearer::extract_bearer_token,
    config::{AuthorizerConfig, ConfigError},
    AuthorizeError, Authority, Decision,
};

/// Turns the authorization header of a request into an Allow or Deny
/// decision
///
/// Holds no state that changes between requests; a single instance can be
/// shared by every invocation.
#[derive(Debug, Clone)]
#[must_use]
pub struct Authorizer {
    authority: Authority,
}

impl Authorizer {
    /// Constructs an authorizer backed by `authority`
    pub fn new(authority: Authority) -> Self {
        Self { authority }
    }

    /// Constructs an authorizer from configuration
    ///
    /// # Errors
    ///
    /// See [`Authority::from_config`].
    pub fn from_config(config: &AuthorizerConfig) -> Result<Self, ConfigError> {
        Authority::from_config(config).map(Self::new)
    }

    /// Decides whether the request carrying `header` may proceed
    ///
    /// Every failure results in a Deny decision for the placeholder
    /// principal. The reason is only reported in the logs.
    pub async fn authorize(&self, header: Option<&str>) -> Decision {
        tracing::info!("authorizing a user");

        match self.try_authorize(header).await {
            Ok(principal) => {
                tracing::info!(%principal, "user was authorized");
                Decision::allow(&principal)
            }
            Err(err) => {
                tracing::error!(error = %describe(&err), "user not authorized");
                Decision::deny()
            }
        }
    }

    /// Verifies the bearer token in `header` and returns its subject
    ///
    /// # Errors
    ///
    /// The header does not carry a bearer token, the signing certificate
    /// cannot be obtained, or the token is rejected.
    pub async fn try_authorize(&self, header: Option<&str>) -> Result<Subject, AuthorizeError> {
        let token = extract_bearer_token(header)?;
        let validated = self.authority.verify_token(token).await?;

        let (_, claims) = validated.extract();
        claims
            .sub()
            .map(ToOwned::to_owned)
            .ok_or_else(|| {
                AuthorizeError::InvalidToken(ClaimsRejected::MissingRequiredClaim("sub").into())
            })
    }
}

fn describe(error: &AuthorizeError) -> String {
    let mut description = error.to_string();
    let mut err: &dyn StdError = error;
    while let Some(next) = err.source() {
        description.push_str(": ");
        description.push_str(&next.to_string());
        err = next;
    }
    description
}
