use std::fmt;

use serde::Deserialize;

/// The event delivered to a `TOKEN` custom authorizer
///
/// Only `authorizationToken` is consumed; the remaining members are kept
/// for logging.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAuthorizerEvent {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub authorization_token: Option<String>,
    #[serde(default)]
    pub method_arn: Option<String>,
}

impl fmt::Debug for TokenAuthorizerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthorizerEvent")
            .field("kind", &self.kind)
            .field(
                "authorization_token",
                &self.authorization_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("method_arn", &self.method_arn)
            .finish()
    }
}
