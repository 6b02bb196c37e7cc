//! Lambda entry point for the `TOKEN` custom authorizer
//!
//! Configuration is read from the environment once, at start-up. A bad
//! configuration stops the process; every later failure becomes a Deny.

use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing_subscriber::EnvFilter;
use turnstile::{Authorizer, AuthorizerConfig, Decision};

mod event;

use event::TokenAuthorizerEvent;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_current_span(false)
        .without_time()
        .init();

    let config = AuthorizerConfig::from_env().map_err(|err| {
        let error: &dyn std::error::Error = &err;
        tracing::error!(error, "invalid authorizer configuration");
        err
    })?;
    tracing::debug!(?config, "loaded configuration");

    let authorizer = Authorizer::from_config(&config)?;
    let authorizer = &authorizer;

    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<TokenAuthorizerEvent>| async move {
            Ok::<Decision, Error>(respond(authorizer, &event.payload).await)
        },
    ))
    .await
}

async fn respond(authorizer: &Authorizer, event: &TokenAuthorizerEvent) -> Decision {
    authorizer
        .authorize(event.authorization_token.as_deref())
        .await
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;
    use turnstile_jose::{
        jwa,
        jwt::{Claims, Headers, Subject},
        sign::SigningKey,
    };

    use super::*;

    fn event(token: Option<String>) -> TokenAuthorizerEvent {
        TokenAuthorizerEvent {
            kind: Some("TOKEN".to_owned()),
            authorization_token: token,
            method_arn: Some("arn:aws:execute-api:us-east-1:123456789012:api/dev/GET/todos".to_owned()),
        }
    }

    #[tokio::test]
    async fn responds_with_allow_policy() -> Result<()> {
        let key = SigningKey::generate()?;
        let authorizer =
            Authorizer::from_config(&AuthorizerConfig::pinned_certificate(key.certificate_pem()?))?;

        let token = key.sign_token(
            &Headers::new(jwa::Algorithm::RS256),
            &Claims::new()
                .with_subject(Subject::from_static("auth0|123"))
                .with_future_expiration(60),
        )?;
        let decision = respond(&authorizer, &event(Some(format!("Bearer {}", token.as_str())))).await;

        assert_eq!(
            serde_json::to_value(&decision)?,
            serde_json::json!({
                "principalId": "auth0|123",
                "policyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [
                        { "Action": "execute-api:Invoke", "Effect": "Allow", "Resource": "*" }
                    ]
                }
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn responds_with_deny_policy_without_token() -> Result<()> {
        let key = SigningKey::generate()?;
        let authorizer =
            Authorizer::from_config(&AuthorizerConfig::pinned_certificate(key.certificate_pem()?))?;

        let decision = respond(&authorizer, &event(None)).await;

        assert_eq!(
            serde_json::to_string(&decision)?,
            r#"{"principalId":"user","policyDocument":{"Version":"2012-10-17","Statement":[{"Action":"execute-api:Invoke","Effect":"Deny","Resource":"*"}]}}"#
        );
        Ok(())
    }
}
