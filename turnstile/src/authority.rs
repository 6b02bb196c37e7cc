use std::sync::Arc;

use turnstile_jose::{jwa, jwt, Certificate, JwtRef};

use crate::{
    config::{AuthorizerConfig, ConfigError, KeySelection, KeySource},
    fetcher::JwksFetcher,
    AuthorizeError,
};

#[derive(Debug)]
enum KeyMaterial {
    Remote {
        fetcher: JwksFetcher,
        selection: KeySelection,
    },
    Pinned(Certificate),
}

#[derive(Debug)]
struct Inner {
    keys: KeyMaterial,
    validator: jwt::Validator,
}

/// An authority that verifies tokens against a signing certificate, either
/// fetched from a remote JWKS on every verification or pinned up front
#[derive(Debug, Clone)]
#[must_use]
pub struct Authority {
    inner: Arc<Inner>,
}

impl Authority {
    /// Constructs an authority that fetches the signing certificate on every
    /// verification
    pub fn remote(fetcher: JwksFetcher, selection: KeySelection, validator: jwt::Validator) -> Self {
        Self::with_keys(KeyMaterial::Remote { fetcher, selection }, validator)
    }

    /// Constructs an authority that verifies every token against a single
    /// certificate
    pub fn pinned(certificate: Certificate, validator: jwt::Validator) -> Self {
        Self::with_keys(KeyMaterial::Pinned(certificate), validator)
    }

    fn with_keys(keys: KeyMaterial, validator: jwt::Validator) -> Self {
        Self {
            inner: Arc::new(Inner { keys, validator }),
        }
    }

    /// Constructs an authority from configuration
    ///
    /// Only RS256 tokens carrying a subject are accepted.
    ///
    /// # Errors
    ///
    /// The pinned certificate cannot be parsed, or the HTTP client cannot
    /// be built.
    pub fn from_config(config: &AuthorizerConfig) -> Result<Self, ConfigError> {
        let mut validator = jwt::Validator::default()
            .add_approved_algorithm(jwa::Algorithm::RS256)
            .require_subject()
            .with_leeway(config.leeway());

        if let Some(issuer) = config.issuer() {
            validator = validator.require_issuer(issuer.clone());
        }

        if let Some(audience) = config.audience() {
            validator = validator.add_allowed_audience(audience.clone());
        }

        let authority = match config.key_source() {
            KeySource::RemoteJwks { url } => {
                let fetcher = JwksFetcher::new(url.clone(), config.jwks_timeout())
                    .map_err(ConfigError::HttpClient)?;
                tracing::info!(jwks.url = %url, key_selection = ?config.key_selection(), "using remote JWKS");
                Self::remote(fetcher, config.key_selection(), validator)
            }
            KeySource::PinnedCertificate { pem } => {
                let certificate =
                    Certificate::from_pem(pem).map_err(ConfigError::InvalidPinnedCertificate)?;
                tracing::info!(certificate.subject = certificate.subject(), "using pinned certificate");
                Self::pinned(certificate, validator)
            }
        };

        Ok(authority)
    }

    /// Verifies the token against the current signing certificate
    ///
    /// The token is decomposed first, so a malformed token never causes a
    /// fetch. In remote mode, the key set is then fetched before the
    /// signature is checked; a failed fetch is reported without any
    /// verification attempt.
    ///
    /// # Errors
    ///
    /// The certificate could not be obtained, or the token was rejected.
    pub async fn verify_token(&self, token: &JwtRef) -> Result<jwt::Validated, AuthorizeError> {
        let decomposed = token.decompose()?;

        let alg = decomposed.alg();
        let kid = decomposed.kid();
        if let Some(kid) = kid {
            tracing::debug!(jwt.kid = %kid, jwt.alg = %alg, "verifying token");
        } else {
            tracing::debug!(jwt.alg = %alg, "verifying token");
        }

        let validated = match &self.inner.keys {
            KeyMaterial::Pinned(certificate) => {
                decomposed.verify(certificate, &self.inner.validator)?
            }
            KeyMaterial::Remote { fetcher, selection } => {
                let certificate = fetcher.fetch_certificate(*selection, kid).await?;
                decomposed.verify(&certificate, &self.inner.validator)?
            }
        };

        Ok(validated)
    }
}
