//! Authorizer configuration
//!
//! Configuration is read once at start-up, from environment variables or
//! programmatically, and then passed by reference.

use std::{collections::HashMap, env, fmt, str::FromStr, time::Duration};

use thiserror::Error;
use turnstile_jose::jwt::{Audience, Issuer};

/// Remote JWKS endpoint
pub const JWKS_URL_VAR: &str = "AUTHORIZER_JWKS_URL";
/// PEM encoded signing certificate
pub const PINNED_CERTIFICATE_VAR: &str = "AUTHORIZER_PINNED_CERTIFICATE";
/// `first` or `kid`
pub const KEY_SELECTION_VAR: &str = "AUTHORIZER_KEY_SELECTION";
/// Required `iss` claim
pub const ISSUER_VAR: &str = "AUTHORIZER_ISSUER";
/// Required member of the `aud` claim
pub const AUDIENCE_VAR: &str = "AUTHORIZER_AUDIENCE";
/// Clock skew tolerance, in seconds
pub const LEEWAY_SECONDS_VAR: &str = "AUTHORIZER_LEEWAY_SECONDS";
/// HTTP timeout for JWKS requests, in seconds
pub const JWKS_TIMEOUT_SECONDS_VAR: &str = "AUTHORIZER_JWKS_TIMEOUT_SECONDS";

/// Indicates that the authorizer cannot be configured as requested
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither key source was configured
    #[error("no key source configured; set AUTHORIZER_JWKS_URL or AUTHORIZER_PINNED_CERTIFICATE")]
    MissingKeySource,

    /// Both key sources were configured
    #[error("both AUTHORIZER_JWKS_URL and AUTHORIZER_PINNED_CERTIFICATE are set; choose one")]
    AmbiguousKeySource,

    /// A variable holds a value that cannot be used
    #[error("invalid value for {name}: {reason}")]
    InvalidValue {
        /// The name of the variable
        name: &'static str,
        /// What is wrong with the value
        reason: String,
    },

    /// The pinned certificate cannot be used to verify tokens
    #[error("pinned certificate rejected")]
    InvalidPinnedCertificate(#[source] turnstile_jose::error::KeyRejected),

    /// The HTTP client used to fetch the JWKS could not be built
    #[error("unable to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

/// Where the signing certificate comes from
#[derive(Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Fetched from a JSON Web Key Set on every authorization
    RemoteJwks {
        /// The URL of the key set document
        url: String,
    },

    /// Supplied up front; no network access takes place
    PinnedCertificate {
        /// The PEM encoded certificate
        pem: String,
    },
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteJwks { url } => f.debug_struct("RemoteJwks").field("url", url).finish(),
            Self::PinnedCertificate { pem } => f
                .debug_struct("PinnedCertificate")
                .field("pem_len", &pem.len())
                .finish(),
        }
    }
}

/// How a key is chosen out of the key set
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeySelection {
    /// Always the first key, ignoring the token's `kid`
    First,

    /// The key whose `kid` matches the token's, or the first key when the
    /// token names none
    #[default]
    MatchKeyId,
}

impl FromStr for KeySelection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            v if v.eq_ignore_ascii_case("first") => Ok(Self::First),
            v if v.eq_ignore_ascii_case("kid") => Ok(Self::MatchKeyId),
            other => Err(ConfigError::InvalidValue {
                name: KEY_SELECTION_VAR,
                reason: format!("expected 'first' or 'kid', got '{other}'"),
            }),
        }
    }
}

/// Settings for an [`Authorizer`][crate::Authorizer]
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct AuthorizerConfig {
    key_source: KeySource,
    key_selection: KeySelection,
    issuer: Option<Issuer>,
    audience: Option<Audience>,
    leeway: Duration,
    jwks_timeout: Option<Duration>,
}

impl AuthorizerConfig {
    /// Fetches the signing certificate from a remote JWKS
    pub fn remote_jwks(url: impl Into<String>) -> Self {
        Self::new(KeySource::RemoteJwks { url: url.into() })
    }

    /// Verifies every token against a single PEM encoded certificate
    pub fn pinned_certificate(pem: impl Into<String>) -> Self {
        Self::new(KeySource::PinnedCertificate { pem: pem.into() })
    }

    fn new(key_source: KeySource) -> Self {
        Self {
            key_source,
            key_selection: KeySelection::default(),
            issuer: None,
            audience: None,
            leeway: Duration::ZERO,
            jwks_timeout: None,
        }
    }

    /// Sets how keys are chosen out of a remote key set
    pub fn with_key_selection(self, key_selection: KeySelection) -> Self {
        Self {
            key_selection,
            ..self
        }
    }

    /// Requires tokens to be issued by `issuer`
    pub fn with_issuer(self, issuer: Issuer) -> Self {
        Self {
            issuer: Some(issuer),
            ..self
        }
    }

    /// Requires tokens to be intended for `audience`
    pub fn with_audience(self, audience: Audience) -> Self {
        Self {
            audience: Some(audience),
            ..self
        }
    }

    /// Tolerates clock skew of up to `leeway` on time-bound claims
    pub fn with_leeway(self, leeway: Duration) -> Self {
        Self { leeway, ..self }
    }

    /// Bounds the time spent on each JWKS request
    pub fn with_jwks_timeout(self, timeout: Duration) -> Self {
        Self {
            jwks_timeout: Some(timeout),
            ..self
        }
    }

    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// See [`from_vars`][Self::from_vars].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Loads configuration from a map of variables
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Exactly one of the key source variables must be set, and every other
    /// variable that is set must hold a usable value.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let key_source = match (get(JWKS_URL_VAR), get(PINNED_CERTIFICATE_VAR)) {
            (Some(url), None) => KeySource::RemoteJwks {
                url: url.to_owned(),
            },
            // Single-line values may carry the PEM with escaped newlines
            (None, Some(pem)) => KeySource::PinnedCertificate {
                pem: pem.replace("\\n", "\n"),
            },
            (Some(_), Some(_)) => return Err(ConfigError::AmbiguousKeySource),
            (None, None) => return Err(ConfigError::MissingKeySource),
        };

        let mut config = Self::new(key_source);

        if let Some(value) = get(KEY_SELECTION_VAR) {
            config = config.with_key_selection(value.parse()?);
        }

        if let Some(value) = get(ISSUER_VAR) {
            config = config.with_issuer(Issuer::new(value.to_owned()));
        }

        if let Some(value) = get(AUDIENCE_VAR) {
            config = config.with_audience(Audience::new(value.to_owned()));
        }

        if let Some(value) = get(LEEWAY_SECONDS_VAR) {
            config = config.with_leeway(parse_seconds(LEEWAY_SECONDS_VAR, value)?);
        }

        if let Some(value) = get(JWKS_TIMEOUT_SECONDS_VAR) {
            let timeout = parse_seconds(JWKS_TIMEOUT_SECONDS_VAR, value)?;
            if timeout.is_zero() {
                return Err(ConfigError::InvalidValue {
                    name: JWKS_TIMEOUT_SECONDS_VAR,
                    reason: "must be greater than 0".to_owned(),
                });
            }
            config = config.with_jwks_timeout(timeout);
        }

        Ok(config)
    }

    /// Where the signing certificate comes from
    pub fn key_source(&self) -> &KeySource {
        &self.key_source
    }

    /// How keys are chosen out of a remote key set
    #[must_use]
    pub fn key_selection(&self) -> KeySelection {
        self.key_selection
    }

    /// The required issuer, if any
    #[must_use]
    pub fn issuer(&self) -> Option<&Issuer> {
        self.issuer.as_ref()
    }

    /// The required audience, if any
    #[must_use]
    pub fn audience(&self) -> Option<&Audience> {
        self.audience.as_ref()
    }

    /// The tolerated clock skew
    #[must_use]
    pub fn leeway(&self) -> Duration {
        self.leeway
    }

    /// The timeout applied to JWKS requests, if any
    #[must_use]
    pub fn jwks_timeout(&self) -> Option<Duration> {
        self.jwks_timeout
    }
}

fn parse_seconds(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidValue {
            name,
            reason: format!("expected a whole number of seconds, got '{value}': {e}"),
        })
}
