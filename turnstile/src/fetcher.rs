//! Retrieval of signing certificates from a remote JSON Web Key Set

use std::time::Duration;

use reqwest::Client;
use turnstile_jose::{jwks::KeyIdRef, Certificate, Jwks};

use crate::{config::KeySelection, KeyFetchError};

/// Fetches a JSON Web Key Set from a fixed URL
///
/// Every call performs a fresh request; nothing is cached between calls.
/// The underlying HTTP client is reference counted, so clones are cheap
/// and share a connection pool.
#[derive(Debug, Clone)]
#[must_use]
pub struct JwksFetcher {
    url: String,
    client: Client,
}

impl JwksFetcher {
    /// Constructs a fetcher for the key set at `url`
    ///
    /// Requests are not bounded in time unless a `timeout` is given.
    ///
    /// # Errors
    ///
    /// The HTTP client could not be initialized.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder =
            Client::builder().user_agent(concat!("turnstile/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            url: url.into(),
            client: builder.build()?,
        })
    }

    /// Fetches the key set
    ///
    /// No retries are attempted.
    ///
    /// # Errors
    ///
    /// The request failed, the response status was unsuccessful, or the
    /// body is not a key set document.
    #[tracing::instrument(skip(self), fields(jwks.url = %self.url))]
    pub async fn fetch(&self) -> Result<Jwks, KeyFetchError> {
        tracing::debug!("fetching JWKS");

        let response = match self.client.get(&self.url).send().await {
            Ok(response) => response,
            Err(err) => {
                let error: &dyn std::error::Error = &err;
                tracing::warn!(error, "JWKS fetch failed; request error");
                return Err(KeyFetchError::Request(err));
            }
        };

        if let Err(err) = response.error_for_status_ref() {
            let error: &dyn std::error::Error = &err;
            tracing::warn!(
                error,
                http.status_code = response.status().as_u16(),
                "JWKS fetch failed; unexpected response status",
            );
            return Err(KeyFetchError::Request(err));
        }

        match response.json::<Jwks>().await {
            Ok(jwks) => {
                tracing::debug!(jwks.keys = jwks.keys().len(), "JWKS fetched");
                Ok(jwks)
            }
            Err(err) => {
                let error: &dyn std::error::Error = &err;
                tracing::warn!(error, "JWKS fetch failed; invalid key set document");
                Err(KeyFetchError::InvalidDocument(err))
            }
        }
    }

    /// Fetches the key set and extracts the certificate of the selected key
    ///
    /// # Errors
    ///
    /// See [`fetch`][Self::fetch] and [`select_certificate`].
    pub async fn fetch_certificate(
        &self,
        selection: KeySelection,
        kid: Option<&KeyIdRef>,
    ) -> Result<Certificate, KeyFetchError> {
        let jwks = self.fetch().await?;
        select_certificate(&jwks, selection, kid)
    }
}

/// Chooses a key out of `jwks` and parses the leaf certificate of its `x5c`
/// chain
///
/// With [`KeySelection::MatchKeyId`], the key whose `kid` equals `kid` is
/// chosen, or the first key when `kid` is absent. With
/// [`KeySelection::First`], `kid` is ignored.
///
/// # Errors
///
/// The set is empty, no key matches `kid`, the chosen key has no `x5c`
/// chain, or its leaf certificate cannot be parsed.
pub fn select_certificate(
    jwks: &Jwks,
    selection: KeySelection,
    kid: Option<&KeyIdRef>,
) -> Result<Certificate, KeyFetchError> {
    if jwks.is_empty() {
        return Err(KeyFetchError::EmptyKeySet);
    }

    let key = match (selection, kid) {
        (KeySelection::MatchKeyId, Some(kid)) => jwks.get_key_by_id(kid).ok_or_else(|| {
            tracing::debug!(jwt.kid = %kid, "unable to find matching key");
            KeyFetchError::NoMatchingKey(kid.to_owned())
        })?,
        _ => jwks.first_key().ok_or(KeyFetchError::EmptyKeySet)?,
    };

    let entry = key
        .leaf_certificate()
        .ok_or(KeyFetchError::MissingCertificateChain)?;

    Certificate::from_x5c(entry).map_err(KeyFetchError::InvalidCertificate)
}
