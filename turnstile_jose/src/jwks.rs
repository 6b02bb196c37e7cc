//! JSON Web Key Sets (JWKS)
//!
//! Only the members needed to locate a signing certificate are modeled.
//! Everything else an identity provider publishes (`n`, `e`, `x5t`, …) is
//! ignored when deserializing.

use aliri_braid::braid;
use serde::{Deserialize, Serialize};

/// The ID of a key, as found in the `kid` member of a JWK or a JWT header
#[braid(serde, ref_doc = "A borrowed reference to a [`KeyId`]")]
pub struct KeyId;

/// A single entry of a JSON Web Key Set
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct Jwk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kid: Option<KeyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alg: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    usage: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    x5c: Vec<String>,
}

impl Jwk {
    /// An RSA signing key published through its certificate chain
    pub fn from_certificate_chain(x5c: Vec<String>) -> Self {
        Self {
            kid: None,
            kty: Some("RSA".to_owned()),
            alg: Some("RS256".to_owned()),
            usage: Some("sig".to_owned()),
            x5c,
        }
    }

    /// Sets the key ID
    pub fn with_key_id(self, kid: KeyId) -> Self {
        Self {
            kid: Some(kid),
            ..self
        }
    }

    /// The key ID, if any
    #[must_use]
    pub fn key_id(&self) -> Option<&KeyIdRef> {
        self.kid.as_deref()
    }

    /// The leaf certificate of the key's `x5c` chain, if any
    #[must_use]
    pub fn leaf_certificate(&self) -> Option<&str> {
        self.x5c.first().map(String::as_str)
    }
}

/// A JSON Web Key Set
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct Jwks {
    keys: Vec<Jwk>,
}

impl Jwks {
    /// Adds a key to the set
    pub fn add_key(&mut self, key: Jwk) {
        self.keys.push(key);
    }

    /// A view of the keys in this set
    #[must_use]
    pub fn keys(&self) -> &[Jwk] {
        &self.keys
    }

    /// Whether the set holds no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The first key in the set
    #[must_use]
    pub fn first_key(&self) -> Option<&Jwk> {
        self.keys.first()
    }

    /// The first key in the set with the given key ID
    #[must_use]
    pub fn get_key_by_id(&self, kid: &KeyIdRef) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.key_id() == Some(kid))
    }
}

impl FromIterator<Jwk> for Jwks {
    fn from_iter<I: IntoIterator<Item = Jwk>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
