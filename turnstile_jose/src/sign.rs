//! Minting of RSA signing keys, self-signed certificates and RS256 tokens
//!
//! Meant for tests and local tooling that need to stand in for an identity
//! provider. Keys are generated with OpenSSL.

use std::fmt;

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use openssl::{
    asn1::Asn1Time,
    bn::BigNum,
    hash::MessageDigest,
    pkey::{PKey, Private},
    rsa::Rsa,
    x509::{X509NameBuilder, X509},
};
use serde::Serialize;

use crate::{error, jwks, jwt};

const SUBJECT_CN: &str = "turnstile test";

/// A 2048-bit RSA key pair with a matching self-signed certificate
#[must_use]
pub struct SigningKey {
    key: PKey<Private>,
    certificate: X509,
}

impl SigningKey {
    /// Generates a new key pair and a certificate valid for one year
    ///
    /// # Errors
    ///
    /// Unable to generate the key or its certificate.
    pub fn generate() -> Result<Self, error::Unexpected> {
        let rsa = Rsa::generate(2048).map_err(error::unexpected)?;
        let key = PKey::from_rsa(rsa).map_err(error::unexpected)?;
        let certificate = self_signed(&key).map_err(error::unexpected)?;

        Ok(Self { key, certificate })
    }

    /// The certificate as a PEM document
    ///
    /// # Errors
    ///
    /// Unable to encode the certificate.
    pub fn certificate_pem(&self) -> Result<String, error::Unexpected> {
        let pem = self.certificate.to_pem().map_err(error::unexpected)?;
        String::from_utf8(pem).map_err(error::unexpected)
    }

    /// The certificate as an `x5c` chain entry (base64 DER)
    ///
    /// # Errors
    ///
    /// Unable to encode the certificate.
    pub fn x5c_entry(&self) -> Result<String, error::Unexpected> {
        let der = self.certificate.to_der().map_err(error::unexpected)?;
        Ok(STANDARD.encode(der))
    }

    /// A JWK publishing this key's certificate
    ///
    /// # Errors
    ///
    /// Unable to encode the certificate.
    pub fn to_jwk(&self, kid: Option<&str>) -> Result<jwks::Jwk, error::Unexpected> {
        let jwk = jwks::Jwk::from_certificate_chain(vec![self.x5c_entry()?]);
        Ok(match kid {
            Some(kid) => jwk.with_key_id(jwks::KeyId::new(kid.to_owned())),
            None => jwk,
        })
    }

    /// Signs `data` using RSASSA-PKCS1-v1_5 with SHA-256
    ///
    /// # Errors
    ///
    /// Unable to produce a signature.
    pub fn sign_rs256(&self, data: &[u8]) -> Result<Vec<u8>, error::Unexpected> {
        let mut signer = openssl::sign::Signer::new(MessageDigest::sha256(), &self.key)
            .map_err(error::unexpected)?;
        signer.update(data).map_err(error::unexpected)?;
        signer.sign_to_vec().map_err(error::unexpected)
    }

    /// Produces a token from the given header and claims, signed with RS256
    ///
    /// The header is serialized as given; its `alg` is not checked, which
    /// allows minting tokens that lie about their algorithm.
    ///
    /// # Errors
    ///
    /// Unable to serialize the header or claims, or to sign.
    pub fn sign_token<H: Serialize, C: Serialize>(
        &self,
        header: &H,
        claims: &C,
    ) -> Result<jwt::Jwt, error::Unexpected> {
        let h_raw = serde_json::to_vec(header).map_err(error::unexpected)?;
        let p_raw = serde_json::to_vec(claims).map_err(error::unexpected)?;

        let mut message = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(h_raw),
            URL_SAFE_NO_PAD.encode(p_raw)
        );

        let signature = self.sign_rs256(message.as_bytes())?;
        message.push('.');
        message.push_str(&URL_SAFE_NO_PAD.encode(signature));

        Ok(jwt::Jwt::new(message))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SigningKey").finish_non_exhaustive()
    }
}

fn self_signed(key: &PKey<Private>) -> Result<X509, openssl::error::ErrorStack> {
    let mut name = X509NameBuilder::new()?;
    name.append_entry_by_text("CN", SUBJECT_CN)?;
    let name = name.build();

    let serial = BigNum::from_u32(1)?.to_asn1_integer()?;
    let not_before = Asn1Time::days_from_now(0)?;
    let not_after = Asn1Time::days_from_now(365)?;

    let mut builder = X509::builder()?;
    builder.set_version(2)?;
    builder.set_serial_number(&serial)?;
    builder.set_subject_name(&name)?;
    builder.set_issuer_name(&name)?;
    builder.set_pubkey(key)?;
    builder.set_not_before(&not_before)?;
    builder.set_not_after(&not_after)?;
    builder.sign(key, MessageDigest::sha256())?;

    Ok(builder.build())
}
