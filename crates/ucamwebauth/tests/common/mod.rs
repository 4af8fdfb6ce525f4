//! Response generation utilities
//!
//! Builds WLS responses field by field and signs them the way the WLS does:
//! RSASSA-PKCS1-v1_5 over SHA-1, base64 with `+/=` replaced by `-._`.
//!
//! ```rust,ignore
//! let raw = ResponseBuilder::new().principal("bob").sign();
//! let raw = ResponseBuilder::new().status("410").unsigned();
//! ```

#![allow(dead_code)]

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rsa::RsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::EncodePublicKey;
use rsa::signature::{SignatureEncoding, Signer};
use sha1::Sha1;
use std::sync::LazyLock;
use ucamwebauth::{Certificate, KeyRing, PolicyConfig};

pub const RETURN_URL: &str = "https://example.org/return";
pub const ENCODED_RETURN_URL: &str = "https%3A%2F%2Fexample.org%2Freturn";
pub const KEY_ID: u64 = 901;

/// Signing key of the simulated WLS
pub static WLS_KEY: LazyLock<RsaPrivateKey> = LazyLock::new(|| generate_key(1024));

/// A key the application does not trust
pub static OTHER_KEY: LazyLock<RsaPrivateKey> = LazyLock::new(|| generate_key(1024));

fn generate_key(bits: usize) -> RsaPrivateKey {
    RsaPrivateKey::new(&mut rand::thread_rng(), bits).expect("Failed to generate key")
}

pub fn certificate(key: &RsaPrivateKey) -> Certificate {
    let spki = key
        .to_public_key()
        .to_public_key_der()
        .expect("Failed to encode public key");
    Certificate::from_public_key_der(spki.as_bytes()).expect("Failed to load public key")
}

/// Certificate store trusting [`WLS_KEY`] as [`KEY_ID`]
pub fn key_ring() -> KeyRing {
    KeyRing::new().with(KEY_ID, certificate(&WLS_KEY))
}

pub fn policy() -> PolicyConfig {
    PolicyConfig::new(RETURN_URL)
}

/// Issue time used by [`ResponseBuilder::new`]: 2024-01-01 12:00:00 UTC
pub fn issued() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

/// Ten seconds after [`issued`]
pub fn now() -> DateTime<Utc> {
    issued() + TimeDelta::seconds(10)
}

pub fn format_issue(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Sign data with PKCS#1 v1.5 / SHA-1
pub fn sign_bytes(key: &RsaPrivateKey, data: &str) -> Vec<u8> {
    SigningKey::<Sha1>::new(key.clone())
        .sign(data.as_bytes())
        .to_vec()
}

/// Encode signature bytes in the WLS base64 variant
pub fn encode_signature(bytes: &[u8]) -> String {
    STANDARD
        .encode(bytes)
        .replace('+', "-")
        .replace('/', ".")
        .replace('=', "_")
}

/// Replace one field of a raw response
pub fn replace_field(raw: &str, index: usize, value: &str) -> String {
    let mut fields: Vec<&str> = raw.split('!').collect();
    fields[index] = value;
    fields.join("!")
}

/// Builder for WLS responses
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    ver: String,
    status: String,
    msg: String,
    issue: String,
    id: String,
    url: String,
    principal: String,
    ptags: String,
    auth: String,
    sso: String,
    life: String,
    params: String,
    kid: String,
}

impl ResponseBuilder {
    /// A successful interactive `pwd` login for `alice`
    pub fn new() -> Self {
        Self {
            ver: "3".into(),
            status: "200".into(),
            msg: String::new(),
            issue: format_issue(issued()),
            id: "abc123".into(),
            url: ENCODED_RETURN_URL.into(),
            principal: "alice".into(),
            ptags: "current".into(),
            auth: "pwd".into(),
            sso: String::new(),
            life: "3600".into(),
            params: String::new(),
            kid: KEY_ID.to_string(),
        }
    }

    pub fn ver(mut self, ver: &str) -> Self {
        self.ver = ver.into();
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.status = status.into();
        self
    }

    pub fn msg(mut self, msg: &str) -> Self {
        self.msg = msg.into();
        self
    }

    pub fn issued_at(mut self, at: DateTime<Utc>) -> Self {
        self.issue = format_issue(at);
        self
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.into();
        self
    }

    /// Set the url field as it appears on the wire (percent-encoded)
    pub fn url(mut self, url: &str) -> Self {
        self.url = url.into();
        self
    }

    pub fn principal(mut self, principal: &str) -> Self {
        self.principal = principal.into();
        self
    }

    pub fn ptags(mut self, ptags: &str) -> Self {
        self.ptags = ptags.into();
        self
    }

    pub fn auth(mut self, auth: &str) -> Self {
        self.auth = auth.into();
        self
    }

    pub fn sso(mut self, sso: &str) -> Self {
        self.sso = sso.into();
        self
    }

    pub fn life(mut self, life: &str) -> Self {
        self.life = life.into();
        self
    }

    pub fn params(mut self, params: &str) -> Self {
        self.params = params.into();
        self
    }

    pub fn kid(mut self, kid: &str) -> Self {
        self.kid = kid.into();
        self
    }

    /// The twelve signed fields joined with `!`
    pub fn signed_region(&self) -> String {
        [
            &self.ver,
            &self.status,
            &self.msg,
            &self.issue,
            &self.id,
            &self.url,
            &self.principal,
            &self.ptags,
            &self.auth,
            &self.sso,
            &self.life,
            &self.params,
        ]
        .map(String::as_str)
        .join("!")
    }

    /// Complete the response with an explicit signature field
    pub fn with_signature(self, sig: &str) -> String {
        format!("{}!{}!{}", self.signed_region(), self.kid, sig)
    }

    /// Complete the response with an empty signature field
    pub fn unsigned(self) -> String {
        self.with_signature("")
    }

    /// Sign with the given key
    pub fn sign_with(self, key: &RsaPrivateKey) -> String {
        let sig = encode_signature(&sign_bytes(key, &self.signed_region()));
        self.with_signature(&sig)
    }

    /// Sign with [`WLS_KEY`]
    pub fn sign(self) -> String {
        self.sign_with(&WLS_KEY)
    }
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
