//! WLS public keys and the certificate store
//!
//! The store maps the `kid` field of a response to the key that verifies it.
//! It is provisioned by the application; this crate only reads it. Stores
//! are shared read-only between concurrent validations, so key rotation
//! means building a new store and swapping it in whole.

use crate::error::{Error, Result};
use crate::utils::der::{
    rsa_spki_from_n_e, rsa_spki_from_pkcs1, spki_from_certificate, validate_rsa_spki,
};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// An RSA public key published by the WLS
///
/// Usually loaded from the X.509 certificate the WLS operator distributes;
/// only the SubjectPublicKeyInfo is kept.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    public_key_der: Arc<[u8]>,
}

impl Certificate {
    /// Load from PEM
    ///
    /// Accepts `CERTIFICATE` (X.509), `PUBLIC KEY` (SubjectPublicKeyInfo) and
    /// `RSA PUBLIC KEY` (PKCS#1) documents.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let (label, document) = der::Document::from_pem(pem.trim())
            .map_err(|e| Error::CertificateInvalid(format!("invalid PEM: {e}")))?;

        let spki = match label {
            "CERTIFICATE" => spki_from_certificate(document.as_bytes())?,
            "PUBLIC KEY" => {
                validate_rsa_spki(document.as_bytes())?;
                document.as_bytes().to_vec()
            }
            "RSA PUBLIC KEY" => rsa_spki_from_pkcs1(document.as_bytes())?,
            other => {
                return Err(Error::CertificateInvalid(format!(
                    "unsupported PEM label '{other}'"
                )));
            }
        };

        Ok(Self::from_spki(spki))
    }

    /// Load from a DER-encoded X.509 certificate
    pub fn from_der(der: &[u8]) -> Result<Self> {
        spki_from_certificate(der).map(Self::from_spki)
    }

    /// Load from a DER-encoded RSA SubjectPublicKeyInfo
    pub fn from_public_key_der(der: &[u8]) -> Result<Self> {
        validate_rsa_spki(der)?;
        Ok(Self::from_spki(der.to_vec()))
    }

    /// Build from big-endian RSA modulus and public exponent
    pub fn from_rsa_components(modulus: &[u8], exponent: &[u8]) -> Result<Self> {
        rsa_spki_from_n_e(modulus, exponent).map(Self::from_spki)
    }

    fn from_spki(spki: Vec<u8>) -> Self {
        Self {
            public_key_der: spki.into(),
        }
    }

    /// DER SubjectPublicKeyInfo of the key
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_key_der
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field(
                "public_key_der",
                &format_args!("<{} bytes>", self.public_key_der.len()),
            )
            .finish()
    }
}

/// Lookup of WLS keys by key id
pub trait CertificateStore {
    /// The certificate for `key_id`, if it is trusted
    fn lookup(&self, key_id: u64) -> Option<&Certificate>;
}

impl CertificateStore for HashMap<u64, Certificate> {
    fn lookup(&self, key_id: u64) -> Option<&Certificate> {
        self.get(&key_id)
    }
}

impl CertificateStore for BTreeMap<u64, Certificate> {
    fn lookup(&self, key_id: u64) -> Option<&Certificate> {
        self.get(&key_id)
    }
}

impl<S: CertificateStore + ?Sized> CertificateStore for &S {
    fn lookup(&self, key_id: u64) -> Option<&Certificate> {
        (**self).lookup(key_id)
    }
}

impl<S: CertificateStore + ?Sized> CertificateStore for Arc<S> {
    fn lookup(&self, key_id: u64) -> Option<&Certificate> {
        (**self).lookup(key_id)
    }
}

/// Immutable set of trusted WLS keys
#[derive(Debug, Clone, Default)]
pub struct KeyRing {
    keys: BTreeMap<u64, Certificate>,
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key, returning any key previously registered under `key_id`
    pub fn insert(&mut self, key_id: u64, certificate: Certificate) -> Option<Certificate> {
        self.keys.insert(key_id, certificate)
    }

    /// Add a key, builder style
    pub fn with(mut self, key_id: u64, certificate: Certificate) -> Self {
        self.insert(key_id, certificate);
        self
    }

    /// Build from `(kid, pem)` pairs, failing on the first unreadable entry
    pub fn from_pem_entries<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u64, &'a str)>,
    {
        entries
            .into_iter()
            .map(|(key_id, pem)| {
                Certificate::from_pem(pem)
                    .map(|certificate| (key_id, certificate))
                    .map_err(|e| Error::CertificateInvalid(format!("kid {key_id}: {e}")))
            })
            .collect()
    }

    pub fn key_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.keys.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl CertificateStore for KeyRing {
    fn lookup(&self, key_id: u64) -> Option<&Certificate> {
        self.keys.get(&key_id)
    }
}

impl FromIterator<(u64, Certificate)> for KeyRing {
    fn from_iter<I: IntoIterator<Item = (u64, Certificate)>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
