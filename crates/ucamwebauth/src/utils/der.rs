//! DER utilities for turning WLS key material into SubjectPublicKeyInfo
//!
//! WLS operators publish their keys as X.509 certificates, as `PUBLIC KEY`
//! (SubjectPublicKeyInfo) files, or as bare PKCS#1 `RSA PUBLIC KEY` files.
//! aws-lc-rs is always handed the SubjectPublicKeyInfo form.

use crate::error::{Error, Result};
use der::asn1::{BitString, UintRef};
use der::{Decode, Encode, Sequence};
use spki::{
    AlgorithmIdentifierOwned, ObjectIdentifier, SubjectPublicKeyInfoOwned, SubjectPublicKeyInfoRef,
};

const RSA_ENCRYPTION_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// Largest RSA modulus accepted (8192 bits)
const MAX_RSA_MODULUS_SIZE: usize = 1024;

fn certificate_error(operation: &str, details: impl std::fmt::Display) -> Error {
    Error::CertificateInvalid(format!("{operation}: {details}"))
}

/// RSA public key structure
///
/// RSAPublicKey as defined in RFC 3447:
/// RSAPublicKey ::= SEQUENCE {
///     modulus           INTEGER,  -- n
///     publicExponent    INTEGER   -- e
/// }
#[derive(Sequence)]
struct RsaPublicKey<'a> {
    modulus: UintRef<'a>,
    public_exponent: UintRef<'a>,
}

/// Build a DER SubjectPublicKeyInfo from RSA modulus (n) and exponent (e) bytes
pub(crate) fn rsa_spki_from_n_e(n: &[u8], e: &[u8]) -> Result<Vec<u8>> {
    if n.is_empty() || e.is_empty() {
        return Err(certificate_error("rsa key missing n or e", "empty component"));
    }

    if n.len() > MAX_RSA_MODULUS_SIZE + 1 {
        return Err(certificate_error(
            "RSA modulus too large",
            format!("{} bytes (maximum: {MAX_RSA_MODULUS_SIZE} bytes)", n.len()),
        ));
    }

    let n_uint = UintRef::new(n).map_err(|e| certificate_error("invalid RSA modulus", e))?;
    let e_uint = UintRef::new(e).map_err(|e| certificate_error("invalid RSA exponent", e))?;

    let rsa_pubkey_der = RsaPublicKey {
        modulus: n_uint,
        public_exponent: e_uint,
    }
    .to_der()
    .map_err(|e| certificate_error("failed to encode RSA public key", e))?;

    let spki = SubjectPublicKeyInfoOwned {
        algorithm: AlgorithmIdentifierOwned {
            oid: RSA_ENCRYPTION_OID,
            parameters: Some(der::asn1::AnyRef::NULL.into()),
        },
        subject_public_key: BitString::new(0, rsa_pubkey_der)
            .map_err(|e| certificate_error("failed to create bit string", e))?,
    };

    spki.to_der()
        .map_err(|e| certificate_error("failed to encode SPKI", e))
}

/// Re-wrap a PKCS#1 RSAPublicKey as SubjectPublicKeyInfo
pub(crate) fn rsa_spki_from_pkcs1(der: &[u8]) -> Result<Vec<u8>> {
    let key = RsaPublicKey::from_der(der)
        .map_err(|e| certificate_error("invalid PKCS#1 RSA public key", e))?;
    rsa_spki_from_n_e(key.modulus.as_bytes(), key.public_exponent.as_bytes())
}

/// Check that DER bytes are an RSA SubjectPublicKeyInfo
pub(crate) fn validate_rsa_spki(der: &[u8]) -> Result<()> {
    let spki = SubjectPublicKeyInfoRef::from_der(der)
        .map_err(|e| certificate_error("invalid SubjectPublicKeyInfo", e))?;
    ensure_rsa(spki.algorithm.oid)
}

/// Extract the RSA SubjectPublicKeyInfo of an X.509 certificate
pub(crate) fn spki_from_certificate(der: &[u8]) -> Result<Vec<u8>> {
    let certificate = x509_cert::Certificate::from_der(der)
        .map_err(|e| certificate_error("invalid X.509 certificate", e))?;
    let spki = certificate.tbs_certificate.subject_public_key_info;

    ensure_rsa(spki.algorithm.oid)?;
    spki.to_der()
        .map_err(|e| certificate_error("failed to encode SPKI", e))
}

fn ensure_rsa(oid: ObjectIdentifier) -> Result<()> {
    if oid != RSA_ENCRYPTION_OID {
        return Err(certificate_error(
            "unsupported key algorithm",
            format!("{oid} (expected rsaEncryption)"),
        ));
    }
    Ok(())
}
