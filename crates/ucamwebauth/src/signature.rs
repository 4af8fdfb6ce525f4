//! Signature scheme for WLS responses
//!
//! The WLS signs with RSASSA-PKCS1-v1_5 over SHA-1 (RFC 3447). SHA-1 is
//! mandated by the Ucam-WebAuth protocol and the login service; it is kept
//! here only for interoperability and must not be taken as guidance for new
//! protocols. The legacy WLS keys are 1024-bit, so the accepted modulus range
//! starts there.

use crate::certs::Certificate;
use crate::error::{Error, Result};

use aws_lc_rs::signature::{self, UnparsedPublicKey};

/// Signature algorithms understood by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SignatureScheme {
    /// RSASSA-PKCS1-v1_5 with SHA-1, 1024 to 8192 bit keys
    RsaPkcs1Sha1,
}

impl SignatureScheme {
    /// Scheme fixed by protocol version 3
    pub(crate) const fn for_protocol() -> Self {
        SignatureScheme::RsaPkcs1Sha1
    }

    pub(crate) const fn as_str(&self) -> &'static str {
        match self {
            SignatureScheme::RsaPkcs1Sha1 => "RSASSA-PKCS1-v1_5/SHA-1",
        }
    }

    fn verification_algorithm(&self) -> &'static dyn signature::VerificationAlgorithm {
        match self {
            SignatureScheme::RsaPkcs1Sha1 => {
                &signature::RSA_PKCS1_1024_8192_SHA1_FOR_LEGACY_USE_ONLY
            }
        }
    }

    /// Verify a signature over the signed region of a response
    ///
    /// # Arguments
    /// * `signed_region` - The exact bytes the WLS signed
    /// * `signature` - The decoded signature bytes
    /// * `certificate` - Certificate holding the WLS public key
    pub(crate) fn verify(
        &self,
        signed_region: &str,
        signature: &[u8],
        certificate: &Certificate,
    ) -> Result<()> {
        let public_key =
            UnparsedPublicKey::new(self.verification_algorithm(), certificate.public_key_der());

        public_key
            .verify(signed_region.as_bytes(), signature)
            .map_err(|_| Error::invalid("the signature for this response is not valid"))
    }
}

impl std::fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
