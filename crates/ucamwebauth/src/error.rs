//! Errors for ucamwebauth

use thiserror::Error;

/// Ucam-WebAuth errors
///
/// The detail strings are meant for logs. Callers must not show them to
/// end-users; use [`Error::kind`] to pick a user-facing response instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ============================================================================
    // Response Errors
    // ============================================================================
    /// The response violates the wire-format grammar
    #[error("Malformed WLS response: {0}")]
    MalformedResponse(String),

    /// The response is well-formed but failed a trust or policy check
    #[error("Invalid WLS response: {0}")]
    InvalidResponse(String),

    /// The response names a key that is not in the certificate store
    #[error("Public key not found: {0}")]
    PublicKeyNotFound(String),

    // ============================================================================
    // Provisioning Errors
    // ============================================================================
    #[error("Invalid certificate: {0}")]
    CertificateInvalid(String),

    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport or client integrity problem
    Malformed,
    /// Trust or policy failure
    Invalid,
    /// Certificate store needs updating
    KeyNotFound,
    /// Certificate or policy provisioning problem
    Configuration,
}

impl Error {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedResponse(_) => ErrorKind::Malformed,
            Error::InvalidResponse(_) => ErrorKind::Invalid,
            Error::PublicKeyNotFound(_) => ErrorKind::KeyNotFound,
            Error::CertificateInvalid(_) | Error::ConfigurationInvalid(_) => {
                ErrorKind::Configuration
            }
        }
    }

    pub(crate) fn malformed(details: impl Into<String>) -> Self {
        Error::MalformedResponse(details.into())
    }

    pub(crate) fn invalid(details: impl Into<String>) -> Self {
        Error::InvalidResponse(details.into())
    }
}

/// Result type alias for ucamwebauth operations
pub type Result<T> = std::result::Result<T, Error>;
