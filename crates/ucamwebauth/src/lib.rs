//! # ucamwebauth - Ucam-WebAuth response validation
//!
//! Decodes and validates the signed `WLS-Response` a web login service (WLS)
//! such as Raven appends to the URL when it sends a user back to an
//! application.
//!
//! Validation happens in two stages. [`ResponseToken::decode`] checks the
//! structure and syntax of the fourteen `!`-separated fields. [`validate`]
//! then checks freshness, the return URL, the signature and the
//! authentication types, and produces a [`TrustedIdentity`] only when every
//! check passed.
//!
//! ```ignore
//! use ucamwebauth::*;
//!
//! let validator = ResponseValidator::new()
//!     .policy(PolicyConfig::new("https://example.org/return").timeout(60))
//!     .certificates(KeyRing::from_pem_entries([(2, RAVEN_PUBKEY2)])?)
//!     .build();
//!
//! match validator.verify(wls_response)? {
//!     Outcome::Authenticated(identity) => println!("Hello {}", identity.principal()),
//!     Outcome::NotAuthenticated(status) => println!("Not logged in: {}", status.status),
//! }
//! ```
//!
//! ## Signatures
//!
//! Protocol version 3 signs with RSASSA-PKCS1-v1_5 over SHA-1. That choice
//! is fixed by the login service and kept for interoperability only.
//!
//! ## References
//!
//! - [WAA->WLS communication protocol](https://raven.cam.ac.uk/project/waa2wls-protocol.txt)
//! - [RFC 3447](https://datatracker.ietf.org/doc/html/rfc3447): PKCS #1 v2.1

mod error;

// Internal modules
pub(crate) mod limits;
pub(crate) mod signature;
pub(crate) mod utils;

pub(crate) mod certs;
pub(crate) mod policy;
pub(crate) mod redirect;
pub(crate) mod request;
pub(crate) mod response;
pub(crate) mod status;
pub(crate) mod validator;

// Public Interface
pub use certs::{Certificate, CertificateStore, KeyRing};
pub use error::{Error, ErrorKind, Result};
pub use policy::{AuthTypes, PolicyConfig};
pub use redirect::next_destination;
pub use request::{AuthRequest, Interaction};
pub use response::{ResponseToken, decode};
pub use status::{StatusCode, StatusOutcome};
pub use validator::{Outcome, ResponseValidator, TrustedIdentity, decode_and_validate, validate};
