use crate::certs::{CertificateStore, KeyRing};
use crate::error::{Error, Result};
use crate::policy::PolicyConfig;
use crate::response::ResponseToken;
use crate::signature::SignatureScheme;
use crate::status::{StatusCode, StatusOutcome};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;

/// An identity asserted by a response that passed every check
///
/// Only produced by validation; there is no public constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedIdentity {
    principal: String,
    ptags: BTreeSet<String>,
    issued_at: DateTime<Utc>,
    response_id: String,
    session_remaining_seconds: Option<u64>,
    auth_type_used: String,
    interactive: bool,
    echoed_params: String,
}

impl TrustedIdentity {
    /// The authenticated user, exactly as sent by the WLS
    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn ptags(&self) -> &BTreeSet<String> {
        &self.ptags
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Identifier pair for a replay cache
    pub fn nonce(&self) -> (DateTime<Utc>, &str) {
        (self.issued_at, &self.response_id)
    }

    /// Upper bound for the lifetime of any session built on this identity
    pub fn session_remaining_seconds(&self) -> Option<u64> {
        self.session_remaining_seconds
    }

    /// Authentication type the identity is credited with
    pub fn auth_type_used(&self) -> &str {
        &self.auth_type_used
    }

    /// Whether the user authenticated interactively for this request
    pub fn interactive(&self) -> bool {
        self.interactive
    }

    /// The request `params` value, echoed back verbatim
    pub fn echoed_params(&self) -> &str {
        &self.echoed_params
    }
}

/// Result of validating a well-formed, correctly bound response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Status 200 with a valid signature and acceptable authentication
    Authenticated(TrustedIdentity),
    /// Any other status; nobody was authenticated
    NotAuthenticated(StatusOutcome),
}

impl Outcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Outcome::Authenticated(_))
    }

    pub fn identity(&self) -> Option<&TrustedIdentity> {
        match self {
            Outcome::Authenticated(identity) => Some(identity),
            Outcome::NotAuthenticated(_) => None,
        }
    }

    pub fn into_identity(self) -> Option<TrustedIdentity> {
        match self {
            Outcome::Authenticated(identity) => Some(identity),
            Outcome::NotAuthenticated(_) => None,
        }
    }
}

/// Validate a decoded response
///
/// The checks run in a fixed order and stop at the first failure:
///
/// ```text
/// freshness ─▶ return URL ─▶ status ─▶ key lookup ─▶ signature ─▶ auth policy
///                               │
///                               └─ not 200: Outcome::NotAuthenticated
/// ```
///
/// Freshness and URL binding apply to every response. Only successful
/// responses are required to carry a signature.
///
/// # Errors
/// - [`Error::InvalidResponse`] for stale, future-dated, misdirected or badly
///   signed responses and unacceptable authentication types
/// - [`Error::PublicKeyNotFound`] when `kid` is missing or unknown to `certs`
/// - [`Error::MalformedResponse`] when a successful response names no
///   authentication type at all
/// - [`Error::ConfigurationInvalid`] when `config` is out of bounds
pub fn validate<S>(
    token: ResponseToken,
    now: DateTime<Utc>,
    config: &PolicyConfig,
    certs: &S,
) -> Result<Outcome>
where
    S: CertificateStore + ?Sized,
{
    config.check()?;

    config
        .check_freshness(token.issued_at(), now)
        .inspect_err(|e| tracing::debug!("WLS response failed freshness check: {}", e))?;

    config
        .check_return_url(token.request_url())
        .inspect_err(|e| tracing::debug!("WLS response failed URL binding: {}", e))?;

    if token.status() != StatusCode::Success {
        tracing::debug!("WLS response reported status {}", token.status());
        return Ok(Outcome::NotAuthenticated(StatusOutcome {
            status: token.status(),
            message: token.status_message().map(ToString::to_string),
            echoed_params: token.echoed_params().to_string(),
        }));
    }

    let key_id = token.key_id().ok_or_else(|| {
        tracing::debug!("Successful WLS response carries no kid");
        Error::PublicKeyNotFound("response does not name a signing key".into())
    })?;

    let certificate = certs.lookup(key_id).ok_or_else(|| {
        tracing::warn!("WLS response signed with unknown key id {}", key_id);
        Error::PublicKeyNotFound(format!(
            "no public key for kid {key_id}; the certificate store may need updating"
        ))
    })?;

    let signature = token.raw_signature().ok_or_else(|| {
        tracing::debug!("Successful WLS response carries no signature");
        Error::invalid("successful response is not signed")
    })?;

    SignatureScheme::for_protocol()
        .verify(token.signed_region(), signature, certificate)
        .inspect_err(|_| {
            tracing::debug!(
                "WLS response signature did not verify ({}, kid {})",
                SignatureScheme::for_protocol(),
                key_id
            )
        })?;

    let (auth_type_used, interactive) = config
        .check_authentication(token.auth_type(), token.sso_types())
        .inspect_err(|e| tracing::debug!("WLS response failed authentication policy: {}", e))?;

    tracing::debug!(
        "WLS response authenticated '{}' via {} (kid {})",
        token.principal(),
        auth_type_used,
        key_id
    );

    Ok(Outcome::Authenticated(TrustedIdentity {
        principal: token.principal().to_string(),
        ptags: token.ptags().clone(),
        issued_at: token.issued_at(),
        response_id: token.response_id().to_string(),
        session_remaining_seconds: token.session_remaining_seconds(),
        auth_type_used,
        interactive,
        echoed_params: token.echoed_params().to_string(),
    }))
}

/// Decode and validate a raw `WLS-Response` value
pub fn decode_and_validate<S>(
    raw: &str,
    now: DateTime<Utc>,
    config: &PolicyConfig,
    certs: &S,
) -> Result<Outcome>
where
    S: CertificateStore + ?Sized,
{
    let token = ResponseToken::decode(raw)
        .inspect_err(|e| tracing::debug!("WLS response could not be decoded: {}", e))?;
    validate(token, now, config, certs)
}

/// Shared certificate store handle
pub(crate) type SharedCertificates = Arc<dyn CertificateStore + Send + Sync + 'static>;

/// WLS response validator
///
/// Configured once and reused for every response. Clones share the same
/// certificate store snapshot.
#[derive(Clone)]
pub struct ResponseValidator {
    config_policy: PolicyConfig,
    config_certificates: SharedCertificates,
}

impl ResponseValidator {
    /// Create a new validator with secure defaults
    ///
    /// The default policy has no expected return URL and the default store is
    /// empty, so nothing validates until both are configured.
    pub fn new() -> Self {
        Self {
            config_policy: PolicyConfig::default(),
            config_certificates: Arc::new(KeyRing::new()),
        }
    }

    /// Configure the acceptance policy
    pub fn policy(&mut self, policy: PolicyConfig) -> &mut Self {
        self.config_policy = policy;
        self
    }

    /// Configure the certificate store
    pub fn certificates<S>(&mut self, store: S) -> &mut Self
    where
        S: CertificateStore + Send + Sync + 'static,
    {
        self.config_certificates = Arc::new(store);
        self
    }

    /// Configure an already shared certificate store
    pub fn shared_certificates(
        &mut self,
        store: Arc<dyn CertificateStore + Send + Sync + 'static>,
    ) -> &mut Self {
        self.config_certificates = store;
        self
    }

    pub fn build(&mut self) -> Self {
        self.clone()
    }

    /// A copy of this validator using a new certificate store
    ///
    /// Validations already running on `self` keep the old store.
    pub fn with_certificates<S>(&self, store: S) -> Self
    where
        S: CertificateStore + Send + Sync + 'static,
    {
        Self {
            config_policy: self.config_policy.clone(),
            config_certificates: Arc::new(store),
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config_policy
    }

    /// Validate a raw response against the system clock
    pub fn verify(&self, raw: &str) -> Result<Outcome> {
        self.verify_at(raw, Utc::now())
    }

    /// Validate a raw response as of `now`
    pub fn verify_at(&self, raw: &str, now: DateTime<Utc>) -> Result<Outcome> {
        decode_and_validate(
            raw,
            now,
            &self.config_policy,
            self.config_certificates.as_ref(),
        )
    }
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResponseValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseValidator")
            .field("config_policy", &self.config_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 10).unwrap()
    }

    fn policy() -> PolicyConfig {
        PolicyConfig::new("https://example.org/return")
    }

    fn response(status: &str, url: &str, kid: &str, sig: &str) -> String {
        format!("3!{status}!!20240101T120000Z!abc123!{url}!alice!current!pwd!!3600!!{kid}!{sig}")
    }

    #[test]
    fn test_non_success_needs_no_signature() {
        let raw = response("410", "https%3A%2F%2Fexample.org%2Freturn", "", "");
        let outcome = decode_and_validate(&raw, now(), &policy(), &KeyRing::new()).unwrap();

        assert!(!outcome.is_authenticated());
        assert!(matches!(
            outcome,
            Outcome::NotAuthenticated(StatusOutcome {
                status: StatusCode::Cancelled,
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_status_is_not_authenticated() {
        let raw = response("299", "https%3A%2F%2Fexample.org%2Freturn", "", "");
        let outcome = decode_and_validate(&raw, now(), &policy(), &KeyRing::new()).unwrap();
        assert!(outcome.identity().is_none());
    }

    #[test]
    fn test_non_success_still_checks_url() {
        let raw = response("410", "https%3A%2F%2Fevil.example%2Freturn", "", "");
        let result = decode_and_validate(&raw, now(), &policy(), &KeyRing::new());
        assert!(matches!(result, Err(Error::InvalidResponse(_))));
    }

    #[test]
    fn test_non_success_still_checks_freshness() {
        let raw = response("410", "https%3A%2F%2Fexample.org%2Freturn", "", "");
        let later = Utc.with_ymd_and_hms(2024, 1, 1, 13, 0, 0).unwrap();
        let result = decode_and_validate(&raw, later, &policy(), &KeyRing::new());
        assert!(matches!(result, Err(Error::InvalidResponse(msg)) if msg.contains("timed out")));
    }

    #[test]
    fn test_success_without_kid() {
        let raw = response("200", "https%3A%2F%2Fexample.org%2Freturn", "", "");
        let result = decode_and_validate(&raw, now(), &policy(), &KeyRing::new());
        assert!(matches!(result, Err(Error::PublicKeyNotFound(_))));
    }

    #[test]
    fn test_success_with_unknown_kid() {
        let raw = response(
            "200",
            "https%3A%2F%2Fexample.org%2Freturn",
            "901",
            "SGVsbG8_",
        );
        let result = decode_and_validate(&raw, now(), &policy(), &KeyRing::new());
        assert!(matches!(result, Err(Error::PublicKeyNotFound(msg)) if msg.contains("901")));
    }

    #[test]
    fn test_success_with_large_kid() {
        let raw = response(
            "200",
            "https%3A%2F%2Fexample.org%2Freturn",
            "4294967296",
            "SGVsbG8_",
        );
        let result = decode_and_validate(&raw, now(), &policy(), &KeyRing::new());
        assert!(matches!(
            result,
            Err(Error::PublicKeyNotFound(msg)) if msg.contains("4294967296")
        ));
    }

    #[test]
    fn test_large_status_is_not_authenticated() {
        let raw = response("99999", "https%3A%2F%2Fexample.org%2Freturn", "", "");
        let outcome = decode_and_validate(&raw, now(), &policy(), &KeyRing::new()).unwrap();
        assert!(matches!(
            outcome,
            Outcome::NotAuthenticated(StatusOutcome {
                status: StatusCode::Other(99999),
                ..
            })
        ));
    }

    #[test]
    fn test_misconfigured_policy() {
        let raw = response("410", "https%3A%2F%2Fexample.org%2Freturn", "", "");
        let result = decode_and_validate(&raw, now(), &PolicyConfig::default(), &KeyRing::new());
        assert!(matches!(result, Err(Error::ConfigurationInvalid(_))));
    }

    #[test]
    fn test_validator_defaults_reject() {
        let raw = response("410", "https%3A%2F%2Fexample.org%2Freturn", "", "");
        let validator = ResponseValidator::new();
        assert!(validator.verify_at(&raw, now()).is_err());
    }

    #[test]
    fn test_validator_builder() {
        let raw = response("410", "https%3A%2F%2Fexample.org%2Freturn", "", "");
        let validator = ResponseValidator::new()
            .policy(policy())
            .certificates(KeyRing::new())
            .build();

        let outcome = validator.verify_at(&raw, now()).unwrap();
        assert!(!outcome.is_authenticated());
        assert_eq!(validator.config().timeout_seconds(), 30);
    }

    #[test]
    fn test_validator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResponseValidator>();
    }
}
