//! Acceptance policy for WLS responses
//!
//! Freshness window, return URL binding and the authentication types the
//! application is prepared to accept.

use crate::error::{Error, Result};
use crate::limits::{
    DEFAULT_AUTH_TYPE, DEFAULT_TIMEOUT_SECONDS, MAX_CLOCK_SKEW_SECONDS, MAX_TIMEOUT_SECONDS,
};
use crate::utils::bounds::{checked_add_seconds, checked_sub_seconds};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Authentication types acceptable to the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthTypes {
    /// Any authentication type, including any earlier session
    Any,
    /// Only the listed types
    Only(BTreeSet<String>),
}

impl AuthTypes {
    /// Accept only the given types
    pub fn only<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AuthTypes::Only(types.into_iter().map(Into::into).collect())
    }

    pub fn accepts(&self, auth_type: &str) -> bool {
        match self {
            AuthTypes::Any => true,
            AuthTypes::Only(types) => types.contains(auth_type),
        }
    }
}

impl Default for AuthTypes {
    fn default() -> Self {
        AuthTypes::only([DEFAULT_AUTH_TYPE])
    }
}

/// Configuration for response validation
///
/// Every instance owns its settings; nothing is shared between instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    timeout_seconds: u64,
    clock_skew_seconds: u64,
    acceptable_auth_types: AuthTypes,
    require_interactive: bool,
    expected_return_url: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            clock_skew_seconds: 0,
            acceptable_auth_types: AuthTypes::default(),
            require_interactive: false,
            expected_return_url: String::new(),
        }
    }
}

impl PolicyConfig {
    /// Create a policy for responses returning to `expected_return_url`
    pub fn new(expected_return_url: impl Into<String>) -> Self {
        Self {
            expected_return_url: expected_return_url.into(),
            ..Self::default()
        }
    }

    /// Set the maximum response age
    ///
    /// # Security
    /// Must be between 1 second and 1 day; other values are rejected during
    /// validation.
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Tolerate responses issued up to `seconds` ahead of the local clock
    ///
    /// Maximum allowed value is 300 seconds.
    pub fn clock_skew(mut self, seconds: u64) -> Self {
        self.clock_skew_seconds = seconds;
        self
    }

    /// Accept only the listed authentication types
    pub fn acceptable_auth_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.acceptable_auth_types = AuthTypes::only(types);
        self
    }

    /// Accept any authentication type, including any earlier session
    pub fn accept_any_auth_type(mut self) -> Self {
        self.acceptable_auth_types = AuthTypes::Any;
        self
    }

    /// Require the user to have authenticated interactively for this request
    pub fn require_interactive(mut self, required: bool) -> Self {
        self.require_interactive = required;
        self
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    pub fn clock_skew_seconds(&self) -> u64 {
        self.clock_skew_seconds
    }

    pub fn auth_types(&self) -> &AuthTypes {
        &self.acceptable_auth_types
    }

    pub fn interactive_required(&self) -> bool {
        self.require_interactive
    }

    pub fn expected_return_url(&self) -> &str {
        &self.expected_return_url
    }

    /// Validate configuration bounds
    pub fn check(&self) -> Result<()> {
        if self.timeout_seconds == 0 || self.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(Error::ConfigurationInvalid(format!(
                "timeout must be between 1 and {MAX_TIMEOUT_SECONDS} seconds, got {}",
                self.timeout_seconds
            )));
        }
        if self.clock_skew_seconds > MAX_CLOCK_SKEW_SECONDS {
            return Err(Error::ConfigurationInvalid(format!(
                "clock skew too large: {} seconds (maximum: {MAX_CLOCK_SKEW_SECONDS} seconds)",
                self.clock_skew_seconds
            )));
        }
        if self.expected_return_url.trim().is_empty() {
            return Err(Error::ConfigurationInvalid(
                "expected return URL cannot be empty".into(),
            ));
        }
        Ok(())
    }

    /// The response must be neither future-dated nor older than the timeout
    pub(crate) fn check_freshness(
        &self,
        issued_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if issued_at > checked_add_seconds(now, self.clock_skew_seconds)? {
            return Err(Error::invalid(format!(
                "the timestamp on the response is in the future (issued {issued_at}, now {now})"
            )));
        }

        if issued_at < checked_sub_seconds(now, self.timeout_seconds)? {
            return Err(Error::invalid(format!(
                "response has timed out (issued {issued_at}, now {now}, timeout {}s)",
                self.timeout_seconds
            )));
        }

        Ok(())
    }

    /// Exact string comparison; no normalisation of case or trailing slashes
    pub(crate) fn check_return_url(&self, request_url: &str) -> Result<()> {
        if request_url != self.expected_return_url {
            return Err(Error::invalid(format!(
                "the URL in the response does not match the URL expected: '{request_url}'"
            )));
        }
        Ok(())
    }

    /// Decide whether the authentication provenance of a successful response
    /// is acceptable
    ///
    /// Returns the authentication type the identity is credited with and
    /// whether it was established interactively.
    pub(crate) fn check_authentication(
        &self,
        auth_type: Option<&str>,
        sso_types: &[String],
    ) -> Result<(String, bool)> {
        if let Some(auth) = auth_type {
            if !self.acceptable_auth_types.accepts(auth) {
                return Err(Error::invalid(format!(
                    "the response used the wrong type of authentication: '{auth}'"
                )));
            }
            return Ok((auth.to_string(), true));
        }

        if self.require_interactive {
            return Err(Error::invalid(
                "interactive authentication required but not received",
            ));
        }

        if sso_types.is_empty() {
            return Err(Error::malformed("no authentication types supplied"));
        }

        sso_types
            .iter()
            .find(|sso| self.acceptable_auth_types.accepts(sso))
            .map(|sso| (sso.clone(), false))
            .ok_or_else(|| {
                Error::invalid(format!(
                    "the response used the wrong type of authentication: {sso_types:?}"
                ))
            })
    }
}
