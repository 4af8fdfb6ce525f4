//! Authentication request parameters
//!
//! The data an application sends to the WLS login page when it redirects a
//! user there. This module only renders the redirect URL; issuing the
//! redirect belongs to the web layer.

use crate::error::{Error, Result};
use crate::limits::{MAX_LOGIN_URL_LENGTH, PROTOCOL_VERSION};
use crate::policy::{AuthTypes, PolicyConfig};
use url::Url;
use url::form_urlencoded;

/// The `iact` request parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// `iact=yes`: the user must re-authenticate interactively
    Required,
    /// `iact=no`: the WLS must not interact with the user
    Forbidden,
}

impl Interaction {
    const fn as_str(&self) -> &'static str {
        match self {
            Interaction::Required => "yes",
            Interaction::Forbidden => "no",
        }
    }
}

/// A WLS authentication request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    return_url: String,
    description: Option<String>,
    auth_types: Vec<String>,
    interaction: Option<Interaction>,
    message: Option<String>,
    params: Option<String>,
    fail: bool,
}

impl AuthRequest {
    /// A request whose response is sent to `return_url`
    pub fn new(return_url: impl Into<String>) -> Self {
        Self {
            return_url: return_url.into(),
            description: None,
            auth_types: Vec::new(),
            interaction: None,
            message: None,
            params: None,
            fail: false,
        }
    }

    /// A request matching what `policy` will accept
    ///
    /// The return URL, acceptable authentication types and interaction
    /// requirement are taken from the policy.
    pub fn for_policy(policy: &PolicyConfig) -> Self {
        let mut request = Self::new(policy.expected_return_url());
        if let AuthTypes::Only(types) = policy.auth_types() {
            request.auth_types = types.iter().cloned().collect();
        }
        if policy.interactive_required() {
            request.interaction = Some(Interaction::Required);
        }
        request
    }

    /// Description of the resource, shown on the login page
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the interaction requirement
    pub fn interaction(mut self, interaction: Interaction) -> Self {
        self.interaction = Some(interaction);
        self
    }

    /// Why authentication is being requested, shown on the login page
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Opaque data the WLS echoes back in the response
    pub fn params(mut self, params: impl Into<String>) -> Self {
        self.params = Some(params.into());
        self
    }

    /// Ask to come back to `next` after login
    ///
    /// Stored as `next=<value>` in `params`; read it back from a response
    /// with [`crate::next_destination`].
    pub fn next(self, next: &str) -> Self {
        let params = form_urlencoded::Serializer::new(String::new())
            .append_pair("next", next)
            .finish();
        self.params(params)
    }

    /// Ask the WLS to report errors itself instead of redirecting back
    pub fn fail(mut self, fail: bool) -> Self {
        self.fail = fail;
        self
    }

    /// Request parameters in protocol order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("ver", PROTOCOL_VERSION.to_string()),
            ("url", self.return_url.clone()),
        ];

        if let Some(description) = &self.description {
            pairs.push(("desc", description.clone()));
        }
        if !self.auth_types.is_empty() {
            pairs.push(("aauth", self.auth_types.join(",")));
        }
        if let Some(interaction) = self.interaction {
            pairs.push(("iact", interaction.as_str().to_string()));
        }
        if let Some(message) = &self.message {
            pairs.push(("msg", message.clone()));
        }
        if let Some(params) = &self.params {
            pairs.push(("params", params.clone()));
        }
        if self.fail {
            pairs.push(("fail", "yes".to_string()));
        }

        pairs
    }

    /// Render the redirect to the WLS login page at `login_url`
    pub fn to_url(&self, login_url: &str) -> Result<Url> {
        let mut url = validate_login_url(login_url)?;
        if self.return_url.trim().is_empty() {
            return Err(Error::ConfigurationInvalid(
                "return URL cannot be empty".into(),
            ));
        }

        url.query_pairs_mut().extend_pairs(self.query_pairs());
        Ok(url)
    }
}

/// Validate the WLS login page URL format and size
fn validate_login_url(login_url: &str) -> Result<Url> {
    if login_url.trim().is_empty() {
        return Err(Error::ConfigurationInvalid(
            "login URL cannot be empty".into(),
        ));
    }

    if login_url.len() > MAX_LOGIN_URL_LENGTH {
        return Err(Error::ConfigurationInvalid(format!(
            "login URL too long: {} characters (maximum: {MAX_LOGIN_URL_LENGTH} characters)",
            login_url.len()
        )));
    }

    let parsed = login_url
        .parse::<Url>()
        .map_err(|e| Error::ConfigurationInvalid(format!("invalid login URL: {e}")))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(Error::ConfigurationInvalid(
            "login URL must use http or https scheme".into(),
        ));
    }

    if parsed.host_str().is_none() {
        return Err(Error::ConfigurationInvalid(
            "login URL must have a valid host".into(),
        ));
    }

    if parsed.query().is_some() {
        return Err(Error::ConfigurationInvalid(
            "login URL must not carry a query".into(),
        ));
    }

    Ok(parsed)
}
