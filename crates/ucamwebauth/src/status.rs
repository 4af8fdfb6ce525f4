//! WLS status codes
use std::fmt;

/// Outcome code carried in the `status` field of a WLS response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200: Successful authentication
    Success,
    /// 410: The user cancelled the authentication request
    Cancelled,
    /// 510: No mutually acceptable authentication types available
    NoAcceptableAuthType,
    /// 520: Unsupported protocol version
    UnsupportedVersion,
    /// 530: General request parameter error
    ParameterError,
    /// 540: Interaction would be required
    InteractionRequired,
    /// 560: WAA not authorised
    NotAuthorised,
    /// 570: Authentication declined
    Declined,
    /// Any code this crate does not recognise; always a non-success
    Other(u32),
}

impl StatusCode {
    /// Map a numeric code to its status
    pub const fn from_code(code: u32) -> Self {
        match code {
            200 => StatusCode::Success,
            410 => StatusCode::Cancelled,
            510 => StatusCode::NoAcceptableAuthType,
            520 => StatusCode::UnsupportedVersion,
            530 => StatusCode::ParameterError,
            540 => StatusCode::InteractionRequired,
            560 => StatusCode::NotAuthorised,
            570 => StatusCode::Declined,
            other => StatusCode::Other(other),
        }
    }

    /// Numeric code as sent on the wire
    pub const fn code(&self) -> u32 {
        match self {
            StatusCode::Success => 200,
            StatusCode::Cancelled => 410,
            StatusCode::NoAcceptableAuthType => 510,
            StatusCode::UnsupportedVersion => 520,
            StatusCode::ParameterError => 530,
            StatusCode::InteractionRequired => 540,
            StatusCode::NotAuthorised => 560,
            StatusCode::Declined => 570,
            StatusCode::Other(code) => *code,
        }
    }

    /// Human-readable description of the status
    pub const fn description(&self) -> &'static str {
        match self {
            StatusCode::Success => "Successful authentication",
            StatusCode::Cancelled => "The user cancelled the authentication request",
            StatusCode::NoAcceptableAuthType => {
                "No mutually acceptable authentication types available"
            }
            StatusCode::UnsupportedVersion => "Unsupported protocol version",
            StatusCode::ParameterError => "General request parameter error",
            StatusCode::InteractionRequired => "Interaction would be required",
            StatusCode::NotAuthorised => "WAA not authorised",
            StatusCode::Declined => "Authentication declined",
            StatusCode::Other(_) => "Unrecognised status",
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, StatusCode::Success)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.description())
    }
}

/// A well-formed response that does not authenticate anyone
///
/// Returned for every status other than 200. This is a normal, reportable
/// state and not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusOutcome {
    /// Status reported by the WLS
    pub status: StatusCode,
    /// Optional text from the WLS; untrusted, for display only
    pub message: Option<String>,
    /// Request parameters echoed back by the WLS
    pub echoed_params: String,
}
