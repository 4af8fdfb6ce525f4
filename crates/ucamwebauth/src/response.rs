//! WLS response decoding
//!
//! A WLS response is a single string of fourteen fields joined with `!`:
//!
//! ```text
//! ver!status!msg!issue!id!url!principal!ptags!auth!sso!life!params!kid!sig
//! ```
//!
//! Fields without a relevant value are sent as empty strings, so the field
//! count never changes. Decoding is purely syntactic: nothing in this module
//! decides whether the response can be trusted. See [`crate::validate`] for
//! that.

use crate::error::{Error, Result};
use crate::limits::{
    MAX_DECODED_SIGNATURE_SIZE, MAX_RESPONSE_LENGTH, MAX_SIGNATURE_B64_SIZE, PROTOCOL_VERSION,
    RESPONSE_FIELD_COUNT, SIGNED_FIELD_COUNT,
};
use crate::status::StatusCode;
use crate::utils::bounds::{validate_field_size, validate_timestamp_bounds};
use crate::utils::wls_base64;
use chrono::{DateTime, NaiveDateTime, Utc};
use percent_encoding::percent_decode_str;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Wire format of the `issue` field, e.g. `20240101T120000Z`
const ISSUE_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const ISSUE_LENGTH: usize = 16;

/// A decoded, not yet trusted, WLS response
///
/// Either every field decoded or construction failed; there is no partially
/// populated value. Nothing here should be relied on before the response has
/// been through [`crate::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseToken {
    protocol_version: u32,
    status: StatusCode,
    status_message: Option<String>,
    issued_at: DateTime<Utc>,
    response_id: String,
    request_url: String,
    principal: String,
    ptags: BTreeSet<String>,
    auth_type: Option<String>,
    sso_types: Vec<String>,
    session_remaining_seconds: Option<u64>,
    echoed_params: String,
    key_id: Option<u64>,
    raw_signature: Option<Vec<u8>>,
    signed_region: String,
}

impl ResponseToken {
    /// Decode a raw `WLS-Response` value
    ///
    /// # Errors
    /// [`Error::MalformedResponse`] when the value violates the wire grammar.
    pub fn decode(raw: &str) -> Result<Self> {
        if raw.len() > MAX_RESPONSE_LENGTH {
            return Err(Error::malformed(format!(
                "response too large: {} bytes (maximum: {MAX_RESPONSE_LENGTH} bytes)",
                raw.len()
            )));
        }

        let fields: Vec<&str> = raw.split('!').collect();
        if fields.len() != RESPONSE_FIELD_COUNT {
            return Err(Error::malformed(format!(
                "wrong number of parameters in response: expected {RESPONSE_FIELD_COUNT}, got {}",
                fields.len()
            )));
        }

        // ver is checked first; nothing else means anything under another version
        let protocol_version = parse_unsigned::<u32>("version number", fields[0])?;
        if protocol_version != PROTOCOL_VERSION {
            return Err(Error::malformed(format!(
                "unsupported version: {protocol_version}"
            )));
        }

        let status =
            parse_unsigned::<u32>("status code", fields[1]).map(StatusCode::from_code)?;

        let issued_at = parse_issue(fields[3])?;

        let request_url = percent_decode_str(fields[5])
            .decode_utf8()
            .map_err(|e| Error::malformed(format!("url parameter is not a valid url: {e}")))?
            .into_owned();

        let session_remaining_seconds = optional(fields[10])
            .map(|life| parse_unsigned::<u64>("life parameter", life))
            .transpose()?;

        let key_id = optional(fields[12])
            .map(|kid| parse_unsigned::<u64>("kid parameter", kid))
            .transpose()?;

        let raw_signature = optional(fields[13])
            .map(|sig| {
                validate_field_size("sig", sig, MAX_SIGNATURE_B64_SIZE)?;
                wls_base64::decode_bytes(sig, MAX_DECODED_SIGNATURE_SIZE)
            })
            .transpose()?;

        Ok(Self {
            protocol_version,
            status,
            status_message: optional(fields[2]).map(str::to_string),
            issued_at,
            response_id: fields[4].to_string(),
            request_url,
            principal: fields[6].to_string(),
            ptags: split_tokens(fields[7]).collect(),
            auth_type: optional(fields[8]).map(str::to_string),
            sso_types: split_tokens(fields[9]).collect(),
            session_remaining_seconds,
            echoed_params: fields[11].to_string(),
            key_id,
            raw_signature,
            signed_region: fields[..SIGNED_FIELD_COUNT].join("!"),
        })
    }

    pub fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Text from the WLS describing the status; untrusted, for display only
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// The `id` field; unique for this WLS in combination with `issued_at`
    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    /// Identifier pair for a replay cache
    pub fn nonce(&self) -> (DateTime<Utc>, &str) {
        (self.issued_at, &self.response_id)
    }

    /// The percent-decoded URL this response claims to answer
    pub fn request_url(&self) -> &str {
        &self.request_url
    }

    /// Authenticated identity; only meaningful when the status is 200
    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn ptags(&self) -> &BTreeSet<String> {
        &self.ptags
    }

    /// Authentication type used interactively for this request, if any
    pub fn auth_type(&self) -> Option<&str> {
        self.auth_type.as_deref()
    }

    /// Authentication types of the earlier sessions this one relies on
    pub fn sso_types(&self) -> &[String] {
        &self.sso_types
    }

    pub fn session_remaining_seconds(&self) -> Option<u64> {
        self.session_remaining_seconds
    }

    /// The request `params` value, echoed back verbatim
    pub fn echoed_params(&self) -> &str {
        &self.echoed_params
    }

    pub fn key_id(&self) -> Option<u64> {
        self.key_id
    }

    pub fn raw_signature(&self) -> Option<&[u8]> {
        self.raw_signature.as_deref()
    }

    /// The exact bytes covered by the signature: fields 0 to 11 as received
    pub fn signed_region(&self) -> &str {
        &self.signed_region
    }
}

impl FromStr for ResponseToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

/// Decode a raw `WLS-Response` value
pub fn decode(raw: &str) -> Result<ResponseToken> {
    ResponseToken::decode(raw)
}

/// Empty fields mean "absent"
fn optional(field: &str) -> Option<&str> {
    (!field.is_empty()).then_some(field)
}

/// Comma separated tokens; an empty field is an empty sequence
fn split_tokens(field: &str) -> impl Iterator<Item = String> + '_ {
    optional(field)
        .into_iter()
        .flat_map(|f| f.split(','))
        .map(str::to_string)
}

/// Parse a plain run of ASCII digits
///
/// `str::parse` also accepts a leading `+`; the wire format does not.
/// ASCII digits only; no sign, whitespace or empty value
fn parse_unsigned<T: FromStr>(name: &str, field: &str) -> Result<T> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::malformed(format!(
            "{name} must be an integer, not '{field}'"
        )));
    }
    field
        .parse()
        .map_err(|_| Error::malformed(format!("{name} out of range: '{field}'")))
}

fn parse_issue(field: &str) -> Result<DateTime<Utc>> {
    let invalid = || Error::malformed(format!("issue time is not a valid time, got '{field}'"));

    if field.len() != ISSUE_LENGTH || !field.is_ascii() {
        return Err(invalid());
    }

    let issued_at = NaiveDateTime::parse_from_str(field, ISSUE_FORMAT)
        .map_err(|_| invalid())?
        .and_utc();
    validate_timestamp_bounds(issued_at.timestamp())?;

    Ok(issued_at)
}
