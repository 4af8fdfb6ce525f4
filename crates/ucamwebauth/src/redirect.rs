//! Post-login redirect destination
//!
//! An application can ask to come back to a page after login by putting
//! `next=<url>` in the request `params` (see [`crate::AuthRequest::next`]).
//! The value comes back through the WLS, so it is only honoured when it
//! stays on the application's own host.

use crate::limits::MAX_NEXT_URL_LENGTH;
use url::Url;
use url::form_urlencoded;

/// Extract a safe `next` destination from echoed request params
///
/// Returns the destination when it is a relative reference or an absolute
/// http(s) URL on `request_host` (`host` or `host:port`). Anything else,
/// including scheme-relative URLs to other hosts, yields `None`.
pub fn next_destination(echoed_params: &str, request_host: &str) -> Option<String> {
    let next = form_urlencoded::parse(echoed_params.as_bytes())
        .find(|(key, _)| key == "next")
        .map(|(_, value)| value.into_owned())?;

    if next.is_empty() || next.len() > MAX_NEXT_URL_LENGTH {
        return None;
    }

    let base = Url::parse(&format!("https://{request_host}/")).ok()?;
    let resolved = base.join(&next).ok()?;

    let same_origin = matches!(resolved.scheme(), "http" | "https")
        && resolved.host_str() == base.host_str()
        && resolved.port() == base.port();

    if !same_origin {
        tracing::debug!("Ignoring off-site post-login redirect to {}", next);
        return None;
    }

    Some(next)
}
