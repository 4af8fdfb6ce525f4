//! Base64 variant used by the WLS for response signatures
//!
//! The WLS encodes signatures with standard base64 (RFC 4648) and then
//! replaces `+`, `/` and `=` with `-`, `.` and `_` to reduce the URL-encoding
//! overhead. Decoding maps those characters back and hands the result to the
//! `base64` crate.

use crate::error::{Error, Result};
use base64::{Engine, engine::general_purpose::STANDARD};

/// Map the WLS alphabet back to the standard one
fn to_standard_alphabet(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '-' => '+',
            '.' => '/',
            '_' => '=',
            other => other,
        })
        .collect()
}

/// Decode a WLS base64 string to bytes with maximum size limit
pub(crate) fn decode_bytes(input: &str, max_size: usize) -> Result<Vec<u8>> {
    // The WLS never emits these; accepting them would give one signature
    // several valid encodings
    if input.contains(['+', '/', '=']) {
        return Err(Error::malformed(
            "signature contains characters outside the WLS base64 alphabet",
        ));
    }

    let result = STANDARD
        .decode(to_standard_alphabet(input))
        .map_err(|e| Error::malformed(format!("signature base64 decode failed: {e}")))?;

    if result.len() > max_size {
        return Err(Error::malformed(format!(
            "decoded signature exceeds limit: {} bytes (max: {max_size})",
            result.len()
        )));
    }

    Ok(result)
}
