//! Bounds validation utilities
//!
//! Timestamp bounds, overflow-checked arithmetic and field size limits.

use crate::error::{Error, Result};
use crate::limits::{MAX_TIMESTAMP, MIN_TIMESTAMP};
use chrono::{DateTime, TimeDelta, Utc};

/// Check if timestamp is within acceptable bounds
pub(crate) fn validate_timestamp_bounds(value: i64) -> Result<()> {
    if !(MIN_TIMESTAMP..=MAX_TIMESTAMP).contains(&value) {
        return Err(Error::malformed(format!(
            "timestamp {value} out of bounds ({MIN_TIMESTAMP} to {MAX_TIMESTAMP})"
        )));
    }
    Ok(())
}

fn seconds_delta(seconds: u64) -> Option<TimeDelta> {
    i64::try_from(seconds).ok().and_then(TimeDelta::try_seconds)
}

/// Add a number of seconds to an instant with overflow protection
pub(crate) fn checked_add_seconds(at: DateTime<Utc>, seconds: u64) -> Result<DateTime<Utc>> {
    seconds_delta(seconds)
        .and_then(|delta| at.checked_add_signed(delta))
        .ok_or_else(|| Error::invalid("integer overflow in timestamp arithmetic"))
}

/// Subtract a number of seconds from an instant with overflow protection
pub(crate) fn checked_sub_seconds(at: DateTime<Utc>, seconds: u64) -> Result<DateTime<Utc>> {
    seconds_delta(seconds)
        .and_then(|delta| at.checked_sub_signed(delta))
        .ok_or_else(|| Error::invalid("integer overflow in timestamp arithmetic"))
}

/// Validate string field size
pub(crate) fn validate_field_size(field: &str, value: &str, max: usize) -> Result<()> {
    if value.len() > max {
        return Err(Error::malformed(format!(
            "field '{field}' too long: {} bytes (maximum: {max} bytes)",
            value.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_bounds() {
        assert!(validate_timestamp_bounds(0).is_ok());
        assert!(validate_timestamp_bounds(1_704_110_400).is_ok());
        assert!(validate_timestamp_bounds(-1).is_err());
        assert!(validate_timestamp_bounds(MAX_TIMESTAMP + 1).is_err());
    }

    #[test]
    fn test_checked_seconds() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
            + TimeDelta::milliseconds(900);

        let earlier = checked_sub_seconds(at, 30).unwrap();
        assert_eq!(at - earlier, TimeDelta::seconds(30));
        assert_eq!(earlier.timestamp_subsec_millis(), 900);
        assert_eq!(checked_add_seconds(at, 30).unwrap() - at, TimeDelta::seconds(30));

        assert!(checked_sub_seconds(at, u64::MAX).is_err());
        assert!(checked_add_seconds(DateTime::<Utc>::MAX_UTC, 1).is_err());
        assert!(checked_sub_seconds(DateTime::<Utc>::MIN_UTC, 1).is_err());
    }

    #[test]
    fn test_field_size() {
        assert!(validate_field_size("sig", "abc", 3).is_ok());
        assert!(matches!(
            validate_field_size("sig", "abcd", 3),
            Err(Error::MalformedResponse(msg)) if msg.contains("sig")
        ));
    }
}
