//! Size limit constants for input validation

/// Number of `!`-separated fields in a WLS response
pub(crate) const RESPONSE_FIELD_COUNT: usize = 14;

/// Number of leading fields covered by the signature (everything but kid and sig)
pub(crate) const SIGNED_FIELD_COUNT: usize = 12;

/// The only protocol version understood by this crate
pub(crate) const PROTOCOL_VERSION: u32 = 3;

/// Maximum length for a raw WLS response string (16KB)
pub(crate) const MAX_RESPONSE_LENGTH: usize = 16 * 1024;

// ============================================================================
// Signature limits
// ============================================================================

/// Maximum size for decoded signature bytes (1KB)
/// An 8192-bit modulus yields a 1024-byte signature
pub(crate) const MAX_DECODED_SIGNATURE_SIZE: usize = 1024;

/// Maximum size for the encoded signature field (1.5KB)
pub(crate) const MAX_SIGNATURE_B64_SIZE: usize = 1536;

// ============================================================================
// Policy bounds
// ============================================================================

/// Response timeout used when none is configured (30 seconds)
pub(crate) const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Maximum response timeout (1 day)
/// Prevents the timeout from effectively disabling the freshness check
pub(crate) const MAX_TIMEOUT_SECONDS: u64 = 86400;

/// Maximum tolerance for responses issued ahead of the local clock (5 minutes)
pub(crate) const MAX_CLOCK_SKEW_SECONDS: u64 = 300;

/// Authentication type accepted when none is configured
pub(crate) const DEFAULT_AUTH_TYPE: &str = "pwd";

// ============================================================================
// Timestamp bounds
// ============================================================================

/// Minimum valid Unix timestamp (1970-01-01 00:00:00 UTC)
pub(crate) const MIN_TIMESTAMP: i64 = 0;

/// Maximum valid Unix timestamp (2100-01-01 00:00:00 UTC)
pub(crate) const MAX_TIMESTAMP: i64 = 4_102_444_800;

// ============================================================================
// URL limits
// ============================================================================

/// Maximum length for the WLS login page URL (2048 characters)
pub(crate) const MAX_LOGIN_URL_LENGTH: usize = 2048;

/// Maximum length for a post-login redirect destination (2048 characters)
pub(crate) const MAX_NEXT_URL_LENGTH: usize = 2048;
