//! TTL duration grammar.
//!
//! A TTL is a non-negative integer with an optional unit suffix:
//!
//! ```text
//! ttl  = digits [ unit ]
//! unit = "s" | "m" | "h" | "d"
//! ```
//!
//! A bare integer is read as seconds, so `"30"` and `"30s"` are the same.
//! Milliseconds, fractions, signs and compound forms such as `1h30m` are
//! rejected.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("duration is empty")]
    Empty,

    #[error("invalid duration `{0}` (expected e.g. 30, 30s, 5m, 2h, 1d)")]
    Invalid(String),

    #[error("duration `{0}` is too large")]
    Overflow(String),
}

/// Parse a TTL string into a [`Duration`].
pub fn parse_ttl(s: &str) -> Result<Duration, DurationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(DurationError::Empty);
    }

    let (digits, multiplier) = match s.char_indices().last() {
        Some((idx, 's')) => (&s[..idx], 1),
        Some((idx, 'm')) => (&s[..idx], 60),
        Some((idx, 'h')) => (&s[..idx], 60 * 60),
        Some((idx, 'd')) => (&s[..idx], 24 * 60 * 60),
        _ => (s, 1),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DurationError::Invalid(s.to_string()));
    }

    let value: u64 = digits
        .parse()
        .map_err(|_| DurationError::Overflow(s.to_string()))?;
    let secs = value
        .checked_mul(multiplier)
        .ok_or_else(|| DurationError::Overflow(s.to_string()))?;

    Ok(Duration::from_secs(secs))
}
