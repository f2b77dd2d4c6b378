//! Claim checks shared by every token the library accepts.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::constants::TOKEN_SKEW_SECONDS;
use crate::error::{Result, VerifiedIdError};

/// Seconds since the Unix epoch.
pub fn now_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// A token whose iat is at or past `now + skew` is not valid yet.
pub fn validate_iat(iat: Option<u64>, now: u64) -> Result<()> {
    match iat {
        Some(iat) if now + TOKEN_SKEW_SECONDS <= iat => Err(VerifiedIdError::iat_has_not_occurred()),
        _ => Ok(()),
    }
}

pub fn validate_exp(exp: Option<u64>, now: u64) -> Result<()> {
    match exp {
        Some(exp) if now.saturating_sub(TOKEN_SKEW_SECONDS) >= exp => {
            Err(VerifiedIdError::token_expired())
        }
        _ => Ok(()),
    }
}

pub fn validate_times(iat: Option<u64>, exp: Option<u64>) -> Result<()> {
    let now = now_seconds();
    validate_exp(exp, now)?;
    validate_iat(iat, now)
}

/// `actual` must be present and equal to `expected`.
pub fn validate_property(property: &str, expected: &str, actual: Option<&str>) -> Result<()> {
    match actual {
        Some(actual) if actual == expected => Ok(()),
        actual => Err(VerifiedIdError::invalid_property(property, expected, actual)),
    }
}
