//! `iat`/`exp` as sent by issuers and verifiers: integer or fractional
//! seconds. Fractions are truncated.
//!
//! Use with `#[serde(default, deserialize_with = "numeric_date::deserialize")]`
//! on an `Option<u64>` field.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumericDate {
    Seconds(u64),
    Fractional(f64),
}

impl NumericDate {
    fn seconds(self) -> u64 {
        match self {
            NumericDate::Seconds(seconds) => seconds,
            // saturating cast: negatives and NaN become 0
            NumericDate::Fractional(seconds) => seconds.trunc() as u64,
        }
    }
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let date = Option::<NumericDate>::deserialize(deserializer)?;
    Ok(date.map(NumericDate::seconds))
}
