//! Calendar date validation for payloads.
//!
//! Dates are stored as `YYYY-MM-DD` text and compared as text by the patient
//! search, so only four-digit years are accepted.

use chrono::{Datelike, NaiveDate};
use serde::de::Error;
use serde::{Deserialize, Deserializer};

/// Earliest storable year.
pub const MIN_YEAR: i32 = 1;

/// Latest storable year.
pub const MAX_YEAR: i32 = 9999;

/// Returns true if `date` has a four-digit year.
pub fn is_storable(date: NaiveDate) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&date.year())
}

fn check(date: NaiveDate) -> Result<NaiveDate, String> {
    if is_storable(date) {
        Ok(date)
    } else {
        Err(format!(
            "date {} is outside years {:04}..={}",
            date, MIN_YEAR, MAX_YEAR
        ))
    }
}

/// Deserializes a required date with a four-digit year.
pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let date = NaiveDate::deserialize(deserializer)?;
    check(date).map_err(D::Error::custom)
}

/// Deserializes an optional date with a four-digit year.
pub(crate) fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NaiveDate>::deserialize(deserializer)?
        .map(check)
        .transpose()
        .map_err(D::Error::custom)
}
