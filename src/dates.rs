//! Wire Dates
//!
//! The API serializes `LocalDate` and `LocalTime` values either as ISO strings
//! (`"2026-03-14"`, `"19:30:00"`) or as arrays of components (`[2026, 3, 14]`, `[19, 30]`),
//! depending on how its JSON mapper is configured. Both shapes are normalized to [`jiff`] civil
//! types here, during deserialization, so nothing downstream ever branches on the shape.

use jiff::civil::{Date, Time};
use serde::{Deserialize, Deserializer, de::Error as _};
use thiserror::Error;

/// Errors raised while normalizing a wire date or time.
#[derive(Debug, Error)]
pub enum DateError {
    /// The value has neither a recognised string form nor the right number of components.
    #[error("malformed date or time: {0}")]
    Malformed(String),

    /// The components do not describe a real calendar date or clock time.
    #[error(transparent)]
    OutOfRange(#[from] jiff::Error),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireValue {
    Text(String),
    Parts(Vec<i64>),
}

/// Parse an ISO date, ignoring any time-of-day suffix.
///
/// # Errors
///
/// Returns [`DateError`] if the text is not a valid `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Result<Date, DateError> {
    let day = raw.trim().split('T').next().unwrap_or_default();

    day.parse::<Date>().map_err(DateError::from)
}

/// Build a date from `[year, month, day]` components.
///
/// # Errors
///
/// Returns [`DateError`] if there are not exactly three components or they are out of range.
pub fn date_from_parts(parts: &[i64]) -> Result<Date, DateError> {
    let [year, month, day] = parts else {
        return Err(DateError::Malformed(format!("{parts:?}")));
    };

    Ok(Date::new(
        component(*year, parts)?,
        component(*month, parts)?,
        component(*day, parts)?,
    )?)
}

/// Parse an `HH:MM` or `HH:MM:SS` clock time.
///
/// # Errors
///
/// Returns [`DateError`] if the text is not a valid time.
pub fn parse_time(raw: &str) -> Result<Time, DateError> {
    raw.trim().parse::<Time>().map_err(DateError::from)
}

/// Build a time from `[hour, minute]`, `[hour, minute, second]` or
/// `[hour, minute, second, nanosecond]` components.
///
/// # Errors
///
/// Returns [`DateError`] on a wrong number of components or out of range values.
pub fn time_from_parts(parts: &[i64]) -> Result<Time, DateError> {
    let (hour, minute, second, subsec) = match parts {
        [hour, minute] => (*hour, *minute, 0, 0),
        [hour, minute, second] => (*hour, *minute, *second, 0),
        [hour, minute, second, subsec] => (*hour, *minute, *second, *subsec),
        _ => return Err(DateError::Malformed(format!("{parts:?}"))),
    };

    Ok(Time::new(
        component(hour, parts)?,
        component(minute, parts)?,
        component(second, parts)?,
        component(subsec, parts)?,
    )?)
}

fn component<T: TryFrom<i64>>(value: i64, parts: &[i64]) -> Result<T, DateError> {
    T::try_from(value).map_err(|_err| DateError::Malformed(format!("{parts:?}")))
}

impl WireValue {
    fn into_date(self) -> Result<Date, DateError> {
        match self {
            Self::Text(text) => parse_date(&text),
            Self::Parts(parts) => date_from_parts(&parts),
        }
    }

    fn into_time(self) -> Result<Time, DateError> {
        match self {
            Self::Text(text) => parse_time(&text),
            Self::Parts(parts) => time_from_parts(&parts),
        }
    }
}

/// Deserialize a required date in either wire shape.
///
/// # Errors
///
/// Returns the deserializer's error if the value is not a recognisable date.
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    WireValue::deserialize(deserializer)?
        .into_date()
        .map_err(D::Error::custom)
}

/// Deserialize an optional date in either wire shape; `null` becomes `None`.
///
/// # Errors
///
/// Returns the deserializer's error if a present value is not a recognisable date.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<WireValue>::deserialize(deserializer)?
        .map(WireValue::into_date)
        .transpose()
        .map_err(D::Error::custom)
}

/// Deserialize a required clock time in either wire shape.
///
/// # Errors
///
/// Returns the deserializer's error if the value is not a recognisable time.
pub fn deserialize_time<'de, D>(deserializer: D) -> Result<Time, D::Error>
where
    D: Deserializer<'de>,
{
    WireValue::deserialize(deserializer)?
        .into_time()
        .map_err(D::Error::custom)
}
