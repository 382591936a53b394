//! Loose wire values
//!
//! The API's JSON mapper writes unset fields as explicit `null`s rather than leaving them out,
//! so `#[serde(default)]` alone is not enough for fields the server may never have filled.

use serde::{Deserialize, Deserializer};

/// Deserialize a value, reading `null` as the type's default.
///
/// Pair it with `#[serde(default)]` (or a `default = "..."` function) so that a missing field
/// is accepted too.
///
/// # Errors
///
/// Returns the deserializer's error if a present value has the wrong shape.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
