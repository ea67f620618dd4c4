//! Serde helpers for loosely typed API payloads.
//!
//! Responsibilities:
//! - Accept identifiers that arrive as JSON numbers on some endpoints and as
//!   strings on others.
//! - Treat a JSON `null` collection as empty.
//!
//! Explicitly does NOT handle:
//! - Validating identifier formats beyond "is a string or an integer".
//!
//! Invariants / assumptions:
//! - Environment ids are integers; Docker object ids are opaque strings.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    U64(u64),
    I64(i64),
}

pub fn string_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::U64(v) => v.to_string(),
        StringOrNumber::I64(v) => v.to_string(),
    })
}

pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
