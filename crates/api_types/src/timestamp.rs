//! Lenient timestamp fields.
//!
//! Request bodies accept RFC 3339 (`2025-06-01T12:00:00Z`) and naive local
//! timestamps (`2025-06-01T12:00:00`), which are read as UTC. Use with
//! `#[serde(deserialize_with = "timestamp::...")]`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, de::Error};

use crate::Patch;

struct Timestamp(DateTime<Utc>);

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map(Timestamp).map_err(D::Error::custom)
    }
}

fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(instant) = raw.parse::<DateTime<Utc>>() {
        return Ok(instant);
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(|err| format!("invalid timestamp '{raw}': {err}"))
}

pub fn required<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Timestamp::deserialize(deserializer).map(|ts| ts.0)
}

/// For `Option` fields; pair with `#[serde(default)]`.
pub fn optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Timestamp>::deserialize(deserializer).map(|ts| ts.map(|ts| ts.0))
}

/// For `Patch` fields; pair with `#[serde(default)]`.
pub fn patch<'de, D>(deserializer: D) -> Result<Patch<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Timestamp::deserialize(deserializer).map(|ts| Patch::Present(ts.0))
}
