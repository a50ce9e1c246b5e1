//! Lenient timestamp parsing. Accepts RFC 3339 and naive date times, the latter taken as UTC.

use chrono::{DateTime, NaiveDateTime, ParseError, Utc};
use serde::{de, Deserialize, Deserializer};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub fn parse(value: &str) -> Result<DateTime<Utc>, ParseError> {
    let value = value.trim();
    match DateTime::parse_from_rfc3339(value) {
        Ok(time) => Ok(time.with_timezone(&Utc)),
        Err(e) => NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .map(|naive| naive.and_utc())
            .ok_or(e),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse(&value).map_err(|e| de::Error::custom(format!("invalid timestamp `{value}`: {e}")))
}

pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) => parse(&value)
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid timestamp `{value}`: {e}"))),
        None => Ok(None),
    }
}
