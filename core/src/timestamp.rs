//! Serde adapter for the backend's `YYYY-MM-DD HH:MM:SS` timestamps.
//!
//! Rows written with sub-second precision come back with a fractional
//! suffix (`2024-03-01 08:15:00.123456`); both forms parse. Serialization
//! always writes whole seconds.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer};

pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FRACTIONAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub fn parse(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, FRACTIONAL_FORMAT))
}

pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(FORMAT))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}
