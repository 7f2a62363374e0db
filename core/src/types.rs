//! Domain DTOs for the habit API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently
//! so the FFI surface never couples to Axum internals. Integration tests
//! catch any schema drift between the two crates.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How often a habit is meant to be performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
}

impl Frequency {
    /// Human-facing label shown on habit cards.
    pub fn label(self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            other => Err(format!("unknown frequency: {other}")),
        }
    }
}

/// A tracked habit returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Habit {
    pub habit_id: i64,
    pub name: String,
    pub frequency: Frequency,
    #[serde(with = "crate::timestamp")]
    pub creation_date: NaiveDateTime,
}

/// Server-derived statistics for one habit. Recomputed on every fetch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HabitStats {
    pub streak: u32,
    pub completion_rate: f64,
    pub total_completions: u32,
}

/// A single completion event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitRecord {
    pub record_id: i64,
    pub habit_id: i64,
    #[serde(with = "crate::timestamp")]
    pub completion_time: NaiveDateTime,
}

/// Request payload for creating a new habit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateHabit {
    pub name: String,
    pub frequency: Frequency,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn habit_deserializes_from_backend_shape() {
        let json = r#"{"habit_id":7,"name":"Read","frequency":"weekly","creation_date":"2024-01-02 03:04:05"}"#;
        let habit: Habit = serde_json::from_str(json).unwrap();
        assert_eq!(habit.habit_id, 7);
        assert_eq!(habit.frequency, Frequency::Weekly);
        assert_eq!(habit.creation_date.to_string(), "2024-01-02 03:04:05");
    }

    #[test]
    fn habit_serializes_timestamp_without_t() {
        let habit = Habit {
            habit_id: 1,
            name: "Run".to_string(),
            frequency: Frequency::Daily,
            creation_date: crate::timestamp::parse("2024-01-02 03:04:05.999").unwrap(),
        };
        let json = serde_json::to_value(&habit).unwrap();
        assert_eq!(json["creation_date"], "2024-01-02 03:04:05");
        assert_eq!(json["frequency"], "daily");
    }

    #[test]
    fn unknown_frequency_is_rejected() {
        let json = r#"{"habit_id":1,"name":"x","frequency":"monthly","creation_date":"2024-01-02 03:04:05"}"#;
        assert!(serde_json::from_str::<Habit>(json).is_err());
    }

    #[test]
    fn frequency_parses_case_insensitively() {
        assert_eq!("Weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert!("hourly".parse::<Frequency>().is_err());
    }

    #[test]
    fn stats_accepts_integer_completion_rate() {
        let stats: HabitStats =
            serde_json::from_str(r#"{"streak":0,"completion_rate":0,"total_completions":0}"#).unwrap();
        assert_eq!(stats.completion_rate, 0.0);
    }
}
