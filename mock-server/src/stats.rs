//! Streak and completion-rate calculations over completion timestamps.
//!
//! Both work on calendar days regardless of the habit's frequency.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::HabitStats;

/// Trailing window, in days, for the completion rate.
pub const RATE_WINDOW_DAYS: i64 = 30;

/// Consecutive completion days ending at the most recent one. The streak is
/// broken (0) unless that day is `today` or the day before.
pub fn streak(times: &[NaiveDateTime], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = times.iter().map(|t| t.date()).collect();
    let mut newest_first = days.iter().rev();
    let Some(&latest) = newest_first.next() else {
        return 0;
    };
    if latest != today && latest != today - Duration::days(1) {
        return 0;
    }

    let mut count = 1;
    let mut previous = latest;
    for &day in newest_first {
        if previous - day != Duration::days(1) {
            break;
        }
        count += 1;
        previous = day;
    }
    count
}

/// Percentage of the last `RATE_WINDOW_DAYS` days with at least one
/// completion at or after `now - RATE_WINDOW_DAYS`.
pub fn completion_rate(times: &[NaiveDateTime], now: NaiveDateTime) -> f64 {
    let start = now - Duration::days(RATE_WINDOW_DAYS);
    let days: BTreeSet<NaiveDate> = times
        .iter()
        .filter(|t| **t >= start)
        .map(|t| t.date())
        .collect();
    days.len() as f64 / RATE_WINDOW_DAYS as f64 * 100.0
}

pub fn summarize(times: &[NaiveDateTime], now: NaiveDateTime) -> HabitStats {
    HabitStats {
        streak: streak(times, now.date()),
        completion_rate: completion_rate(times, now),
        total_completions: times.len() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn no_completions_means_no_streak() {
        assert_eq!(streak(&[], day("2024-06-10")), 0);
    }

    #[test]
    fn streak_counts_back_from_today() {
        let times = [
            at("2024-06-10 07:00:00"),
            at("2024-06-09 21:00:00"),
            at("2024-06-08 07:00:00"),
            at("2024-06-06 07:00:00"),
        ];
        assert_eq!(streak(&times, day("2024-06-10")), 3);
    }

    #[test]
    fn yesterday_keeps_streak_alive() {
        let times = [at("2024-06-09 07:00:00"), at("2024-06-08 07:00:00")];
        assert_eq!(streak(&times, day("2024-06-10")), 2);
    }

    #[test]
    fn gap_before_yesterday_breaks_streak() {
        let times = [at("2024-06-08 07:00:00"), at("2024-06-07 07:00:00")];
        assert_eq!(streak(&times, day("2024-06-10")), 0);
    }

    #[test]
    fn repeated_completions_on_one_day_count_once() {
        let times = [
            at("2024-06-10 07:00:00"),
            at("2024-06-10 08:00:00"),
            at("2024-06-10 09:00:00"),
        ];
        assert_eq!(streak(&times, day("2024-06-10")), 1);
        let rate = completion_rate(&times, at("2024-06-10 12:00:00"));
        assert!((rate - 100.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn rate_ignores_completions_outside_window() {
        let now = at("2024-06-30 12:00:00");
        let times = [
            at("2024-06-30 08:00:00"),
            at("2024-06-15 08:00:00"),
            at("2024-05-31 12:00:00"),
            at("2024-05-31 11:59:59"),
        ];
        let rate = completion_rate(&times, now);
        assert!((rate - 10.0).abs() < 1e-9);
    }

    #[test]
    fn summarize_counts_every_record() {
        let times = [at("2024-06-10 07:00:00"), at("2024-06-10 08:00:00")];
        let stats = summarize(&times, at("2024-06-10 12:00:00"));
        assert_eq!(stats.total_completions, 2);
        assert_eq!(stats.streak, 1);
    }
}
