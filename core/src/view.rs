//! Presentation derived from `ViewState`.
//!
//! Cards fall back to zero streak and `0%` completion when a habit has no
//! stats entry, which happens when its stats fetch failed or never ran.

use std::fmt;

use crate::controller::ViewState;
use crate::types::{Habit, HabitStats};

pub const LOADING_TEXT: &str = "Loading...";
pub const EMPTY_TEXT: &str = "No habits yet. Add one to get started!";

/// What the screen should show for the current state.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Loading,
    Empty,
    Habits(Vec<HabitCard>),
}

/// One rendered habit row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitCard {
    pub habit_id: i64,
    pub name: String,
    pub frequency: &'static str,
    pub streak: String,
    pub completion: String,
}

impl HabitCard {
    pub fn new(habit: &Habit, stats: Option<&HabitStats>) -> Self {
        Self {
            habit_id: habit.habit_id,
            name: habit.name.clone(),
            frequency: habit.frequency.label(),
            streak: streak_text(stats),
            completion: completion_text(stats),
        }
    }
}

pub fn streak_text(stats: Option<&HabitStats>) -> String {
    format!("{} days", stats.map_or(0, |s| s.streak))
}

pub fn completion_text(stats: Option<&HabitStats>) -> String {
    match stats {
        Some(s) => format!("{:.1}%", s.completion_rate),
        None => "0%".to_string(),
    }
}

pub fn render(state: &ViewState) -> View {
    if state.loading {
        return View::Loading;
    }
    if state.habits.is_empty() {
        return View::Empty;
    }
    View::Habits(
        state
            .habits
            .iter()
            .map(|habit| HabitCard::new(habit, state.stats.get(&habit.habit_id)))
            .collect(),
    )
}

impl fmt::Display for HabitCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {}  Frequency: {} | Streak: {} | Completion: {}",
            self.habit_id, self.name, self.frequency, self.streak, self.completion
        )
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Loading => f.write_str(LOADING_TEXT),
            View::Empty => f.write_str(EMPTY_TEXT),
            View::Habits(cards) => {
                for (i, card) in cards.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{card}")?;
                }
                Ok(())
            }
        }
    }
}
