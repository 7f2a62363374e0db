//! Synchronous API client and view controller for the habit service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller supplies a
//! `Transport` that performs the HTTP round-trip, which keeps the core
//! deterministic and testable.
//!
//! # Design
//! - `HabitClient` is stateless: it holds only `base_url`.
//! - Each intent is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - `HabitController` owns the view state and runs the refresh protocol:
//!   list, then one stats fetch per habit, strictly in sequence.
//! - Every refresh carries a generation token; writes from a superseded
//!   refresh are dropped.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod timestamp;
pub mod types;
pub mod view;

pub use client::HabitClient;
pub use config::Config;
pub use controller::{HabitController, HabitForm, Intent, Prompt, RefreshToken, Transport, ViewState};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateHabit, Frequency, Habit, HabitRecord, HabitStats};
pub use view::{HabitCard, View};
