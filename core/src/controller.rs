//! View controller: owns the habit screen state and drives the API client.
//!
//! # Design
//! `HabitController` is an explicit state container. The host supplies a
//! `Transport` that performs each HTTP round-trip and a `Prompt` for the
//! delete confirmation and failure alerts; the controller never touches the
//! network or the terminal itself.
//!
//! The refresh protocol fetches the habit list and then each habit's stats
//! one at a time, in list order. A failure at any step aborts the rest,
//! raises a single alert, and clears the loading flag. Stats gathered before
//! the failure stay in the map.
//!
//! Every refresh is stamped with a `RefreshToken`. Only the most recently
//! issued token may write state, so a slow refresh that finishes after a
//! newer one cannot overwrite it. `refresh` runs the steps back to back; the
//! step methods are public for hosts that interleave refreshes themselves.

use std::collections::HashMap;

use tracing::{debug, error, info, warn};

use crate::client::HabitClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{CreateHabit, Frequency, Habit, HabitStats};
use crate::view::{self, View};

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this habit?";

/// Executes one HTTP round-trip on behalf of the core.
///
/// Implementations return non-2xx responses as data; only failures to
/// complete the exchange map to `ApiError::Transport`.
pub trait Transport {
    fn execute(&mut self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking user interaction needed by the controller.
pub trait Prompt {
    /// Ask a yes/no question. `true` means the user agreed.
    fn confirm(&mut self, message: &str) -> bool;

    /// Show a failure message to the user.
    fn alert(&mut self, message: &str);
}

/// The user-level action a failed request belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Connect,
    Create,
    Complete,
    Delete,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Connect => "connect",
            Intent::Create => "create",
            Intent::Complete => "complete",
            Intent::Delete => "delete",
        }
    }

    pub fn alert_message(self) -> &'static str {
        match self {
            Intent::Connect => {
                "Unable to connect to backend service. Please ensure the backend is running."
            }
            Intent::Create => "Failed to create habit",
            Intent::Complete => "Failed to mark as complete",
            Intent::Delete => "Failed to delete habit",
        }
    }
}

/// Contents of the add-habit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitForm {
    pub name: String,
    pub frequency: Frequency,
}

/// Everything the screen is rendered from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub habits: Vec<Habit>,
    pub stats: HashMap<i64, HabitStats>,
    pub form: HabitForm,
    pub loading: bool,
}

/// Identifies one run of the refresh protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshToken {
    generation: u64,
}

impl RefreshToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

pub struct HabitController<T, P> {
    client: HabitClient,
    transport: T,
    prompt: P,
    state: ViewState,
    generation: u64,
    presented: bool,
}

impl<T: Transport, P: Prompt> HabitController<T, P> {
    pub fn new(client: HabitClient, transport: T, prompt: P) -> Self {
        Self {
            client,
            transport,
            prompt,
            state: ViewState::default(),
            generation: 0,
            presented: false,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub fn prompt_mut(&mut self) -> &mut P {
        &mut self.prompt
    }

    pub fn render(&self) -> View {
        view::render(&self.state)
    }

    /// Initial load. Only the first call refreshes.
    pub fn present(&mut self) {
        if self.presented {
            return;
        }
        self.presented = true;
        self.refresh();
    }

    pub fn set_form_name(&mut self, name: impl Into<String>) {
        self.state.form.name = name.into();
    }

    pub fn set_form_frequency(&mut self, frequency: Frequency) {
        self.state.form.frequency = frequency;
    }

    /// Run the whole refresh protocol synchronously.
    pub fn refresh(&mut self) {
        let token = self.begin_refresh();

        let request = self.client.build_list_habits();
        let habits = match self.fetch(request, HabitClient::parse_list_habits) {
            Ok(habits) => habits,
            Err(err) => {
                self.fail_refresh(token, &err);
                return;
            }
        };
        let ids: Vec<i64> = habits.iter().map(|h| h.habit_id).collect();
        if !self.apply_habits(token, habits) {
            return;
        }

        for id in ids {
            let request = self.client.build_get_stats(id);
            match self.fetch(request, HabitClient::parse_get_stats) {
                Ok(stats) => {
                    if !self.apply_stats(token, id, stats) {
                        return;
                    }
                }
                Err(err) => {
                    self.fail_refresh(token, &err);
                    return;
                }
            }
        }

        self.finish_refresh(token);
    }

    /// Start a refresh: bump the generation and raise the loading flag.
    pub fn begin_refresh(&mut self) -> RefreshToken {
        self.generation += 1;
        self.state.loading = true;
        debug!(generation = self.generation, "refresh started");
        RefreshToken {
            generation: self.generation,
        }
    }

    pub fn is_current(&self, token: RefreshToken) -> bool {
        token.generation == self.generation
    }

    /// Store a freshly listed set of habits and reset the stats map.
    ///
    /// Returns `false`, leaving state untouched, when `token` is stale.
    pub fn apply_habits(&mut self, token: RefreshToken, habits: Vec<Habit>) -> bool {
        if !self.accepts(token, "habit list") {
            return false;
        }
        debug!(count = habits.len(), "habit list received");
        self.state.habits = habits;
        self.state.stats.clear();
        true
    }

    pub fn apply_stats(&mut self, token: RefreshToken, habit_id: i64, stats: HabitStats) -> bool {
        if !self.accepts(token, "habit stats") {
            return false;
        }
        self.state.stats.insert(habit_id, stats);
        true
    }

    /// Abort the refresh identified by `token`: alert and drop the loading
    /// flag. Stale tokens are ignored.
    pub fn fail_refresh(&mut self, token: RefreshToken, err: &ApiError) -> bool {
        if !self.accepts(token, "refresh failure") {
            return false;
        }
        self.report(Intent::Connect, err);
        self.state.loading = false;
        true
    }

    pub fn finish_refresh(&mut self, token: RefreshToken) -> bool {
        if !self.accepts(token, "refresh completion") {
            return false;
        }
        self.state.loading = false;
        info!(
            habits = self.state.habits.len(),
            stats = self.state.stats.len(),
            "refresh complete"
        );
        true
    }

    /// Create a habit from the form. Blank names are ignored.
    pub fn submit_form(&mut self) {
        if self.state.form.name.trim().is_empty() {
            debug!("ignoring submit with blank habit name");
            return;
        }
        let input = CreateHabit {
            name: self.state.form.name.clone(),
            frequency: self.state.form.frequency,
        };
        let result = self
            .client
            .build_create_habit(&input)
            .and_then(|request| self.fetch(request, HabitClient::parse_create_habit));
        match result {
            Ok(()) => {
                info!(name = %input.name, frequency = %input.frequency, "habit created");
                self.state.form.name.clear();
                self.refresh();
            }
            Err(err) => self.report(Intent::Create, &err),
        }
    }

    pub fn complete(&mut self, habit_id: i64) {
        let request = self.client.build_complete_habit(habit_id);
        match self.fetch(request, HabitClient::parse_complete_habit) {
            Ok(()) => {
                info!(habit_id, "habit completed");
                self.refresh();
            }
            Err(err) => self.report(Intent::Complete, &err),
        }
    }

    /// Delete a habit after the user confirms.
    pub fn delete(&mut self, habit_id: i64) {
        if !self.prompt.confirm(DELETE_CONFIRMATION) {
            debug!(habit_id, "delete declined");
            return;
        }
        let request = self.client.build_delete_habit(habit_id);
        match self.fetch(request, HabitClient::parse_delete_habit) {
            Ok(()) => {
                info!(habit_id, "habit deleted");
                self.refresh();
            }
            Err(err) => self.report(Intent::Delete, &err),
        }
    }

    fn fetch<R>(
        &mut self,
        request: HttpRequest,
        parse: impl FnOnce(&HabitClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        debug!(method = %request.method, path = %request.path, "sending request");
        let response = self.transport.execute(request)?;
        parse(&self.client, response)
    }

    fn accepts(&self, token: RefreshToken, what: &str) -> bool {
        if self.is_current(token) {
            return true;
        }
        warn!(
            stale = token.generation,
            current = self.generation,
            "discarding {what} from superseded refresh"
        );
        false
    }

    fn report(&mut self, intent: Intent, err: &ApiError) {
        error!(intent = intent.as_str(), error = %err, "request failed");
        self.prompt.alert(intent.alert_message());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::http::HttpMethod;

    #[derive(Default)]
    struct ScriptedTransport {
        replies: VecDeque<Result<HttpResponse, ApiError>>,
        sent: Vec<HttpRequest>,
    }

    impl ScriptedTransport {
        fn reply(mut self, status: u16, body: &str) -> Self {
            self.replies.push_back(Ok(HttpResponse::new(status, body)));
            self
        }

        fn unreachable(mut self) -> Self {
            self.replies
                .push_back(Err(ApiError::Transport("connection refused".to_string())));
            self
        }

        fn paths(&self) -> Vec<String> {
            self.sent
                .iter()
                .map(|r| r.path.trim_start_matches(BASE).to_string())
                .collect()
        }
    }

    impl Transport for ScriptedTransport {
        fn execute(&mut self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.sent.push(request);
            self.replies
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Transport("no scripted reply".to_string())))
        }
    }

    struct RecordingPrompt {
        answer: bool,
        questions: Vec<String>,
        alerts: Vec<String>,
    }

    impl RecordingPrompt {
        fn answering(answer: bool) -> Self {
            Self {
                answer,
                questions: Vec::new(),
                alerts: Vec::new(),
            }
        }
    }

    impl Prompt for RecordingPrompt {
        fn confirm(&mut self, message: &str) -> bool {
            self.questions.push(message.to_string());
            self.answer
        }

        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }
    }

    const BASE: &str = "http://127.0.0.1:5000/api";

    fn controller(
        transport: ScriptedTransport,
    ) -> HabitController<ScriptedTransport, RecordingPrompt> {
        HabitController::new(HabitClient::new(BASE), transport, RecordingPrompt::answering(true))
    }

    fn habits_json(habits: &[(i64, &str)]) -> String {
        let items: Vec<String> = habits
            .iter()
            .map(|(id, freq)| {
                format!(
                    r#"{{"habit_id":{id},"name":"habit {id}","frequency":"{freq}","creation_date":"2024-05-01 09:00:00"}}"#
                )
            })
            .collect();
        format!("[{}]", items.join(","))
    }

    fn stats_json(streak: u32, rate: f64) -> String {
        format!(r#"{{"streak":{streak},"completion_rate":{rate},"total_completions":{streak}}}"#)
    }

    #[test]
    fn refresh_fetches_stats_sequentially_for_every_habit() {
        let transport = ScriptedTransport::default()
            .reply(200, &habits_json(&[(3, "daily"), (1, "weekly")]))
            .reply(200, &stats_json(2, 6.5))
            .reply(200, &stats_json(0, 0.0));
        let mut c = controller(transport);

        c.refresh();

        assert_eq!(c.transport().paths(), vec!["/habits", "/habits/3/stats", "/habits/1/stats"]);
        let mut keys: Vec<i64> = c.state().stats.keys().copied().collect();
        keys.sort();
        assert_eq!(keys, vec![1, 3]);
        assert_eq!(c.state().stats[&3].streak, 2);
        assert!(!c.state().loading);
        assert!(c.prompt().alerts.is_empty());
    }

    #[test]
    fn failing_second_stats_keeps_first_and_alerts_once() {
        let transport = ScriptedTransport::default()
            .reply(200, &habits_json(&[(1, "daily"), (2, "weekly")]))
            .reply(200, &stats_json(5, 50.0))
            .reply(500, "boom");
        let mut c = controller(transport);

        c.refresh();

        let state = c.state();
        assert_eq!(state.stats.len(), 1);
        assert!(state.stats.contains_key(&1));
        assert!(!state.loading);
        assert_eq!(c.prompt().alerts, vec![Intent::Connect.alert_message()]);

        let View::Habits(cards) = c.render() else {
            panic!("expected habit cards");
        };
        assert_eq!(cards[1].habit_id, 2);
        assert_eq!(cards[1].streak, "0 days");
        assert_eq!(cards[1].completion, "0%");
    }

    #[test]
    fn stats_failure_stops_remaining_fetches() {
        let transport = ScriptedTransport::default()
            .reply(200, &habits_json(&[(1, "daily"), (2, "daily"), (3, "daily")]))
            .reply(200, &stats_json(1, 3.3))
            .unreachable()
            .reply(200, &stats_json(9, 9.0));
        let mut c = controller(transport);

        c.refresh();

        assert_eq!(c.transport().paths(), vec!["/habits", "/habits/1/stats", "/habits/2/stats"]);
        assert!(!c.state().stats.contains_key(&2));
        assert!(!c.state().stats.contains_key(&3));
        assert!(!c.state().loading);
    }

    #[test]
    fn list_failure_keeps_previous_state() {
        let transport = ScriptedTransport::default()
            .reply(200, &habits_json(&[(1, "daily")]))
            .reply(200, &stats_json(1, 3.3))
            .unreachable();
        let mut c = controller(transport);
        c.refresh();
        let before = c.state().clone();

        c.refresh();

        assert_eq!(c.state(), &before);
        assert_eq!(c.prompt().alerts.len(), 1);
    }

    #[test]
    fn refresh_drops_stats_for_habits_no_longer_listed() {
        let transport = ScriptedTransport::default()
            .reply(200, &habits_json(&[(1, "daily"), (2, "daily")]))
            .reply(200, &stats_json(1, 1.0))
            .reply(200, &stats_json(2, 2.0))
            .reply(200, &habits_json(&[(2, "daily")]))
            .reply(200, &stats_json(3, 3.0));
        let mut c = controller(transport);

        c.refresh();
        c.refresh();

        assert_eq!(c.state().stats.len(), 1);
        assert_eq!(c.state().stats[&2].streak, 3);
    }

    #[test]
    fn empty_list_renders_empty_state() {
        let mut c = controller(ScriptedTransport::default().reply(200, "[]"));
        c.refresh();
        assert!(c.state().stats.is_empty());
        assert_eq!(c.render(), View::Empty);
    }

    #[test]
    fn present_refreshes_only_once() {
        let mut c = controller(ScriptedTransport::default().reply(200, "[]"));
        c.present();
        c.present();
        assert_eq!(c.transport().sent.len(), 1);
    }

    #[test]
    fn blank_name_submit_does_nothing() {
        let mut c = controller(ScriptedTransport::default());
        for name in ["", "   ", "\t\n"] {
            c.set_form_name(name);
            let before = c.state().clone();
            c.submit_form();
            assert_eq!(c.state(), &before);
        }
        assert!(c.transport().sent.is_empty());
        assert!(c.prompt().alerts.is_empty());
    }

    #[test]
    fn submit_creates_then_refreshes_and_clears_name() {
        let transport = ScriptedTransport::default()
            .reply(201, r#"{"habit_id":1,"message":"Created successfully"}"#)
            .reply(200, &habits_json(&[(1, "weekly")]))
            .reply(200, &stats_json(0, 0.0));
        let mut c = controller(transport);
        c.set_form_name("Stretch");
        c.set_form_frequency(Frequency::Weekly);

        c.submit_form();

        let sent = &c.transport().sent;
        assert_eq!(sent[0].method, HttpMethod::Post);
        let body: serde_json::Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"name": "Stretch", "frequency": "weekly"}));
        assert_eq!(c.transport().paths(), vec!["/habits", "/habits", "/habits/1/stats"]);
        assert!(c.state().form.name.is_empty());
        assert_eq!(c.state().form.frequency, Frequency::Weekly);
        assert_eq!(c.state().habits.len(), 1);
    }

    #[test]
    fn submit_failure_alerts_and_skips_refresh() {
        let mut c = controller(ScriptedTransport::default().reply(500, "db locked"));
        c.set_form_name("Stretch");

        c.submit_form();

        assert_eq!(c.transport().sent.len(), 1);
        assert_eq!(c.prompt().alerts, vec![Intent::Create.alert_message()]);
        assert_eq!(c.state().form.name, "Stretch");
    }

    #[test]
    fn declined_delete_sends_nothing() {
        let mut c = HabitController::new(
            HabitClient::new(BASE),
            ScriptedTransport::default(),
            RecordingPrompt::answering(false),
        );

        c.delete(1);

        assert!(c.transport().sent.is_empty());
        assert_eq!(c.prompt().questions, vec![DELETE_CONFIRMATION]);
    }

    #[test]
    fn confirmed_delete_then_refresh() {
        let transport = ScriptedTransport::default()
            .reply(200, r#"{"message":"Deleted successfully"}"#)
            .reply(200, "[]");
        let mut c = controller(transport);

        c.delete(4);

        assert_eq!(c.transport().sent[0].method, HttpMethod::Delete);
        assert_eq!(c.transport().paths(), vec!["/habits/4", "/habits"]);
        assert!(c.prompt().alerts.is_empty());
    }

    #[test]
    fn delete_failure_alerts() {
        let mut c = controller(ScriptedTransport::default().reply(404, ""));
        c.delete(4);
        assert_eq!(c.prompt().alerts, vec![Intent::Delete.alert_message()]);
        assert_eq!(c.transport().sent.len(), 1);
    }

    #[test]
    fn complete_then_refresh() {
        let transport = ScriptedTransport::default()
            .reply(200, r#"{"record_id":1,"message":"Completed"}"#)
            .reply(200, &habits_json(&[(2, "daily")]))
            .reply(200, &stats_json(1, 3.3333));
        let mut c = controller(transport);

        c.complete(2);

        assert_eq!(c.transport().paths(), vec!["/habits/2/complete", "/habits", "/habits/2/stats"]);
        assert_eq!(c.state().stats[&2].streak, 1);
    }

    #[test]
    fn complete_failure_leaves_state_alone() {
        let mut c = controller(ScriptedTransport::default().unreachable());
        let before = c.state().clone();
        c.complete(2);
        assert_eq!(c.state(), &before);
        assert_eq!(c.prompt().alerts, vec![Intent::Complete.alert_message()]);
    }

    #[test]
    fn superseded_refresh_cannot_write() {
        let mut c = controller(ScriptedTransport::default());
        let old = c.begin_refresh();
        let new = c.begin_refresh();
        assert!(!c.is_current(old));

        let habit: Habit = serde_json::from_str(
            r#"{"habit_id":1,"name":"old","frequency":"daily","creation_date":"2024-05-01 09:00:00"}"#,
        )
        .unwrap();
        assert!(!c.apply_habits(old, vec![habit.clone()]));
        assert!(!c.finish_refresh(old));
        assert!(c.state().habits.is_empty());
        assert!(c.state().loading);

        assert!(c.apply_habits(new, vec![habit]));
        let stats = HabitStats {
            streak: 1,
            completion_rate: 3.3,
            total_completions: 1,
        };
        assert!(!c.apply_stats(old, 1, stats));
        assert!(c.apply_stats(new, 1, stats));
        assert!(c.finish_refresh(new));
        assert!(!c.state().loading);
        assert_eq!(c.state().habits.len(), 1);
    }

    #[test]
    fn stale_failure_is_silent() {
        let mut c = controller(ScriptedTransport::default());
        let old = c.begin_refresh();
        let _new = c.begin_refresh();

        assert!(!c.fail_refresh(old, &ApiError::NotFound));

        assert!(c.prompt().alerts.is_empty());
        assert!(c.state().loading);
    }

    #[test]
    fn tokens_increase_monotonically() {
        let mut c = controller(ScriptedTransport::default());
        let a = c.begin_refresh();
        let b = c.begin_refresh();
        assert!(b.generation() > a.generation());
    }
}
