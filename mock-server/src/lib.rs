use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub mod stats;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(super::TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, super::TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Habit {
    pub habit_id: i64,
    pub name: String,
    pub frequency: Frequency,
    #[serde(with = "timestamp")]
    pub creation_date: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HabitRecord {
    pub record_id: i64,
    pub habit_id: i64,
    #[serde(with = "timestamp")]
    pub completion_time: NaiveDateTime,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct HabitStats {
    pub streak: u32,
    pub completion_rate: f64,
    pub total_completions: u32,
}

#[derive(Deserialize)]
pub struct CreateHabit {
    pub name: String,
    pub frequency: Frequency,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub habit_id: i64,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Completed {
    pub record_id: i64,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Deleted {
    pub message: String,
}

/// In-memory habit and completion storage. Ids start at 1 and are never
/// reused.
#[derive(Debug, Default)]
pub struct Store {
    habits: BTreeMap<i64, Habit>,
    records: Vec<HabitRecord>,
    last_habit_id: i64,
    last_record_id: i64,
}

impl Store {
    pub fn add_habit(&mut self, name: String, frequency: Frequency, at: NaiveDateTime) -> i64 {
        self.last_habit_id += 1;
        let habit = Habit {
            habit_id: self.last_habit_id,
            name,
            frequency,
            creation_date: at,
        };
        self.habits.insert(habit.habit_id, habit);
        self.last_habit_id
    }

    /// Append a completion. Returns `None` if the habit does not exist.
    pub fn log_completion(&mut self, habit_id: i64, at: NaiveDateTime) -> Option<i64> {
        if !self.habits.contains_key(&habit_id) {
            return None;
        }
        self.last_record_id += 1;
        self.records.push(HabitRecord {
            record_id: self.last_record_id,
            habit_id,
            completion_time: at,
        });
        Some(self.last_record_id)
    }

    /// Newest first; ties broken by the higher id.
    pub fn habits(&self) -> Vec<Habit> {
        let mut habits: Vec<Habit> = self.habits.values().cloned().collect();
        habits.sort_by(|a, b| {
            b.creation_date
                .cmp(&a.creation_date)
                .then(b.habit_id.cmp(&a.habit_id))
        });
        habits
    }

    /// Newest first. `None` if the habit does not exist.
    pub fn records(&self, habit_id: i64) -> Option<Vec<HabitRecord>> {
        if !self.habits.contains_key(&habit_id) {
            return None;
        }
        let mut records: Vec<HabitRecord> = self
            .records
            .iter()
            .filter(|r| r.habit_id == habit_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.completion_time
                .cmp(&a.completion_time)
                .then(b.record_id.cmp(&a.record_id))
        });
        Some(records)
    }

    /// Remove the habit together with its records.
    pub fn remove_habit(&mut self, habit_id: i64) -> bool {
        if self.habits.remove(&habit_id).is_none() {
            return false;
        }
        self.records.retain(|r| r.habit_id != habit_id);
        true
    }

    pub fn stats(&self, habit_id: i64, now: NaiveDateTime) -> Option<HabitStats> {
        let times: Vec<NaiveDateTime> = self
            .records(habit_id)?
            .into_iter()
            .map(|r| r.completion_time)
            .collect();
        Some(stats::summarize(&times, now))
    }
}

pub type Db = Arc<RwLock<Store>>;

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn app() -> Router {
    router(Db::default())
}

/// Router over an existing store, so tests can seed backdated data.
pub fn router(db: Db) -> Router {
    let api = Router::new()
        .route("/habits", get(list_habits).post(create_habit))
        .route("/habits/{id}", axum::routing::delete(delete_habit))
        .route("/habits/{id}/complete", post(complete_habit))
        .route("/habits/{id}/stats", get(habit_stats))
        .route("/habits/{id}/records", get(habit_records));
    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_habits(State(db): State<Db>) -> Json<Vec<Habit>> {
    Json(db.read().await.habits())
}

async fn create_habit(
    State(db): State<Db>,
    Json(input): Json<CreateHabit>,
) -> (StatusCode, Json<Created>) {
    let habit_id = db.write().await.add_habit(input.name, input.frequency, now());
    info!(habit_id, "habit created");
    (
        StatusCode::CREATED,
        Json(Created {
            habit_id,
            message: "Created successfully".to_string(),
        }),
    )
}

async fn delete_habit(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, StatusCode> {
    if !db.write().await.remove_habit(id) {
        return Err(StatusCode::NOT_FOUND);
    }
    info!(habit_id = id, "habit deleted");
    Ok(Json(Deleted {
        message: "Deleted successfully".to_string(),
    }))
}

async fn complete_habit(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Completed>, StatusCode> {
    let record_id = db
        .write()
        .await
        .log_completion(id, now())
        .ok_or(StatusCode::NOT_FOUND)?;
    debug!(habit_id = id, record_id, "completion logged");
    Ok(Json(Completed {
        record_id,
        message: "Completed".to_string(),
    }))
}

async fn habit_stats(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<HabitStats>, StatusCode> {
    db.read()
        .await
        .stats(id, now())
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn habit_records(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<HabitRecord>>, StatusCode> {
    db.read()
        .await
        .records(id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
