//! Stateless HTTP request builder and response parser for the habit API.
//!
//! # Design
//! `HabitClient` holds only a `base_url` and carries no mutable state between
//! calls. Each intent is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Any 2xx status is accepted; the backend answers 201 for create and 200
//! elsewhere, and callers never consume the mutation bodies.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateHabit, Habit, HabitRecord, HabitStats};

/// Synchronous, stateless client for the habit API.
#[derive(Debug, Clone)]
pub struct HabitClient {
    base_url: String,
}

impl HabitClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_habits(&self) -> HttpRequest {
        self.bodiless(HttpMethod::Get, "/habits".to_string())
    }

    pub fn build_create_habit(&self, input: &CreateHabit) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/habits", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_delete_habit(&self, id: i64) -> HttpRequest {
        self.bodiless(HttpMethod::Delete, format!("/habits/{id}"))
    }

    pub fn build_complete_habit(&self, id: i64) -> HttpRequest {
        self.bodiless(HttpMethod::Post, format!("/habits/{id}/complete"))
    }

    pub fn build_get_stats(&self, id: i64) -> HttpRequest {
        self.bodiless(HttpMethod::Get, format!("/habits/{id}/stats"))
    }

    pub fn build_get_records(&self, id: i64) -> HttpRequest {
        self.bodiless(HttpMethod::Get, format!("/habits/{id}/records"))
    }

    pub fn parse_list_habits(&self, response: HttpResponse) -> Result<Vec<Habit>, ApiError> {
        check_status(&response)?;
        decode(&response)
    }

    pub fn parse_create_habit(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_delete_habit(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_complete_habit(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_get_stats(&self, response: HttpResponse) -> Result<HabitStats, ApiError> {
        check_status(&response)?;
        decode(&response)
    }

    pub fn parse_get_records(&self, response: HttpResponse) -> Result<Vec<HabitRecord>, ApiError> {
        check_status(&response)?;
        decode(&response)
    }

    fn bodiless(&self, method: HttpMethod, suffix: String) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{suffix}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}
