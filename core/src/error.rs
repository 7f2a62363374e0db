//! Error types for the habit API client.
//!
//! # Design
//! `NotFound` keeps a dedicated variant even though the view controller
//! reports it exactly like any other failure; FFI callers and logs still
//! benefit from the distinction. All other non-2xx responses land in
//! `HttpError` with the raw status code and body.

use thiserror::Error;

/// Errors returned by `HabitClient` parse methods and by transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The host could not complete the HTTP round-trip (unreachable host,
    /// connection reset, unreadable body).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
