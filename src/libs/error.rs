//! Error type shared by the geofence library layer.
//!
//! Commands wrap these in `anyhow::Error`; the monitor itself never
//! propagates them and only logs them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeofenceError {
    #[error("location unavailable: {0}")]
    Location(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("notification error: {0}")]
    Notification(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type GeofenceResult<T> = Result<T, GeofenceError>;
