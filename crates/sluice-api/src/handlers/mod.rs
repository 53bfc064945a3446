//! Request handlers for the ingestion endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sluice_core::SluiceError;

pub mod change_events;
pub mod health;
pub mod ingest;

pub use change_events::ads_change_event;
pub use health::health_check;
pub use ingest::ingest_raw;

/// Error response with code and message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details including code and message.
    pub error: ErrorDetail,
}

/// Detailed error information.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Stable error code from the service taxonomy.
    pub code: String,
    /// Human-readable error description.
    pub message: String,
}

/// Creates a standardized error response.
pub(crate) fn error_response(status: StatusCode, error: &SluiceError) -> Response {
    let error_response = ErrorResponse {
        error: ErrorDetail { code: error.code().to_string(), message: error.to_string() },
    };

    (status, Json(error_response)).into_response()
}
