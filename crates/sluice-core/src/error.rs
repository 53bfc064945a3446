//! Error types and result handling for ingestion operations.
//!
//! Defines a structured error taxonomy with stable codes for client
//! disambiguation and HTTP status mapping. Covers validation failures and
//! infrastructure failures across the ingestion path.

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for storage-level operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Entity not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Constraint violation.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("requested entity not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::ConstraintViolation(format!("unique constraint violation: {}", db_err))
            },
            sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
                Self::ConstraintViolation(format!("check constraint violation: {}", db_err))
            },
            _ => Self::Database(err.to_string()),
        }
    }
}

/// Service-level error with stable client-facing codes.
#[derive(Debug, Error)]
pub enum SluiceError {
    /// Change event action outside the closed set (E1001).
    #[error("[E1001] Invalid action: {action:?} is not a known change action")]
    InvalidAction {
        /// The rejected action value as sent by the client.
        action: String,
    },

    /// Request body exceeds the 10MB ingestion limit (E1002).
    #[error("[E1002] Payload too large: size {size_bytes} bytes exceeds 10MB limit")]
    PayloadTooLarge {
        /// Size of the request body in bytes.
        size_bytes: usize,
    },

    /// Request failed field validation (E1003).
    #[error("[E1003] Invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the request.
        reason: String,
    },

    /// PostgreSQL connection failed (E3001).
    #[error("[E3001] Database unavailable: PostgreSQL connection failed")]
    DatabaseUnavailable,

    /// Generic database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Generic error for wrapping other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SluiceError {
    /// Returns the stable error code for the client-facing error body.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidAction { .. } => "E1001",
            Self::PayloadTooLarge { .. } => "E1002",
            Self::InvalidInput { .. } => "E1003",
            Self::DatabaseUnavailable => "E3001",
            Self::Database(_) | Self::Other(_) => "E9999",
        }
    }

    /// Returns whether the client caused this error.
    ///
    /// Client errors map to 4xx statuses and must not be retried verbatim.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAction { .. } | Self::PayloadTooLarge { .. } | Self::InvalidInput { .. }
        )
    }
}
