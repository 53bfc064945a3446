//! Health check handler for service monitoring.
//!
//! Probes database connectivity and reports structured component status for
//! orchestration systems and load balancers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sluice_core::{Clock, Storage};
use tracing::{debug, error, instrument};

use crate::AppState;

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service health status.
    pub status: HealthStatus,
    /// Unix-millisecond timestamp of the check.
    pub ts_ms: i64,
    /// Individual component health checks.
    pub checks: HealthChecks,
    /// Service version information.
    pub version: String,
}

/// Overall health status enumeration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational.
    Healthy,
    /// Critical systems failing.
    Unhealthy,
}

/// Individual component health check results.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Database connectivity and basic query test.
    pub database: ComponentHealth,
}

/// Health status for individual components.
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    /// Component status.
    pub status: ComponentStatus,
    /// Optional error message if unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response time in milliseconds.
    pub response_time_ms: u64,
}

/// Component-level health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Component is healthy.
    Up,
    /// Component is experiencing issues.
    Down,
}

/// Health service that encapsulates the clock dependency for testable
/// health checks.
pub struct HealthService {
    clock: Arc<dyn Clock>,
}

impl HealthService {
    /// Creates a new health service with the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Performs the service health checks.
    pub async fn health_check(&self, storage: &Storage) -> HealthResponse {
        debug!("Performing health check");

        let ts_ms = self.clock.unix_millis();
        let start_time = self.clock.now();

        let database = match storage.health_check().await {
            Ok(()) => {
                debug!("Database health check passed");
                ComponentHealth { status: ComponentStatus::Up, message: None, response_time_ms: 0 }
            },
            Err(e) => {
                error!("Database health check failed: {}", e);
                ComponentHealth {
                    status: ComponentStatus::Down,
                    message: Some(format!("Database connection failed: {e}")),
                    response_time_ms: 0,
                }
            },
        };
        let db_duration = start_time.elapsed();

        let overall_status = match database.status {
            ComponentStatus::Up => HealthStatus::Healthy,
            ComponentStatus::Down => HealthStatus::Unhealthy,
        };

        HealthResponse {
            status: overall_status,
            ts_ms,
            checks: HealthChecks {
                database: ComponentHealth {
                    response_time_ms: u64::try_from(db_duration.as_millis()).unwrap_or(u64::MAX),
                    ..database
                },
            },
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Health check endpoint handler.
///
/// Called frequently by orchestration systems and load balancers, so it
/// avoids expensive operations: one `SELECT 1` round trip.
#[instrument(name = "health_check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Response {
    let health_service = HealthService::new(state.clock.clone());
    let response = health_service.health_check(&state.storage).await;

    let status_code = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    debug!(
        status = ?response.status,
        db_status = ?response.checks.database.status,
        "Health check completed"
    );

    (status_code, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes_lowercase_statuses() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            ts_ms: 1_722_950_400_123,
            checks: HealthChecks {
                database: ComponentHealth {
                    status: ComponentStatus::Up,
                    message: None,
                    response_time_ms: 3,
                },
            },
            version: "0.1.0".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["checks"]["database"]["status"], "up");
        assert_eq!(json["ts_ms"], 1_722_950_400_123_i64);
        // message is omitted entirely when absent
        assert!(json["checks"]["database"].get("message").is_none());
    }
}
