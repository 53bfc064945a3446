//! Raw telemetry ingestion handler.
//!
//! Accepts raw marketplace payloads, validates the envelope, stamps receive
//! time, and persists to the `raw_ingest` table.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sluice_core::{NewRawRecord, RecordId, SluiceError};
use tracing::{error, info, instrument, warn};

use crate::{handlers::error_response, AppState};

/// Maximum accepted request body size.
pub const MAX_PAYLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Request body for raw ingestion.
#[derive(Debug, Deserialize)]
pub struct RawIngestRequest {
    /// Originating system, e.g. `"wb"`.
    pub source: String,
    /// Payload category, e.g. `"ads_stats"`.
    pub kind: String,
    /// Optional shop scope.
    #[serde(default)]
    pub shop_id: Option<String>,
    /// Sender timestamp in Unix milliseconds; omitted means "now".
    #[serde(default)]
    pub occurred_at_ms: Option<i64>,
    /// Arbitrary JSON payload; must be an object.
    pub payload: serde_json::Value,
}

/// Response from successful raw ingestion.
#[derive(Debug, Serialize)]
pub struct RawIngestResponse {
    /// Database id of the stored record.
    pub id: RecordId,
    /// Server receive time in Unix milliseconds.
    pub received_at_ms: i64,
}

/// Ingests a raw telemetry payload.
///
/// Validates the envelope, assigns `received_at_ms` from the server clock,
/// defaults `occurred_at_ms` to it when the sender omitted one, and
/// persists the record.
///
/// # Errors
///
/// Returns appropriate HTTP status codes:
/// - 400: Malformed JSON, empty `source`/`kind`, or non-object payload
/// - 413: Request body larger than 10MB
/// - 500: Database or internal errors
#[instrument(name = "ingest_raw", skip(state, body), fields(body_len = body.len()))]
pub async fn ingest_raw(State(state): State<AppState>, body: Bytes) -> Response {
    if body.len() > MAX_PAYLOAD_SIZE {
        warn!(payload_size = body.len(), limit = MAX_PAYLOAD_SIZE, "Payload exceeds size limit");
        return error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            &SluiceError::PayloadTooLarge { size_bytes: body.len() },
        );
    }

    let req: RawIngestRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            warn!(error = %e, "Rejected malformed ingestion body");
            return error_response(
                StatusCode::BAD_REQUEST,
                &SluiceError::InvalidInput { reason: format!("invalid JSON body: {e}") },
            );
        },
    };

    if let Err(e) = validate(&req) {
        warn!(error = %e, "Rejected invalid ingestion request");
        return error_response(StatusCode::BAD_REQUEST, &e);
    }

    let received_at_ms = state.clock.unix_millis();
    let occurred_at_ms = req.occurred_at_ms.unwrap_or(received_at_ms);

    let record = NewRawRecord {
        source: req.source,
        kind: req.kind,
        shop_id: req.shop_id,
        occurred_at_ms,
        received_at_ms,
        payload: req.payload,
    };

    match state.storage.raw_records.create(&record).await {
        Ok(id) => {
            info!(
                record_id = %id,
                source = %record.source,
                kind = %record.kind,
                "Raw payload ingested"
            );
            (StatusCode::OK, Json(RawIngestResponse { id, received_at_ms })).into_response()
        },
        Err(e) => {
            error!(error = %e, "Failed to persist raw record");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &SluiceError::Other(anyhow::anyhow!("failed to persist raw record: {e}")),
            )
        },
    }
}

/// Validates the ingestion envelope.
fn validate(req: &RawIngestRequest) -> Result<(), SluiceError> {
    if req.source.trim().is_empty() {
        return Err(SluiceError::InvalidInput { reason: "source must not be empty".to_string() });
    }

    if req.kind.trim().is_empty() {
        return Err(SluiceError::InvalidInput { reason: "kind must not be empty".to_string() });
    }

    if !req.payload.is_object() {
        return Err(SluiceError::InvalidInput {
            reason: "payload must be a JSON object".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn valid_request() -> RawIngestRequest {
        RawIngestRequest {
            source: "wb".to_string(),
            kind: "ads_stats".to_string(),
            shop_id: Some("shop_1".to_string()),
            occurred_at_ms: None,
            payload: json!({"views": 100, "clicks": 7}),
        }
    }

    #[test]
    fn valid_request_passes_validation() {
        assert!(validate(&valid_request()).is_ok());
    }

    #[test]
    fn empty_source_is_rejected() {
        let mut req = valid_request();
        req.source = "  ".to_string();

        let err = validate(&req).unwrap_err();
        assert_eq!(err.code(), "E1003");
    }

    #[test]
    fn empty_kind_is_rejected() {
        let mut req = valid_request();
        req.kind = String::new();

        assert!(validate(&req).is_err());
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let mut req = valid_request();
        req.payload = json!([1, 2, 3]);

        let err = validate(&req).unwrap_err();
        assert_eq!(err.code(), "E1003");
    }

    #[test]
    fn request_deserializes_with_optional_fields_absent() {
        let req: RawIngestRequest = serde_json::from_value(json!({
            "source": "wb",
            "kind": "sales_funnel",
            "payload": {}
        }))
        .unwrap();

        assert_eq!(req.shop_id, None);
        assert_eq!(req.occurred_at_ms, None);
    }
}
