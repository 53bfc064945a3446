//! Ad change event ingestion handler.
//!
//! Records campaign changes (enable/disable, bid moves, keyword edits)
//! reported by automation and UI actors.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sluice_core::{ChangeAction, ChangeEventId, NewChangeEvent, SluiceError};
use tracing::{error, info, instrument, warn};

use crate::{handlers::error_response, AppState};

/// Request body for ad change event ingestion.
#[derive(Debug, Deserialize)]
pub struct ChangeEventRequest {
    /// Optional shop scope.
    #[serde(default)]
    pub shop_id: Option<String>,
    /// Campaign the change applies to.
    pub campaign_id: String,
    /// Wire representation of the action; validated against the closed set.
    pub action: String,
    /// Originator label, e.g. `"n8n"`, `"ui"`, `"system"`.
    pub actor: String,
    /// When the change happened, in Unix milliseconds; omitted means "now".
    #[serde(default)]
    pub occurred_at_ms: Option<i64>,
    /// Free-form metadata about the change.
    #[serde(default = "empty_object")]
    pub meta: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Response from successful change event ingestion.
#[derive(Debug, Serialize)]
pub struct ChangeEventResponse {
    /// Database id of the stored event.
    pub id: ChangeEventId,
    /// Occurrence time that was stored, in Unix milliseconds.
    pub occurred_at_ms: i64,
}

/// Records an ad campaign change event.
///
/// The `action` must be one of `enable`, `disable`, `bid_set`, `kw_add`,
/// `kw_remove`; anything else is rejected before touching the database.
///
/// # Errors
///
/// Returns appropriate HTTP status codes:
/// - 400: Unknown action, or empty `campaign_id`/`actor`
/// - 500: Database or internal errors
#[instrument(
    name = "ads_change_event",
    skip(state, req),
    fields(campaign_id = %req.campaign_id, action = %req.action, actor = %req.actor)
)]
pub async fn ads_change_event(
    State(state): State<AppState>,
    Json(req): Json<ChangeEventRequest>,
) -> Response {
    if req.campaign_id.trim().is_empty() {
        warn!("Rejected change event with empty campaign_id");
        return error_response(
            StatusCode::BAD_REQUEST,
            &SluiceError::InvalidInput { reason: "campaign_id must not be empty".to_string() },
        );
    }

    if req.actor.trim().is_empty() {
        warn!("Rejected change event with empty actor");
        return error_response(
            StatusCode::BAD_REQUEST,
            &SluiceError::InvalidInput { reason: "actor must not be empty".to_string() },
        );
    }

    let Some(action) = ChangeAction::parse(&req.action) else {
        warn!(action = %req.action, "Rejected change event with unknown action");
        return error_response(
            StatusCode::BAD_REQUEST,
            &SluiceError::InvalidAction { action: req.action },
        );
    };

    let occurred_at_ms = req.occurred_at_ms.unwrap_or_else(|| state.clock.unix_millis());

    let event = NewChangeEvent {
        shop_id: req.shop_id,
        campaign_id: req.campaign_id,
        action,
        actor: req.actor,
        occurred_at_ms,
        meta: req.meta,
    };

    match state.storage.change_events.create(&event).await {
        Ok(id) => {
            info!(
                event_id = %id,
                campaign_id = %event.campaign_id,
                action = %event.action,
                "Change event recorded"
            );
            (StatusCode::OK, Json(ChangeEventResponse { id, occurred_at_ms })).into_response()
        },
        Err(e) => {
            error!(error = %e, "Failed to persist change event");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &SluiceError::Other(anyhow::anyhow!("failed to persist change event: {e}")),
            )
        },
    }
}
