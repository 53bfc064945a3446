//! Integration tests for the ad change event endpoint.
//!
//! Tests `/ads/change_event` end to end: action validation, timestamp
//! defaulting, metadata defaults, and persistence.

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use sluice_api::{create_router, AppState};
use sluice_core::{ChangeAction, ChangeEventId};
use sluice_testing::TestEnv;
use tower::ServiceExt;

fn test_state(env: &TestEnv) -> AppState {
    AppState::new(env.storage(), Arc::new(env.clock.clone()))
}

fn post_change_event(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ads/change_event")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .expect("build request")
}

async fn response_json(response: axum::response::Response) -> Value {
    let body_bytes =
        axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("read response body");
    serde_json::from_slice(&body_bytes).expect("parse response json")
}

/// Happy path: the event is persisted with its sender timestamp and the
/// response echoes the stored occurrence time.
#[tokio::test]
async fn change_event_persists_with_sender_timestamp() {
    if !TestEnv::configured() {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return;
    }

    let env = TestEnv::new().await.expect("test env setup");
    let app = create_router(test_state(&env));

    let request = json!({
        "shop_id": "shop_1",
        "campaign_id": "123456",
        "action": "bid_set",
        "actor": "n8n",
        "occurred_at_ms": 1_722_940_000_000_i64,
        "meta": {"old_bid": 120, "new_bid": 150}
    });

    let response = app.oneshot(post_change_event(&request)).await.expect("execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["occurred_at_ms"], 1_722_940_000_000_i64);
    let id = body["id"].as_i64().expect("id should be an integer");

    let storage = env.storage();
    let event = storage
        .change_events
        .find_by_id(ChangeEventId(id))
        .await
        .expect("fetch event")
        .expect("event should exist");

    assert_eq!(event.campaign_id, "123456");
    assert_eq!(event.action, ChangeAction::BidSet);
    assert_eq!(event.actor, "n8n");
    assert_eq!(event.shop_id.as_deref(), Some("shop_1"));
    assert_eq!(event.occurred_at_ms, 1_722_940_000_000);
    assert_eq!(event.meta.0, json!({"old_bid": 120, "new_bid": 150}));
}

/// An omitted `occurred_at_ms` defaults to the server clock.
#[tokio::test]
async fn change_event_defaults_occurred_to_clock() {
    if !TestEnv::configured() {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return;
    }

    let env = TestEnv::new().await.expect("test env setup");
    env.clock.jump_to(SystemTime::UNIX_EPOCH + Duration::from_millis(1_722_950_600_000));

    let app = create_router(test_state(&env));

    let request = json!({
        "campaign_id": "123456",
        "action": "enable",
        "actor": "ui"
    });

    let response = app.oneshot(post_change_event(&request)).await.expect("execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["occurred_at_ms"], 1_722_950_600_000_i64);
}

/// Omitted `meta` is stored as an empty object, not null.
#[tokio::test]
async fn change_event_defaults_meta_to_empty_object() {
    if !TestEnv::configured() {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return;
    }

    let env = TestEnv::new().await.expect("test env setup");
    let app = create_router(test_state(&env));

    let request = json!({
        "campaign_id": "777",
        "action": "kw_add",
        "actor": "system"
    });

    let response = app.oneshot(post_change_event(&request)).await.expect("execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let id = body["id"].as_i64().unwrap();

    let storage = env.storage();
    let event =
        storage.change_events.find_by_id(ChangeEventId(id)).await.unwrap().expect("event exists");

    assert_eq!(event.meta.0, json!({}));
}

/// Unknown actions are rejected with the coded error and nothing is stored.
#[tokio::test]
async fn change_event_rejects_unknown_action() {
    if !TestEnv::configured() {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return;
    }

    let env = TestEnv::new().await.expect("test env setup");
    let app = create_router(test_state(&env));

    let request = json!({
        "campaign_id": "123456",
        "action": "pause",
        "actor": "n8n"
    });

    let response = app.oneshot(post_change_event(&request)).await.expect("execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "E1001");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ad_change_events")
        .fetch_one(env.pool())
        .await
        .expect("count events");
    assert_eq!(count, 0);
}

/// Empty campaign id is rejected with the validation error code.
#[tokio::test]
async fn change_event_rejects_empty_campaign() {
    if !TestEnv::configured() {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return;
    }

    let env = TestEnv::new().await.expect("test env setup");
    let app = create_router(test_state(&env));

    let request = json!({
        "campaign_id": "",
        "action": "disable",
        "actor": "ui"
    });

    let response = app.oneshot(post_change_event(&request)).await.expect("execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "E1003");
}

/// Actor labels outside the conventional set are accepted as-is.
#[tokio::test]
async fn change_event_accepts_unconventional_actor() {
    if !TestEnv::configured() {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return;
    }

    let env = TestEnv::new().await.expect("test env setup");
    let app = create_router(test_state(&env));

    let request = json!({
        "campaign_id": "123456",
        "action": "kw_remove",
        "actor": "zapier-import"
    });

    let response = app.oneshot(post_change_event(&request)).await.expect("execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let id = body["id"].as_i64().unwrap();

    let storage = env.storage();
    let event =
        storage.change_events.find_by_id(ChangeEventId(id)).await.unwrap().expect("event exists");
    assert_eq!(event.actor, "zapier-import");
}
