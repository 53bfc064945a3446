//! Fixture builders for the ingestion tables.
//!
//! Builders produce valid default rows so tests only spell out the fields
//! they care about.

use anyhow::Result;
use serde_json::json;
use sluice_core::{
    ChangeAction, ChangeEventId, NewChangeEvent, NewRawRecord, RecordId, Storage,
};

/// Builder for raw ingestion records.
pub struct RawRecordFixture {
    record: NewRawRecord,
}

impl RawRecordFixture {
    /// Creates a builder with sensible defaults.
    pub fn new() -> Self {
        Self {
            record: NewRawRecord {
                source: "wb".to_string(),
                kind: "ads_stats".to_string(),
                shop_id: Some("shop_1".to_string()),
                occurred_at_ms: 1_722_950_000_000,
                received_at_ms: 1_722_950_000_500,
                payload: json!({"views": 100, "clicks": 7}),
            },
        }
    }

    /// Overrides the source system.
    pub fn source(mut self, source: &str) -> Self {
        self.record.source = source.to_string();
        self
    }

    /// Overrides the payload kind.
    pub fn kind(mut self, kind: &str) -> Self {
        self.record.kind = kind.to_string();
        self
    }

    /// Overrides the shop scope.
    pub fn shop_id(mut self, shop_id: Option<&str>) -> Self {
        self.record.shop_id = shop_id.map(str::to_string);
        self
    }

    /// Overrides the sender timestamp.
    pub fn occurred_at_ms(mut self, ts: i64) -> Self {
        self.record.occurred_at_ms = ts;
        self
    }

    /// Overrides the receive timestamp.
    pub fn received_at_ms(mut self, ts: i64) -> Self {
        self.record.received_at_ms = ts;
        self
    }

    /// Overrides the payload.
    pub fn payload(mut self, payload: serde_json::Value) -> Self {
        self.record.payload = payload;
        self
    }

    /// Returns the built record without persisting it.
    pub fn build(self) -> NewRawRecord {
        self.record
    }

    /// Persists the record and returns its id.
    pub async fn insert(self, storage: &Storage) -> Result<RecordId> {
        Ok(storage.raw_records.create(&self.record).await?)
    }
}

impl Default for RawRecordFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for ad change events.
pub struct ChangeEventFixture {
    event: NewChangeEvent,
}

impl ChangeEventFixture {
    /// Creates a builder with sensible defaults.
    pub fn new() -> Self {
        Self {
            event: NewChangeEvent {
                shop_id: Some("shop_1".to_string()),
                campaign_id: "123456".to_string(),
                action: ChangeAction::Enable,
                actor: "n8n".to_string(),
                occurred_at_ms: 1_722_950_000_000,
                meta: json!({}),
            },
        }
    }

    /// Overrides the campaign.
    pub fn campaign_id(mut self, campaign_id: &str) -> Self {
        self.event.campaign_id = campaign_id.to_string();
        self
    }

    /// Overrides the action.
    pub fn action(mut self, action: ChangeAction) -> Self {
        self.event.action = action;
        self
    }

    /// Overrides the actor label.
    pub fn actor(mut self, actor: &str) -> Self {
        self.event.actor = actor.to_string();
        self
    }

    /// Overrides the occurrence timestamp.
    pub fn occurred_at_ms(mut self, ts: i64) -> Self {
        self.event.occurred_at_ms = ts;
        self
    }

    /// Overrides the metadata.
    pub fn meta(mut self, meta: serde_json::Value) -> Self {
        self.event.meta = meta;
        self
    }

    /// Returns the built event without persisting it.
    pub fn build(self) -> NewChangeEvent {
        self.event
    }

    /// Persists the event and returns its id.
    pub async fn insert(self, storage: &Storage) -> Result<ChangeEventId> {
        Ok(storage.change_events.create(&self.event).await?)
    }
}

impl Default for ChangeEventFixture {
    fn default() -> Self {
        Self::new()
    }
}
