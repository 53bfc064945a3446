//! Repository for ad change event operations.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    error::Result,
    models::{AdChangeEvent, ChangeEventId, NewChangeEvent},
};

/// Repository for `ad_change_events` table operations.
pub struct Repository {
    pool: Arc<PgPool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Returns a reference to the database pool.
    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }

    /// Inserts a change event and returns its database-assigned id.
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails.
    pub async fn create(&self, event: &NewChangeEvent) -> Result<ChangeEventId> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO ad_change_events (
                shop_id, campaign_id, action, actor, occurred_at_ms, meta
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&event.shop_id)
        .bind(&event.campaign_id)
        .bind(event.action)
        .bind(&event.actor)
        .bind(event.occurred_at_ms)
        .bind(sqlx::types::Json(&event.meta))
        .fetch_one(&*self.pool)
        .await?;

        Ok(ChangeEventId(id))
    }

    /// Fetches a single change event by id.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn find_by_id(&self, id: ChangeEventId) -> Result<Option<AdChangeEvent>> {
        let event = sqlx::query_as::<_, AdChangeEvent>(
            r#"
            SELECT id, shop_id, campaign_id, action, actor, occurred_at_ms, meta
            FROM ad_change_events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(event)
    }

    /// Lists the change history of one campaign, oldest first.
    ///
    /// `since_ms` filters on the occurrence timestamp; the query rides the
    /// `(campaign_id, occurred_at_ms)` index.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn list_by_campaign(
        &self,
        campaign_id: &str,
        since_ms: i64,
        limit: i64,
    ) -> Result<Vec<AdChangeEvent>> {
        let events = sqlx::query_as::<_, AdChangeEvent>(
            r#"
            SELECT id, shop_id, campaign_id, action, actor, occurred_at_ms, meta
            FROM ad_change_events
            WHERE campaign_id = $1 AND occurred_at_ms >= $2
            ORDER BY occurred_at_ms ASC
            LIMIT $3
            "#,
        )
        .bind(campaign_id)
        .bind(since_ms)
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;

        Ok(events)
    }
}
