//! Repository for raw ingestion record operations.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    error::Result,
    models::{NewRawRecord, RawRecord, RecordId},
};

/// Repository for `raw_ingest` table operations.
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

    /// Inserts a raw record and returns its database-assigned id.
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails.
    pub async fn create(&self, record: &NewRawRecord) -> Result<RecordId> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO raw_ingest (
                source, kind, shop_id, occurred_at_ms, received_at_ms, payload
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&record.source)
        .bind(&record.kind)
        .bind(&record.shop_id)
        .bind(record.occurred_at_ms)
        .bind(record.received_at_ms)
        .bind(sqlx::types::Json(&record.payload))
        .fetch_one(&*self.pool)
        .await?;

        Ok(RecordId(id))
    }

    /// Fetches a single record by id.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn find_by_id(&self, id: RecordId) -> Result<Option<RawRecord>> {
        let record = sqlx::query_as::<_, RawRecord>(
            r#"
            SELECT id, source, kind, shop_id, occurred_at_ms, received_at_ms, payload
            FROM raw_ingest
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(record)
    }

    /// Lists records of one kind from one source, oldest first.
    ///
    /// `since_ms` filters on the sender timestamp; the query rides the
    /// `(source, kind, occurred_at_ms)` index.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn list_by_kind(
        &self,
        source: &str,
        kind: &str,
        since_ms: i64,
        limit: i64,
    ) -> Result<Vec<RawRecord>> {
        let records = sqlx::query_as::<_, RawRecord>(
            r#"
            SELECT id, source, kind, shop_id, occurred_at_ms, received_at_ms, payload
            FROM raw_ingest
            WHERE source = $1 AND kind = $2 AND occurred_at_ms >= $3
            ORDER BY occurred_at_ms ASC
            LIMIT $4
            "#,
        )
        .bind(source)
        .bind(kind)
        .bind(since_ms)
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;

        Ok(records)
    }
}
