//! Schema bootstrap for the ingestion tables.
//!
//! Creates tables and indexes idempotently at startup. The binary runs this
//! before serving; the test harness runs it against throwaway databases.

use sqlx::PgPool;

use crate::error::Result;

/// Ensures the ingestion tables and their indexes exist.
///
/// Safe to run repeatedly; every statement is `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns `CoreError::Database` when any DDL statement fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS raw_ingest (
            id BIGSERIAL PRIMARY KEY,
            source TEXT NOT NULL,
            kind TEXT NOT NULL,
            shop_id TEXT,
            occurred_at_ms BIGINT NOT NULL,
            received_at_ms BIGINT NOT NULL,
            payload JSONB NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ad_change_events (
            id BIGSERIAL PRIMARY KEY,
            shop_id TEXT,
            campaign_id TEXT NOT NULL,
            action TEXT NOT NULL,
            actor TEXT NOT NULL,
            occurred_at_ms BIGINT NOT NULL,
            meta JSONB NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Composite indexes backing the downstream read paths.
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_raw_ingest_source_kind_time
        ON raw_ingest (source, kind, occurred_at_ms)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_ad_change_campaign_time
        ON ad_change_events (campaign_id, occurred_at_ms)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_raw_ingest_shop ON raw_ingest (shop_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_raw_ingest_received ON raw_ingest (received_at_ms)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_ad_change_shop ON ad_change_events (shop_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_ad_change_action ON ad_change_events (action)")
        .execute(pool)
        .await?;

    Ok(())
}
