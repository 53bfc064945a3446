//! Database access layer implementing the repository pattern.
//!
//! The repository layer translates between domain models and the database
//! schema. All database operations go through these repositories; direct SQL
//! outside this module is forbidden to keep the schema evolvable.

use std::sync::Arc;

use sqlx::PgPool;

pub mod change_events;
pub mod raw_records;
pub mod schema;

use crate::error::Result;

/// Container for all repository instances providing unified database access.
///
/// Entry point for every database operation in sluice. Manages a shared
/// connection pool and provides type-safe access to each table.
#[derive(Clone)]
pub struct Storage {
    /// Repository for raw ingestion records.
    pub raw_records: Arc<raw_records::Repository>,

    /// Repository for ad change events.
    pub change_events: Arc<change_events::Repository>,
}

impl Storage {
    /// Creates a new storage instance with the given connection pool.
    ///
    /// All repositories share the same pool.
    pub fn new(pool: PgPool) -> Self {
        let pool = Arc::new(pool);

        Self {
            raw_records: Arc::new(raw_records::Repository::new(pool.clone())),
            change_events: Arc::new(change_events::Repository::new(pool)),
        }
    }

    /// Performs a health check on the database connection.
    ///
    /// Executes `SELECT 1` to verify connectivity. Used by the `/health`
    /// endpoint.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Database` if the connection is unhealthy or the
    /// query times out.
    pub async fn health_check(&self) -> Result<()> {
        let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&*self.raw_records.pool()).await?;

        Ok(())
    }
}
