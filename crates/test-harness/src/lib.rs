//! Test harness for sluice integration tests.
//!
//! Provides isolated per-test Postgres databases, a deterministic clock,
//! and fixture builders for the ingestion tables.

pub mod database;
pub mod fixtures;

use anyhow::Result;
use sluice_core::{Storage, TestClock};
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

pub use database::setup_test_database;

/// Test environment with database and clock infrastructure.
pub struct TestEnv {
    pool: PgPool,
    /// Deterministic clock to inject into the code under test.
    pub clock: TestClock,
}

impl TestEnv {
    /// Creates a new test environment backed by a fresh database.
    ///
    /// Check [`TestEnv::configured`] first; connecting fails when no test
    /// database server is reachable.
    pub async fn new() -> Result<Self> {
        // Initialize tracing for tests; repeated init attempts are fine.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("warn,sluice=debug")),
            )
            .with_test_writer()
            .try_init();

        let pool = database::setup_test_database().await?;
        let clock = TestClock::new();

        Ok(Self { pool, clock })
    }

    /// Returns whether a test database server is configured.
    ///
    /// Database-backed tests should return early with a notice when this is
    /// false, keeping the suite green on machines without Postgres.
    pub fn configured() -> bool {
        database::test_db_configured()
    }

    /// Returns the connection pool for the test database.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Builds a storage layer over the test database.
    pub fn storage(&self) -> Storage {
        Storage::new(self.pool.clone())
    }

    /// Advances test time by the specified duration.
    pub fn advance_time(&self, duration: std::time::Duration) {
        self.clock.advance(duration);
    }
}
