//! Sluice HTTP API.
//!
//! Axum router, request handlers, and service configuration for the
//! ingestion endpoints.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use sluice_core::{Clock, Storage};

pub mod config;
pub mod handlers;
pub mod server;

pub use config::Config;
pub use server::{create_router, start_server};

/// Shared application state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Database access layer.
    pub storage: Storage,
    /// Clock used to stamp accepted payloads.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Creates application state from its parts.
    pub fn new(storage: Storage, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }
}
