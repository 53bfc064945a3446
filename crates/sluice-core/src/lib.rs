//! Core domain models for the sluice ingestion service.
//!
//! Provides strongly-typed domain primitives, the error taxonomy, the
//! storage layer, and the clock abstraction. All other crates depend on
//! these foundational types for type safety and consistency.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod storage;
pub mod time;

pub use error::{CoreError, Result, SluiceError};
pub use models::{
    AdChangeEvent, ChangeAction, ChangeEventId, NewChangeEvent, NewRawRecord, RawRecord, RecordId,
};
pub use storage::Storage;
pub use time::{Clock, RealClock, TestClock};
