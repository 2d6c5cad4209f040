//! aircon-state: case log persistence for the aircon decision engine
//!
//! This crate owns the append-only log of past decisions ("cases") that the
//! case memory consults before recomputing a recommendation.
//!
//! ## Key Components
//!
//! - `CaseStore`: async, backend-agnostic load/append/query interface
//! - `CaseEntry`: one immutable (key, output) pair in the log
//! - `JsonlCaseStore`: JSON-lines file on local disk
//! - `SurrealCaseStore`: SurrealDB table, local or remote, matching server-side
//! - `fakes`: in-memory and failing stores for tests

mod error;
pub mod fakes;
pub mod file_store;
mod migrations;
pub mod records;
pub mod storage_traits;
pub mod surreal_store;

pub use error::{RecordError, StateError, StorageError};
pub use file_store::JsonlCaseStore;
pub use records::{
    find_similar, CaseEntry, CaseKey, FanSpeed, FlapDirection, Mode, Movement, OutputRecord,
    SimilarityTolerance, TimeOfDay,
};
pub use storage_traits::{CaseStore, StorageResult};
pub use surreal_store::{CloudConfig, SurrealCaseStore};

/// Result type for opening and preparing store backends
pub type Result<T> = std::result::Result<T, StateError>;
