//! Case-based reuse of past decisions over an append-only store.

pub mod case_memory;

pub use case_memory::{CaseMemory, CaseMemoryConfig, DecisionOutcome, DecisionSource};
