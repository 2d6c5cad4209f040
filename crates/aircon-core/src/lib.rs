//! aircon-core: air-conditioner decision engine with case memory
//!
//! A rule cascade turns room conditions and unit specifications into a
//! recommended setpoint, mode, fan speed and flap direction, then trims the
//! recommendation until its estimated daily consumption fits a budget.
//! `CaseMemory` sits in front of the cascade and replays past decisions for
//! similar conditions from an append-only [`aircon_state::CaseStore`].
//!
//! ## Layout
//!
//! - `domain`: `InputRecord`, unit enums, validation errors
//! - `engine`: the pure cascade (`compute`, `compute_with_trace`)
//! - `memory`: `CaseMemory` and its configuration
//! - `planner`: independent goal planner for comparison
//! - `sensor`: fixed and simulated condition sources
//! - `obs`, `metrics`, `telemetry`: tracing events, counters, subscriber setup

pub mod domain;
pub mod engine;
pub mod memory;
pub mod metrics;
pub mod obs;
pub mod planner;
pub mod sensor;
pub mod telemetry;

pub use domain::{
    AcType, AirconError, CompressorType, InputRecord, Position, Result, ValidationError,
};
pub use engine::{compute, compute_with_trace, DecisionTrace};
pub use memory::{CaseMemory, CaseMemoryConfig, DecisionOutcome, DecisionSource};
pub use planner::{plan, PlanInput, PlanRecord};
pub use sensor::{ConditionSource, Conditions, FixedConditions, SimulatedConditions};
pub use telemetry::init_tracing;

pub use aircon_state::{
    CaseEntry, CaseKey, CaseStore, FanSpeed, FlapDirection, Mode, Movement, OutputRecord,
    SimilarityTolerance, TimeOfDay,
};

/// Crate version, shared by every workspace member
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
