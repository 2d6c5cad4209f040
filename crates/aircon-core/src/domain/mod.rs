//! Request types and the error taxonomy shared by the engine, planner and
//! case memory.

pub mod error;
pub mod input;

pub use error::{AirconError, Result, ValidationError};
pub use input::{AcType, CompressorType, InputRecord, Position};
