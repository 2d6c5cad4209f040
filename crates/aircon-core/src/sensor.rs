//! Sources of room conditions.
//!
//! The engine treats temperature and humidity as plain inputs. A
//! [`ConditionSource`] decides where they come from: a fixed reading, a
//! seeded simulation, or a real sensor behind the same trait.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::engine::round_to;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    /// °C
    pub room_temp: f64,
    /// %
    pub humidity: f64,
}

pub trait ConditionSource {
    fn read(&mut self) -> Conditions;
}

/// Always returns the same reading.
#[derive(Debug, Clone, Copy)]
pub struct FixedConditions(pub Conditions);

impl ConditionSource for FixedConditions {
    fn read(&mut self) -> Conditions {
        self.0
    }
}

pub const SIMULATED_TEMP_RANGE: RangeInclusive<f64> = 22.0..=45.0;
pub const SIMULATED_HUMIDITY_RANGE: RangeInclusive<f64> = 30.0..=70.0;

/// Uniform samples over [`SIMULATED_TEMP_RANGE`] and
/// [`SIMULATED_HUMIDITY_RANGE`], rounded to one decimal.
#[derive(Debug, Clone)]
pub struct SimulatedConditions {
    rng: StdRng,
}

impl SimulatedConditions {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SimulatedConditions {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionSource for SimulatedConditions {
    fn read(&mut self) -> Conditions {
        Conditions {
            room_temp: round_to(self.rng.gen_range(SIMULATED_TEMP_RANGE), 1),
            humidity: round_to(self.rng.gen_range(SIMULATED_HUMIDITY_RANGE), 1),
        }
    }
}
