//! Goal planner: a second, cache-free opinion from temperature and humidity
//! alone, for side-by-side comparison with the cascade.

use aircon_state::Mode;
use serde::{Deserialize, Serialize};

use crate::domain::InputRecord;

pub const GOAL: &str = "Keep comfort and efficiency";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanInput {
    pub room_temp: f64,
    pub humidity: f64,
}

impl From<&InputRecord> for PlanInput {
    fn from(input: &InputRecord) -> Self {
        PlanInput {
            room_temp: input.room_temp,
            humidity: input.humidity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub room_temp: f64,
    pub humidity: f64,
    pub planned_ac_temp: f64,
    pub mode: Mode,
    pub goal: String,
}

/// 22 °C above 30 °C, otherwise 24 °C; Dry Mode above 60 % humidity.
pub fn plan(input: &PlanInput) -> PlanRecord {
    PlanRecord {
        room_temp: input.room_temp,
        humidity: input.humidity,
        planned_ac_temp: if input.room_temp > 30.0 { 22.0 } else { 24.0 },
        mode: if input.humidity > 60.0 {
            Mode::Dry
        } else {
            Mode::Cool
        },
        goal: GOAL.to_string(),
    }
}
