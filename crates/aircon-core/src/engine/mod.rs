//! Rule cascade: input conditions in, one AC recommendation out.
//!
//! The engine is pure. It reads only its argument, never the case log, and
//! yields identical output for identical input.

pub mod energy;
pub mod rules;

use aircon_state::OutputRecord;
use serde::{Deserialize, Serialize};

use crate::domain::{InputRecord, Result};
use crate::obs::{emit_budget_adjusted, DecisionSpan};
use rules::{DecisionBuilder, CASCADE};

/// Intermediate values behind a decision, for `--explain` style reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTrace {
    /// Setpoint chosen by the temperature band, before overrides
    pub base_temp: f64,
    /// Reference daily units for the unit/compressor pair
    pub combo_base_units: f64,
    /// Daily estimate at the standard coefficient
    pub standard_daily_units: f64,
    /// `standard_daily_units + combo_base_units`
    pub total_daily_units: f64,
    pub total_hourly_units: f64,
    pub budget_adjustments: u8,
    pub final_bump: bool,
    /// Names of the rules, in the order they ran
    pub rules_applied: Vec<String>,
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Validate `input` and run the full cascade.
pub fn compute(input: &InputRecord) -> Result<OutputRecord> {
    compute_with_trace(input).map(|(output, _)| output)
}

/// Like [`compute`], also returning the intermediate values.
pub fn compute_with_trace(input: &InputRecord) -> Result<(OutputRecord, DecisionTrace)> {
    input.validate()?;
    let _span = DecisionSpan::enter(input.timing.hour(), input.num_people);

    let mut d = DecisionBuilder::default();
    let mut rules_applied = Vec::with_capacity(CASCADE.len());
    for (name, rule) in CASCADE {
        d = rule(d, input);
        rules_applied.push(name.to_string());
    }

    if d.budget_adjustments > 0 || d.final_bump {
        emit_budget_adjusted(
            d.budget_adjustments,
            d.final_bump,
            d.estimated_units_per_day,
            input.affordable_units,
        );
    }

    let output = OutputRecord {
        room_temp: input.room_temp,
        humidity: input.humidity,
        suggested_ac_temp: round_to(d.suggested_ac_temp, 1),
        mode: d.mode,
        fan_speed: d.fan_speed,
        flap_direction: d.flap_direction,
        estimated_units_per_day: round_to(d.estimated_units_per_day, 2),
    };
    let trace = DecisionTrace {
        base_temp: d.base_temp,
        combo_base_units: d.combo_base_units,
        standard_daily_units: round_to(d.standard_daily_units, 2),
        total_daily_units: round_to(d.standard_daily_units + d.combo_base_units, 2),
        total_hourly_units: round_to(d.total_hourly_units, 2),
        budget_adjustments: d.budget_adjustments,
        final_bump: d.final_bump,
        rules_applied,
    };
    tracing::debug!(?output, "decision computed");
    Ok((output, trace))
}
