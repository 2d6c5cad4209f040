//! The individual rules of the decision cascade.
//!
//! Each rule takes the partially built decision by value and returns it with
//! its own adjustment applied. Order matters: later rules may override the
//! mode, fan speed or setpoint chosen by earlier ones. See [`CASCADE`].

use aircon_state::{FanSpeed, FlapDirection, Mode};

use super::energy::{
    combo_base_units, cooling_load_kw, daily_units, REDUCED_TONNAGE_KW, RUNTIME_HOURS, TONNAGE_KW,
};
use crate::domain::InputRecord;

/// Most re-estimates the budget loop runs before the final bump.
pub const MAX_BUDGET_ADJUSTMENTS: u8 = 2;

/// A decision under construction.
///
/// Carries the output fields plus the intermediates reported in the trace.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionBuilder {
    pub suggested_ac_temp: f64,
    pub mode: Mode,
    pub fan_speed: FanSpeed,
    pub flap_direction: FlapDirection,
    pub estimated_units_per_day: f64,

    pub base_temp: f64,
    pub combo_base_units: f64,
    pub standard_daily_units: f64,
    pub total_hourly_units: f64,
    pub budget_adjustments: u8,
    pub final_bump: bool,
}

impl Default for DecisionBuilder {
    /// Fan speed starts at Low; every path through the cascade overwrites it.
    fn default() -> Self {
        Self {
            suggested_ac_temp: 0.0,
            mode: Mode::Cool,
            fan_speed: FanSpeed::Low,
            flap_direction: FlapDirection::Middle,
            estimated_units_per_day: 0.0,
            base_temp: 0.0,
            combo_base_units: 0.0,
            standard_daily_units: 0.0,
            total_hourly_units: 0.0,
            budget_adjustments: 0,
            final_bump: false,
        }
    }
}

impl DecisionBuilder {
    fn economize(&mut self) {
        self.suggested_ac_temp += 1.0;
        self.mode = Mode::Eco;
        self.fan_speed = FanSpeed::Low;
    }
}

pub type Rule = fn(DecisionBuilder, &InputRecord) -> DecisionBuilder;

/// The cascade, in evaluation order.
pub const CASCADE: [(&str, Rule); 8] = [
    ("temperature_band", temperature_band),
    ("humidity_mode", humidity_mode),
    ("vacancy", vacancy),
    ("sleep", sleep),
    ("fan_speed", fan_speed),
    ("flap_direction", flap_direction),
    ("energy_estimate", energy_estimate),
    ("budget", budget),
];

/// Hotter rooms get a lower setpoint.
pub fn temperature_band(mut d: DecisionBuilder, input: &InputRecord) -> DecisionBuilder {
    let t = input.room_temp;
    d.suggested_ac_temp = if t >= 38.0 {
        18.0
    } else if t >= 32.0 {
        20.0
    } else if t >= 28.0 {
        22.0
    } else {
        24.0
    };
    d.base_temp = d.suggested_ac_temp;
    d
}

pub fn humidity_mode(mut d: DecisionBuilder, input: &InputRecord) -> DecisionBuilder {
    d.mode = if input.humidity > 60.0 {
        Mode::Dry
    } else {
        Mode::Cool
    };
    d
}

/// Empty room: economize regardless of conditions.
pub fn vacancy(mut d: DecisionBuilder, input: &InputRecord) -> DecisionBuilder {
    if input.num_people == 0 {
        d.mode = Mode::Eco;
        d.fan_speed = FanSpeed::Low;
    }
    d
}

/// No movement at night means the occupants are asleep.
pub fn sleep(mut d: DecisionBuilder, input: &InputRecord) -> DecisionBuilder {
    if input.movement == aircon_state::Movement::No && input.timing.is_night() {
        d.mode = Mode::Sleep;
        d.suggested_ac_temp += 2.0;
    }
    d
}

/// Only applies to occupied rooms; an empty room keeps the vacancy setting.
pub fn fan_speed(mut d: DecisionBuilder, input: &InputRecord) -> DecisionBuilder {
    if input.num_people > 0 {
        d.fan_speed = if input.num_people >= 4 || input.room_temp > 35.0 {
            FanSpeed::High
        } else if input.num_people >= 2 {
            FanSpeed::Medium
        } else {
            FanSpeed::Low
        };
    }
    d
}

/// Aim the airflow at a single occupant, sweep for several.
pub fn flap_direction(mut d: DecisionBuilder, input: &InputRecord) -> DecisionBuilder {
    d.flap_direction = match input.position.single() {
        None => FlapDirection::Rotate,
        Some(12) => FlapDirection::Middle,
        Some(10 | 11) => FlapDirection::Left,
        Some(1 | 2) => FlapDirection::Right,
        Some(_) => FlapDirection::Middle,
    };
    d
}

/// Standard daily estimate. The hourly figure spreads the estimate plus the
/// unit/compressor reference units over the runtime.
pub fn energy_estimate(mut d: DecisionBuilder, input: &InputRecord) -> DecisionBuilder {
    let load = cooling_load_kw(input.tonnage, TONNAGE_KW, input.external_heat, input.room_size);
    d.standard_daily_units = daily_units(load, input.iseer);
    d.combo_base_units = combo_base_units(input.ac_type, input.compressor_options);
    d.total_hourly_units = (d.standard_daily_units + d.combo_base_units) / RUNTIME_HOURS;
    d.estimated_units_per_day = d.standard_daily_units;
    d
}

/// Trade comfort for consumption until the estimate fits the budget.
///
/// Runs at most [`MAX_BUDGET_ADJUSTMENTS`] re-estimates with the reduced
/// coefficient, each raising the setpoint by one degree. If the estimate still
/// exceeds the budget afterwards the setpoint is raised once more.
pub fn budget(mut d: DecisionBuilder, input: &InputRecord) -> DecisionBuilder {
    while d.estimated_units_per_day > input.affordable_units
        && d.budget_adjustments < MAX_BUDGET_ADJUSTMENTS
    {
        d.economize();
        let load = cooling_load_kw(
            input.tonnage,
            REDUCED_TONNAGE_KW,
            input.external_heat,
            input.room_size,
        );
        d.estimated_units_per_day = daily_units(load, input.iseer);
        d.budget_adjustments += 1;
    }

    if d.estimated_units_per_day > input.affordable_units {
        d.economize();
        d.final_bump = true;
    }
    d
}
