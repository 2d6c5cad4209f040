//! Energy model: cooling load, daily consumption, and the unit/compressor
//! reference table.

use crate::domain::{AcType, CompressorType};

/// Hours of operation assumed per day.
pub const RUNTIME_HOURS: f64 = 8.0;

/// kW of cooling load per ton of rated capacity.
pub const TONNAGE_KW: f64 = 3.5;

/// Per-ton coefficient used when re-estimating under a tight budget.
pub const REDUCED_TONNAGE_KW: f64 = 3.2;

/// External heat is given in watts; the load is in kW.
pub const WATTS_PER_KW: f64 = 1000.0;

/// kW of cooling load per square foot of floor.
pub const AREA_KW_PER_SQFT: f64 = 0.04;

/// Daily units for unit/compressor pairs missing from the table.
pub const FALLBACK_COMBO_UNITS: f64 = 12.0;

/// Reference daily units for a unit type and compressor pair.
///
/// Informational only: the figure is reported in the decision trace and never
/// feeds into the estimate the budget loop compares against.
pub fn combo_base_units(ac_type: AcType, compressor: CompressorType) -> f64 {
    use AcType::*;
    use CompressorType::*;

    match (ac_type, compressor) {
        (Split, InverterRotary) => 10.0,
        (Cassette, InverterRotary) => 11.0,
        (Split, Scroll) => 11.0,
        (Cassette, Scroll) => 12.0,
        (Window, Scroll) => 13.0,
        (Window, Reciprocating) => 14.0,
        (Portable, FixedSpeedRotary) => 15.0,
        _ => FALLBACK_COMBO_UNITS,
    }
}

/// Cooling load in kW: tonnage, external heat and room area contributions.
pub fn cooling_load_kw(
    tonnage: f64,
    kw_per_ton: f64,
    external_heat_w: f64,
    room_size_sqft: f64,
) -> f64 {
    tonnage * kw_per_ton + external_heat_w / WATTS_PER_KW + room_size_sqft * AREA_KW_PER_SQFT
}

/// Hourly consumption (kWh) for a load at the given efficiency.
pub fn hourly_units(cooling_load_kw: f64, iseer: f64) -> f64 {
    cooling_load_kw / iseer
}

/// Daily consumption (kWh) over [`RUNTIME_HOURS`].
pub fn daily_units(cooling_load_kw: f64, iseer: f64) -> f64 {
    hourly_units(cooling_load_kw, iseer) * RUNTIME_HOURS
}
