//! Structured observability hooks for decision lifecycle events.
//!
//! This module provides:
//! - A decision-scoped tracing span via the `DecisionSpan` RAII guard
//! - Emission functions for cache hits and misses, persistence, store
//!   degradation and budget adjustments
//!
//! Events are emitted at `info!` level, failures at `warn!`. Filter with
//! `AIRCON_LOG` (or `RUST_LOG`).

use tracing::{info, warn};

/// RAII guard that enters a decision-scoped span while the cascade runs.
///
/// # Example
///
/// ```ignore
/// let _span = DecisionSpan::enter(23, 0);
/// // every event inside carries hour=23 num_people=0
/// ```
pub struct DecisionSpan {
    _span: tracing::span::EnteredSpan,
}

impl DecisionSpan {
    pub fn enter(hour: u8, num_people: u32) -> Self {
        let span = tracing::info_span!("aircon.decision", hour = hour, num_people = num_people);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a stored case answered the request.
pub fn emit_cache_hit(case_id: &str, room_temp: f64, humidity: f64) {
    info!(
        event = "decision.cache_hit",
        case_id = %case_id,
        room_temp = room_temp,
        humidity = humidity,
    );
}

/// Emit event: no similar case, the engine ran.
pub fn emit_cache_miss(room_temp: f64, humidity: f64, num_people: u32, hour: u8) {
    info!(
        event = "decision.cache_miss",
        room_temp = room_temp,
        humidity = humidity,
        num_people = num_people,
        hour = hour,
    );
}

pub fn emit_case_persisted(case_id: &str) {
    info!(event = "case.persisted", case_id = %case_id);
}

/// Emit event: a store call failed and the decision went ahead without it.
pub fn emit_store_degraded(operation: &str, error: &dyn std::fmt::Display) {
    warn!(event = "store.degraded", operation = %operation, error = %error);
}

/// Emit event: the budget loop changed the recommendation.
pub fn emit_budget_adjusted(
    adjustments: u8,
    final_bump: bool,
    estimated_units: f64,
    affordable_units: f64,
) {
    info!(
        event = "budget.adjusted",
        adjustments = adjustments,
        final_bump = final_bump,
        estimated_units = estimated_units,
        affordable_units = affordable_units,
    );
}
