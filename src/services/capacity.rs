use crate::domain::numeric::{sanitize, saturating_product, Bounded};
use crate::domain::scenario::{Delivery, Scenario};
use crate::domain::stage::Stage;

/// Weekly throughput a stage can process:
/// `fte × focus hours × utilization × standard rate × yield`.
///
/// Malformed inputs count as zero, so the result is always finite and
/// non-negative and never decreases when any single input grows.
pub fn capacity_per_week(stage: &Stage) -> f64 {
    saturating_product([
        stage.fte,
        stage.focus_hours_per_week,
        stage.utilization,
        stage.standard_rate_per_hour,
        stage.yield_rate,
    ])
}

/// Per-week limit of every funnel stage.
///
/// The first stage is additionally capped by the inbound volume spread over
/// the window, when the scenario states one.
pub fn stage_limits(scenario: &Scenario) -> Vec<f64> {
    let mut limits: Vec<f64> = scenario.stages.iter().map(capacity_per_week).collect();
    if let (Some(first), Some(per_week)) = (limits.first_mut(), inbound_per_week(scenario)) {
        *first = first.min(per_week);
    }
    limits
}

/// Inbound volume as a weekly rate; `None` when the scenario has no volume.
pub fn inbound_per_week(scenario: &Scenario) -> Option<f64> {
    let volume = scenario.inbound_volume?;
    let weeks = scenario.weeks_in_window();
    Some(if weeks > 0.0 {
        sanitize(sanitize(volume) / weeks)
    } else {
        0.0
    })
}

/// Weekly post-sale capacity; `None` means delivery does not cap the system.
pub fn delivery_capacity(delivery: &Delivery) -> Option<f64> {
    if let Some(capacity) = delivery.capacity_per_week {
        return Some(sanitize(capacity));
    }
    delivery
        .stages
        .iter()
        .map(capacity_per_week)
        .reduce(f64::min)
}

/// How many weeks of work are queued in front of a stage.
pub fn weeks_of_backlog(queued_units: f64, capacity_per_week: f64) -> Bounded {
    if sanitize(queued_units) == 0.0 {
        return Bounded::Finite(0.0);
    }
    Bounded::ratio(queued_units, capacity_per_week)
}
