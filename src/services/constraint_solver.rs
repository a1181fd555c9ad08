use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::domain::numeric::{sanitize, saturating_product};
use crate::domain::stage::Stage;

/// Delivery only wins the label when it undercuts demand by more than this.
pub const FLOW_EPSILON: f64 = 1e-9;

pub const DELIVERY_LABEL: &str = "Delivery";

/// What limits the system: one funnel stage or post-sale delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintLabel {
    Stage { index: usize, id: String, name: String },
    Delivery,
}

impl ConstraintLabel {
    pub fn name(&self) -> &str {
        match self {
            ConstraintLabel::Stage { name, .. } => name,
            ConstraintLabel::Delivery => DELIVERY_LABEL,
        }
    }
}

impl fmt::Display for ConstraintLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintSolution {
    /// `F_i = limit_i × D_i` for every funnel stage.
    pub stage_flows: Vec<f64>,
    pub demand_flow: f64,
    pub demand_constraint: usize,
    /// `None` when nothing after the sale caps throughput.
    pub delivery_flow: Option<f64>,
    pub system_flow: f64,
    pub constraint: ConstraintLabel,
}

/// Input needed at a stage to produce a target terminal flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredVolume {
    PerWeek(f64),
    /// No volume reaches the terminal stage from here.
    Unreachable,
}

impl RequiredVolume {
    pub fn per_week(self) -> Option<f64> {
        match self {
            RequiredVolume::PerWeek(value) => Some(value),
            RequiredVolume::Unreachable => None,
        }
    }
}

/// Terminal flow each stage could sustain on its own.
pub fn stage_limited_flows(limits: &[f64], downstream: &[f64]) -> Vec<f64> {
    limits
        .iter()
        .zip(downstream)
        .map(|(limit, product)| saturating_product([*limit, *product]))
        .collect()
}

/// Index and value of the smallest flow; ties go to the earliest stage.
pub fn argmin_earliest(flows: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (index, flow) in flows.iter().copied().enumerate() {
        match best {
            Some((_, current)) if flow >= current => {}
            _ => best = Some((index, flow)),
        }
    }
    best
}

/// Finds the binding constraint of a funnel.
///
/// `limits` and `downstream` are indexed like `stages`. Returns `None` for a
/// funnel without stages.
pub fn solve(
    stages: &[Stage],
    limits: &[f64],
    downstream: &[f64],
    delivery_flow: Option<f64>,
) -> Option<ConstraintSolution> {
    let stage_flows = stage_limited_flows(limits, downstream);
    let (demand_constraint, demand_flow) = argmin_earliest(&stage_flows)?;
    let stage = stages.get(demand_constraint)?;
    let delivery_flow = delivery_flow.map(sanitize);

    let (system_flow, constraint) = match delivery_flow {
        Some(delivery) if delivery < demand_flow - FLOW_EPSILON => {
            (delivery, ConstraintLabel::Delivery)
        }
        _ => (
            delivery_flow.map_or(demand_flow, |delivery| demand_flow.min(delivery)),
            ConstraintLabel::Stage {
                index: demand_constraint,
                id: stage.id.clone(),
                name: stage.name.clone(),
            },
        ),
    };

    debug!(
        demand_flow,
        ?delivery_flow,
        system_flow,
        constraint = %constraint,
        "solved funnel constraint"
    );

    Some(ConstraintSolution {
        stage_flows,
        demand_flow,
        demand_constraint,
        delivery_flow,
        system_flow,
        constraint,
    })
}

/// Back-solves the weekly input a stage needs for `target_flow` terminal units.
///
/// A zero downstream product makes the target unreachable, which is reported
/// as such rather than as zero volume.
pub fn required_volume(downstream_product: f64, target_flow: f64) -> RequiredVolume {
    let product = sanitize(downstream_product);
    if product == 0.0 {
        return RequiredVolume::Unreachable;
    }
    let required = sanitize(target_flow) / product;
    RequiredVolume::PerWeek(if required.is_finite() { required } else { f64::MAX })
}
