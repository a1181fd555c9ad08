use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::config::AnalysisConfig;
use crate::domain::numeric::Bounded;
use crate::domain::scenario::Scenario;
use crate::services::capacity::{capacity_per_week, delivery_capacity, stage_limits, weeks_of_backlog};
use crate::services::constraint_solver::{
    required_volume, solve, ConstraintLabel, RequiredVolume,
};
use crate::services::conversion::downstream_products;
use crate::services::economics::{rollup, Economics};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("scenario '{0}' has no funnel stages")]
    NoStages(String),
}

/// Everything the engine derives about one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRow {
    pub index: usize,
    pub id: String,
    pub name: String,
    pub unit: String,
    pub owner: String,
    pub capacity_per_week: f64,
    /// Capacity, capped by inbound volume for the first stage.
    pub limit_per_week: f64,
    pub downstream_product: f64,
    /// Won units per week this stage alone would allow.
    pub terminal_flow_per_week: f64,
    pub queued_units: f64,
    pub weeks_of_backlog: Bounded,
    /// Input this stage needs to keep delivery saturated.
    pub required_input_for_delivery: Option<RequiredVolume>,
    /// Required input minus the stage's own limit; positive means short.
    pub input_gap_per_week: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub scenario: String,
    pub window_days: f64,
    pub weeks_in_window: f64,
    pub stages: Vec<StageRow>,
    pub delivery_capacity_per_week: Option<f64>,
    pub demand_flow_per_week: f64,
    pub system_flow_per_week: f64,
    pub constraint: ConstraintLabel,
    pub economics: Economics,
}

/// Runs capacity, conversion, constraint and economics for one scenario.
pub fn evaluate(scenario: &Scenario, config: &AnalysisConfig) -> Result<Evaluation, AnalysisError> {
    let limits = stage_limits(scenario);
    let downstream = downstream_products(&scenario.conversion_rates.aligned(scenario.stages.len()));
    let delivery = delivery_capacity(&scenario.delivery);

    let solution = solve(&scenario.stages, &limits, &downstream, delivery)
        .ok_or_else(|| AnalysisError::NoStages(scenario.name.clone()))?;

    let stages = scenario
        .stages
        .iter()
        .enumerate()
        .map(|(index, stage)| {
            let capacity = capacity_per_week(stage);
            let queued_units = scenario.queued_units(&stage.id);
            let required = delivery.map(|target| required_volume(downstream[index], target));
            StageRow {
                index,
                id: stage.id.clone(),
                name: stage.name.clone(),
                unit: stage.unit.clone(),
                owner: stage.owner.clone(),
                capacity_per_week: capacity,
                limit_per_week: limits[index],
                downstream_product: downstream[index],
                terminal_flow_per_week: solution.stage_flows[index],
                queued_units,
                weeks_of_backlog: weeks_of_backlog(queued_units, capacity),
                required_input_for_delivery: required,
                input_gap_per_week: required
                    .and_then(RequiredVolume::per_week)
                    .map(|needed| needed - limits[index]),
            }
        })
        .collect();

    let economics = rollup(
        solution.system_flow,
        scenario.window_days,
        &scenario.commercial,
        scenario.headcount.total,
        &scenario.cash,
        config.cash_efficiency_threshold,
    );

    debug!(
        scenario = %scenario.name,
        system_flow = solution.system_flow,
        gross_profit = economics.gross_profit_window,
        "evaluated scenario"
    );

    Ok(Evaluation {
        scenario: scenario.name.clone(),
        window_days: scenario.window_days,
        weeks_in_window: scenario.weeks_in_window(),
        stages,
        delivery_capacity_per_week: delivery,
        demand_flow_per_week: solution.demand_flow,
        system_flow_per_week: solution.system_flow,
        constraint: solution.constraint,
        economics,
    })
}
