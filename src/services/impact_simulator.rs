use serde::Serialize;
use tracing::debug;

use crate::domain::benchmark::Benchmark;
use crate::domain::config::AnalysisConfig;
use crate::domain::lever::{Lever, ScenarioPatch};
use crate::domain::metric::Direction;
use crate::domain::numeric::sanitize;
use crate::domain::scenario::Scenario;
use crate::services::economics::EconomicsDelta;
use crate::services::evaluation::{evaluate, AnalysisError, Evaluation};

/// Marginal effect of restoring one lever to its benchmark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Impact {
    pub lever: Lever,
    pub label: String,
    /// `None` when the lever has no target to restore to.
    pub patch: Option<ScenarioPatch>,
    pub flow_delta_per_week: f64,
    pub economics_delta: EconomicsDelta,
}

impl Impact {
    pub fn gross_profit_delta(&self) -> f64 {
        self.economics_delta.gross_profit_window
    }
}

/// The better of `current` and `target` in the given direction.
fn restored_value(current: f64, target: f64, direction: Direction) -> f64 {
    let current = sanitize(current);
    let target = sanitize(target);
    match direction {
        Direction::HigherIsBetter => current.max(target),
        Direction::LowerIsBetter if target > 0.0 => current.min(target),
        Direction::LowerIsBetter => current,
    }
}

/// The patch restoring `lever`, when both a current value and a target exist.
pub fn patch_for(
    lever: Lever,
    scenario: &Scenario,
    benchmark: &Benchmark,
    config: &AnalysisConfig,
) -> Option<ScenarioPatch> {
    let direction = config.direction(lever.metric());
    let patch = match lever {
        Lever::InboundVolume => ScenarioPatch::InboundVolume {
            value: restored_value(scenario.inbound_volume?, benchmark.inbound_volume?, direction),
        },
        Lever::ConversionRate { stage } => {
            if stage + 1 >= scenario.stages.len() {
                return None;
            }
            ScenarioPatch::ConversionRate {
                stage,
                value: restored_value(
                    scenario.conversion_rates.rate(stage),
                    benchmark.conversion_rate(stage)?,
                    direction,
                ),
            }
        }
        Lever::AverageSellingPrice => ScenarioPatch::AverageSellingPrice {
            value: restored_value(
                scenario.commercial.average_selling_price,
                benchmark.average_selling_price?,
                direction,
            ),
        },
        Lever::SalesCycle => ScenarioPatch::SalesCycleDays {
            value: restored_value(
                scenario.commercial.sales_cycle_days,
                benchmark.sales_cycle_days?,
                direction,
            ),
        },
    };
    Some(patch)
}

fn impact_against(
    baseline: &Evaluation,
    lever: Lever,
    scenario: &Scenario,
    benchmark: &Benchmark,
    config: &AnalysisConfig,
) -> Result<Impact, AnalysisError> {
    let patch = patch_for(lever, scenario, benchmark, config);
    let simulated = match &patch {
        Some(patch) => evaluate(&patch.apply(scenario), config)?,
        None => baseline.clone(),
    };

    Ok(Impact {
        lever,
        label: lever.label(scenario),
        patch,
        flow_delta_per_week: simulated.system_flow_per_week - baseline.system_flow_per_week,
        economics_delta: simulated.economics.delta_from(&baseline.economics),
    })
}

/// Re-runs the pipeline with one lever restored to its benchmark.
///
/// `scenario` is never modified; a lever without a target yields a zero delta.
pub fn impact_of_restoring(
    lever: Lever,
    scenario: &Scenario,
    benchmark: &Benchmark,
    config: &AnalysisConfig,
) -> Result<Impact, AnalysisError> {
    let baseline = evaluate(scenario, config)?;
    impact_against(&baseline, lever, scenario, benchmark, config)
}

/// Impacts of every lever with a target, largest gross-profit gain first.
///
/// The sort is stable, so equal gains keep funnel order.
pub fn rank_impacts(
    scenario: &Scenario,
    benchmark: &Benchmark,
    config: &AnalysisConfig,
) -> Result<Vec<Impact>, AnalysisError> {
    let baseline = evaluate(scenario, config)?;
    let mut impacts = Lever::all(scenario.stages.len())
        .into_iter()
        .filter(|lever| patch_for(*lever, scenario, benchmark, config).is_some())
        .map(|lever| impact_against(&baseline, lever, scenario, benchmark, config))
        .collect::<Result<Vec<_>, _>>()?;

    impacts.sort_by(|a, b| b.gross_profit_delta().total_cmp(&a.gross_profit_delta()));
    debug!(levers = impacts.len(), "ranked lever impacts");
    Ok(impacts)
}

/// First ranked impact with a strictly positive gross-profit gain.
pub fn top_recommendation(ranked: &[Impact]) -> Option<&Impact> {
    ranked.iter().find(|impact| impact.gross_profit_delta() > 0.0)
}
