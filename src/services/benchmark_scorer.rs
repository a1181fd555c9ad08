use std::fmt;

use serde::Serialize;

use crate::domain::benchmark::Benchmark;
use crate::domain::config::AnalysisConfig;
use crate::domain::lever::Lever;
use crate::domain::metric::{Direction, MetricKind};
use crate::domain::numeric::sanitize;
use crate::domain::scenario::Scenario;

/// Lowest ratio still reported as only slightly below target.
pub const SLIGHTLY_BELOW_FLOOR: f64 = 0.95;

/// Current value relative to target, oriented so that 1.0 means "on target".
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attainment {
    Ratio(f64),
    NotComparable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTier {
    OnOrAbove,
    SlightlyBelow,
    BelowTarget,
    NotComparable,
}

impl StatusTier {
    pub fn label(self) -> &'static str {
        match self {
            StatusTier::OnOrAbove => "on/above target",
            StatusTier::SlightlyBelow => "slightly below",
            StatusTier::BelowTarget => "below target",
            StatusTier::NotComparable => "not comparable",
        }
    }
}

impl fmt::Display for StatusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Attainment {
    pub fn ratio(self) -> Option<f64> {
        match self {
            Attainment::Ratio(ratio) => Some(ratio),
            Attainment::NotComparable => None,
        }
    }

    pub fn tier(self) -> StatusTier {
        match self {
            Attainment::Ratio(ratio) => status_tier(ratio),
            Attainment::NotComparable => StatusTier::NotComparable,
        }
    }
}

/// Ratio of current to target.
///
/// Lower-is-better metrics are inverted (`target / current`) so the same tiers
/// apply to both directions.
pub fn attainment(current: f64, target: f64, direction: Direction) -> Attainment {
    let current = sanitize(current);
    let target = sanitize(target);
    let ratio = match direction {
        Direction::HigherIsBetter if target > 0.0 => current / target,
        Direction::LowerIsBetter if target > 0.0 && current > 0.0 => target / current,
        _ => return Attainment::NotComparable,
    };
    if ratio.is_finite() {
        Attainment::Ratio(ratio)
    } else {
        Attainment::NotComparable
    }
}

/// Tier of an attainment ratio. Defined for every `f64`.
pub fn status_tier(ratio: f64) -> StatusTier {
    if !ratio.is_finite() {
        StatusTier::NotComparable
    } else if ratio >= 1.0 {
        StatusTier::OnOrAbove
    } else if ratio >= SLIGHTLY_BELOW_FLOOR {
        StatusTier::SlightlyBelow
    } else {
        StatusTier::BelowTarget
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
    pub metric: MetricKind,
    pub label: String,
    /// Set when the row can be simulated.
    pub lever: Option<Lever>,
    pub direction: Direction,
    pub current: f64,
    pub target: f64,
    pub attainment: Attainment,
    pub status: StatusTier,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scorecard {
    pub rows: Vec<ScoreRow>,
    /// Label of the row with the highest comparable ratio.
    pub best_metric: Option<String>,
}

/// Scores every metric that has both a current value and a target.
pub fn score_scenario(
    scenario: &Scenario,
    benchmark: &Benchmark,
    config: &AnalysisConfig,
) -> Scorecard {
    let mut candidates: Vec<(MetricKind, String, Option<Lever>, Option<f64>, Option<f64>)> =
        Vec::new();

    candidates.push((
        MetricKind::InboundVolume,
        MetricKind::InboundVolume.label().to_string(),
        Some(Lever::InboundVolume),
        scenario.inbound_volume,
        benchmark.inbound_volume,
    ));
    for stage in 0..scenario.stages.len().saturating_sub(1) {
        let lever = Lever::ConversionRate { stage };
        candidates.push((
            MetricKind::ConversionRate,
            lever.label(scenario),
            Some(lever),
            Some(scenario.conversion_rates.rate(stage)),
            benchmark.conversion_rate(stage),
        ));
    }
    let commercial = &scenario.commercial;
    candidates.extend([
        (
            MetricKind::AverageSellingPrice,
            MetricKind::AverageSellingPrice.label().to_string(),
            Some(Lever::AverageSellingPrice),
            Some(commercial.average_selling_price),
            benchmark.average_selling_price,
        ),
        (
            MetricKind::GrossMargin,
            MetricKind::GrossMargin.label().to_string(),
            None,
            Some(commercial.gross_margin),
            benchmark.gross_margin,
        ),
        (
            MetricKind::SalesCycleDays,
            MetricKind::SalesCycleDays.label().to_string(),
            Some(Lever::SalesCycle),
            Some(commercial.sales_cycle_days),
            benchmark.sales_cycle_days,
        ),
        (
            MetricKind::ChurnMonthly,
            MetricKind::ChurnMonthly.label().to_string(),
            None,
            Some(commercial.churn_monthly),
            benchmark.churn_monthly,
        ),
        (
            MetricKind::Cac,
            MetricKind::Cac.label().to_string(),
            None,
            Some(scenario.cash.cac),
            benchmark.cac,
        ),
        (
            MetricKind::Dso,
            MetricKind::Dso.label().to_string(),
            None,
            Some(scenario.cash.dso),
            benchmark.dso,
        ),
        (
            MetricKind::OnboardingDays,
            MetricKind::OnboardingDays.label().to_string(),
            None,
            scenario.delivery.onboarding_days,
            benchmark.onboarding_days,
        ),
        (
            MetricKind::NoShowRate,
            MetricKind::NoShowRate.label().to_string(),
            None,
            scenario.no_show_rate,
            benchmark.no_show_rate,
        ),
    ]);

    let rows: Vec<ScoreRow> = candidates
        .into_iter()
        .filter_map(|(metric, label, lever, current, target)| {
            let (current, target) = (current?, target?);
            let direction = config.direction(metric);
            let attainment = attainment(current, target, direction);
            Some(ScoreRow {
                metric,
                label,
                lever,
                direction,
                current,
                target,
                attainment,
                status: attainment.tier(),
            })
        })
        .collect();

    let best_metric = rows
        .iter()
        .filter_map(|row| row.attainment.ratio().map(|ratio| (row, ratio)))
        .fold(None::<(&ScoreRow, f64)>, |best, (row, ratio)| match best {
            Some((_, best_ratio)) if ratio <= best_ratio => best,
            _ => Some((row, ratio)),
        })
        .map(|(row, _)| row.label.clone());

    Scorecard { rows, best_metric }
}
