use std::fmt;

use serde::Serialize;

use crate::domain::metric::MetricKind;
use crate::domain::scenario::Scenario;

/// A scenario input that can be restored to its benchmark in isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "lever", rename_all = "snake_case")]
pub enum Lever {
    InboundVolume,
    /// Conversion out of `stage` into the next stage.
    ConversionRate { stage: usize },
    AverageSellingPrice,
    SalesCycle,
}

impl Lever {
    /// Every lever of a funnel with `stage_count` stages, in funnel order.
    pub fn all(stage_count: usize) -> Vec<Lever> {
        let mut levers = vec![Lever::InboundVolume];
        levers.extend(
            (0..stage_count.saturating_sub(1)).map(|stage| Lever::ConversionRate { stage }),
        );
        levers.push(Lever::AverageSellingPrice);
        levers.push(Lever::SalesCycle);
        levers
    }

    pub fn metric(self) -> MetricKind {
        match self {
            Lever::InboundVolume => MetricKind::InboundVolume,
            Lever::ConversionRate { .. } => MetricKind::ConversionRate,
            Lever::AverageSellingPrice => MetricKind::AverageSellingPrice,
            Lever::SalesCycle => MetricKind::SalesCycleDays,
        }
    }

    /// Human label; conversion levers are named after the stages they join.
    pub fn label(self, scenario: &Scenario) -> String {
        match self {
            Lever::ConversionRate { stage } => {
                let from = scenario.stages.get(stage).map(|s| s.name.as_str());
                let to = scenario.stages.get(stage + 1).map(|s| s.name.as_str());
                match (from, to) {
                    (Some(from), Some(to)) => format!("{from} -> {to}"),
                    _ => format!("Conversion {stage}"),
                }
            }
            other => other.metric().label().to_string(),
        }
    }
}

impl fmt::Display for Lever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lever::InboundVolume => write!(f, "inbound_volume"),
            Lever::ConversionRate { stage } => write!(f, "conversion_rate[{stage}]"),
            Lever::AverageSellingPrice => write!(f, "average_selling_price"),
            Lever::SalesCycle => write!(f, "sales_cycle"),
        }
    }
}

/// Replacement of exactly one scenario field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum ScenarioPatch {
    InboundVolume { value: f64 },
    ConversionRate { stage: usize, value: f64 },
    AverageSellingPrice { value: f64 },
    SalesCycleDays { value: f64 },
}

impl ScenarioPatch {
    /// Returns a patched copy; `scenario` itself is left untouched.
    pub fn apply(&self, scenario: &Scenario) -> Scenario {
        let mut patched = scenario.clone();
        match *self {
            ScenarioPatch::InboundVolume { value } => patched.inbound_volume = Some(value),
            ScenarioPatch::ConversionRate { stage, value } => {
                patched.conversion_rates = scenario.conversion_rates.with_rate(stage, value);
            }
            ScenarioPatch::AverageSellingPrice { value } => {
                patched.commercial.average_selling_price = value;
            }
            ScenarioPatch::SalesCycleDays { value } => patched.commercial.sales_cycle_days = value,
        }
        patched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::build_scenario;

    #[test]
    fn all_lists_levers_in_funnel_order() {
        let levers = Lever::all(3);
        assert_eq!(
            levers,
            vec![
                Lever::InboundVolume,
                Lever::ConversionRate { stage: 0 },
                Lever::ConversionRate { stage: 1 },
                Lever::AverageSellingPrice,
                Lever::SalesCycle,
            ]
        );
    }

    #[test]
    fn conversion_lever_label_names_both_stages() {
        let scenario = build_scenario(&[("Lead", 10.0), ("Qualified", 10.0)], &[0.5], None);
        assert_eq!(Lever::ConversionRate { stage: 0 }.label(&scenario), "Lead -> Qualified");
        assert_eq!(Lever::ConversionRate { stage: 4 }.label(&scenario), "Conversion 4");
        assert_eq!(Lever::SalesCycle.label(&scenario), "Sales cycle (days)");
    }

    #[test]
    fn patch_apply_leaves_original_untouched() {
        let scenario = build_scenario(&[("Lead", 10.0), ("Qualified", 10.0)], &[0.5], None);
        let patched = ScenarioPatch::ConversionRate {
            stage: 0,
            value: 0.75,
        }
        .apply(&scenario);

        assert_eq!(patched.conversion_rates.0, vec![0.75]);
        assert_eq!(scenario.conversion_rates.0, vec![0.5]);

        let patched = ScenarioPatch::SalesCycleDays { value: 21.0 }.apply(&scenario);
        assert_eq!(patched.commercial.sales_cycle_days, 21.0);
        assert_ne!(scenario.commercial.sales_cycle_days, 21.0);
    }
}
