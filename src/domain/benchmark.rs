use serde::Serialize;

use crate::domain::scenario::Scenario;

/// Target values a scenario is scored and simulated against.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Benchmark {
    pub inbound_volume: Option<f64>,
    /// Aligned with the scenario's conversion rates; `None` means no target.
    pub conversion_rates: Vec<Option<f64>>,
    pub average_selling_price: Option<f64>,
    pub sales_cycle_days: Option<f64>,
    pub gross_margin: Option<f64>,
    pub churn_monthly: Option<f64>,
    pub cac: Option<f64>,
    pub dso: Option<f64>,
    pub onboarding_days: Option<f64>,
    pub no_show_rate: Option<f64>,
}

impl Benchmark {
    /// Uses every value of `scenario` as a target, e.g. last period's results.
    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self {
            inbound_volume: scenario.inbound_volume,
            conversion_rates: scenario.conversion_rates.0.iter().copied().map(Some).collect(),
            average_selling_price: Some(scenario.commercial.average_selling_price),
            sales_cycle_days: Some(scenario.commercial.sales_cycle_days),
            gross_margin: Some(scenario.commercial.gross_margin),
            churn_monthly: Some(scenario.commercial.churn_monthly),
            cac: Some(scenario.cash.cac),
            dso: Some(scenario.cash.dso),
            onboarding_days: scenario.delivery.onboarding_days,
            no_show_rate: scenario.no_show_rate,
        }
    }

    pub fn conversion_rate(&self, stage: usize) -> Option<f64> {
        self.conversion_rates.get(stage).copied().flatten()
    }
}
