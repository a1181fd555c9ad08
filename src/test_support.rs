use crate::domain::funnel::ConversionRates;
use crate::domain::scenario::{Cash, Commercial, Delivery, Headcount, Scenario};
use crate::domain::stage::Stage;

// A stage whose capacity per week is exactly `capacity`
pub fn build_stage(name: &str, capacity: f64) -> Stage {
    let mut stage = Stage::new(&name.to_lowercase(), name);
    stage.fte = 1.0;
    stage.focus_hours_per_week = 1.0;
    stage.utilization = 1.0;
    stage.yield_rate = 1.0;
    stage.standard_rate_per_hour = capacity;
    stage
}

pub fn build_scenario(stages: &[(&str, f64)], rates: &[f64], delivery: Option<f64>) -> Scenario {
    let mut commercial = Commercial::new(1000.0, 0.8, 42.0);
    commercial.churn_monthly = 0.02;

    Scenario {
        name: "Current".to_string(),
        window_days: 90.0,
        stages: stages
            .iter()
            .map(|(name, capacity)| build_stage(name, *capacity))
            .collect(),
        conversion_rates: ConversionRates(rates.to_vec()),
        inbound_volume: None,
        commercial,
        delivery: delivery.map(Delivery::with_capacity).unwrap_or_default(),
        cash: Cash {
            cac: 2000.0,
            ..Cash::default()
        },
        headcount: Headcount::from_total(10.0),
        backlog: Vec::new(),
        no_show_rate: None,
    }
}
