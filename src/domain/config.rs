use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::metric::{Direction, MetricKind};

pub const DEFAULT_WINDOW_DAYS: f64 = 90.0;
pub const DEFAULT_CASH_EFFICIENCY_THRESHOLD: f64 = 3.0;

/// Options recognized by one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisConfig {
    /// Window applied to scenarios that do not state their own.
    pub window_days: f64,
    /// GP30/CAC below this marks cash as a constraint.
    pub cash_efficiency_threshold: f64,
    pub lower_is_better: BTreeSet<MetricKind>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            cash_efficiency_threshold: DEFAULT_CASH_EFFICIENCY_THRESHOLD,
            lower_is_better: MetricKind::default_lower_is_better(),
        }
    }
}

impl AnalysisConfig {
    pub fn direction(&self, metric: MetricKind) -> Direction {
        if self.lower_is_better.contains(&metric) {
            Direction::LowerIsBetter
        } else {
            Direction::HigherIsBetter
        }
    }
}

/// Values supplied on the command line; they win over the scenario file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfigOverrides {
    pub window_days: Option<f64>,
    pub cash_efficiency_threshold: Option<f64>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(window_days) = self.window_days {
            config.window_days = window_days;
        }
        if let Some(threshold) = self.cash_efficiency_threshold {
            config.cash_efficiency_threshold = threshold;
        }
        config
    }
}
