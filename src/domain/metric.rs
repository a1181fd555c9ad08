use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Metrics a scenario can be scored on against a benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    InboundVolume,
    ConversionRate,
    AverageSellingPrice,
    GrossMargin,
    SalesCycleDays,
    OnboardingDays,
    ChurnMonthly,
    Cac,
    Dso,
    NoShowRate,
}

impl MetricKind {
    /// The metrics where a smaller value is the better one.
    pub fn default_lower_is_better() -> BTreeSet<MetricKind> {
        BTreeSet::from([
            MetricKind::SalesCycleDays,
            MetricKind::OnboardingDays,
            MetricKind::ChurnMonthly,
            MetricKind::Cac,
            MetricKind::Dso,
            MetricKind::NoShowRate,
        ])
    }

    pub fn label(self) -> &'static str {
        match self {
            MetricKind::InboundVolume => "Inbound volume",
            MetricKind::ConversionRate => "Conversion rate",
            MetricKind::AverageSellingPrice => "Average selling price",
            MetricKind::GrossMargin => "Gross margin",
            MetricKind::SalesCycleDays => "Sales cycle (days)",
            MetricKind::OnboardingDays => "Onboarding (days)",
            MetricKind::ChurnMonthly => "Monthly churn",
            MetricKind::Cac => "CAC",
            MetricKind::Dso => "DSO (days)",
            MetricKind::NoShowRate => "No-show rate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}
