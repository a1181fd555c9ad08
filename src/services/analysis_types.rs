use serde::Serialize;

use crate::domain::benchmark::Benchmark;
use crate::domain::config::AnalysisConfig;
use crate::domain::scenario::Scenario;
use crate::services::benchmark_scorer::Scorecard;
use crate::services::evaluation::Evaluation;
use crate::services::impact_simulator::Impact;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisInput {
    pub current: Scenario,
    pub previous: Option<Scenario>,
    pub benchmark: Option<Benchmark>,
}

/// Where the targets of a scorecard came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkSource {
    Explicit,
    Previous,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub label: String,
    pub current: Option<f64>,
    pub previous: Option<f64>,
    /// `(current - previous) / |previous|`; `None` when previous is zero or missing.
    pub delta_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioComparison {
    pub previous: Evaluation,
    pub constraint_changed: bool,
    pub rows: Vec<ComparisonRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub current: Evaluation,
    pub benchmark_source: BenchmarkSource,
    pub scorecard: Scorecard,
    pub impacts: Vec<Impact>,
    pub top_recommendation: Option<Impact>,
    pub comparison: Option<ScenarioComparison>,
}

/// Inputs, settings and results in one record for debugging.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisExport<'a> {
    pub config: &'a AnalysisConfig,
    pub input: &'a AnalysisInput,
    pub report: &'a AnalysisReport,
}
