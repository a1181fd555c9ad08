use tracing::info;

use crate::domain::benchmark::Benchmark;
use crate::domain::config::AnalysisConfig;
use crate::domain::numeric::delta_pct;
use crate::domain::scenario::Scenario;
use crate::services::analysis_types::{
    AnalysisInput, AnalysisReport, BenchmarkSource, ComparisonRow, ScenarioComparison,
};
use crate::services::benchmark_scorer::score_scenario;
use crate::services::evaluation::{evaluate, AnalysisError, Evaluation};
use crate::services::impact_simulator::{rank_impacts, top_recommendation};

/// Picks the targets: an explicit benchmark, else the previous scenario.
pub fn resolve_benchmark(input: &AnalysisInput) -> (Benchmark, BenchmarkSource) {
    match (&input.benchmark, &input.previous) {
        (Some(benchmark), _) => (benchmark.clone(), BenchmarkSource::Explicit),
        (None, Some(previous)) => (Benchmark::from_scenario(previous), BenchmarkSource::Previous),
        (None, None) => (Benchmark::default(), BenchmarkSource::None),
    }
}

/// Full analysis of the current scenario.
///
/// Pure: the same input and config always give an identical report.
pub fn analyze(
    input: &AnalysisInput,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    let current = evaluate(&input.current, config)?;
    let (benchmark, benchmark_source) = resolve_benchmark(input);

    let scorecard = score_scenario(&input.current, &benchmark, config);
    let impacts = rank_impacts(&input.current, &benchmark, config)?;
    let top = top_recommendation(&impacts).cloned();

    let comparison = match &input.previous {
        Some(previous) => Some(compare(&input.current, &current, previous, config)?),
        None => None,
    };

    info!(
        scenario = %input.current.name,
        constraint = %current.constraint,
        system_flow = current.system_flow_per_week,
        recommendation = top.as_ref().map(|impact| impact.label.as_str()).unwrap_or("none"),
        "analysis complete"
    );

    Ok(AnalysisReport {
        current,
        benchmark_source,
        scorecard,
        impacts,
        top_recommendation: top,
        comparison,
    })
}

fn compare(
    current_scenario: &Scenario,
    current: &Evaluation,
    previous_scenario: &Scenario,
    config: &AnalysisConfig,
) -> Result<ScenarioComparison, AnalysisError> {
    let previous = evaluate(previous_scenario, config)?;
    let (now, before) = (&current.economics, &previous.economics);

    let rows = vec![
        row(
            "Won per week",
            Some(current.system_flow_per_week),
            Some(previous.system_flow_per_week),
        ),
        row(
            "Sales velocity per week",
            Some(now.sales_velocity_per_week),
            Some(before.sales_velocity_per_week),
        ),
        row("Revenue in window", Some(now.revenue_window), Some(before.revenue_window)),
        row(
            "Gross profit in window",
            Some(now.gross_profit_window),
            Some(before.gross_profit_window),
        ),
        row("LTV : CAC", now.ltv_to_cac.finite(), before.ltv_to_cac.finite()),
        row(
            "Win rate",
            win_rate(current_scenario),
            win_rate(previous_scenario),
        ),
        row(
            "Average selling price",
            Some(current_scenario.commercial.average_selling_price),
            Some(previous_scenario.commercial.average_selling_price),
        ),
    ];

    Ok(ScenarioComparison {
        constraint_changed: current.constraint != previous.constraint,
        previous,
        rows,
    })
}

/// Conversion into the terminal stage.
fn win_rate(scenario: &Scenario) -> Option<f64> {
    let last = scenario.stages.len().checked_sub(2)?;
    Some(scenario.conversion_rates.rate(last))
}

fn row(label: &str, current: Option<f64>, previous: Option<f64>) -> ComparisonRow {
    ComparisonRow {
        label: label.to_string(),
        current,
        previous,
        delta_pct: match (current, previous) {
            (Some(current), Some(previous)) => delta_pct(current, previous),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lever::Lever;
    use crate::test_support::build_scenario;

    fn input() -> AnalysisInput {
        let mut current = build_scenario(
            &[("Lead", 200.0), ("Qualified", 60.0), ("Won", 100.0)],
            &[0.4, 0.25],
            Some(20.0),
        );

        let mut previous = current.clone();
        previous.name = "Previous".to_string();
        previous.conversion_rates.0 = vec![0.4, 0.3];

        AnalysisInput {
            current,
            previous: Some(previous),
            benchmark: None,
        }
    }

    #[test]
    fn previous_scenario_becomes_benchmark_when_none_given() {
        let report = analyze(&input(), &AnalysisConfig::default()).unwrap();
        assert_eq!(report.benchmark_source, BenchmarkSource::Previous);

        let top = report.top_recommendation.unwrap();
        assert_eq!(top.lever, Lever::ConversionRate { stage: 1 });
    }

    #[test]
    fn explicit_benchmark_wins_over_previous() {
        let mut input = input();
        input.benchmark = Some(Benchmark {
            average_selling_price: Some(1500.0),
            ..Benchmark::default()
        });
        let report = analyze(&input, &AnalysisConfig::default()).unwrap();

        assert_eq!(report.benchmark_source, BenchmarkSource::Explicit);
        assert_eq!(report.impacts.len(), 1);
        assert_eq!(
            report.top_recommendation.map(|impact| impact.lever),
            Some(Lever::AverageSellingPrice)
        );
    }

    #[test]
    fn comparison_reports_percentage_deltas() {
        let report = analyze(&input(), &AnalysisConfig::default()).unwrap();
        let comparison = report.comparison.unwrap();

        // Qualified limits both periods: 60 × 0.25 = 15 now, 60 × 0.3 = 18 before.
        assert_eq!(comparison.previous.constraint.name(), "Qualified");
        assert_eq!(report.current.constraint.name(), "Qualified");
        assert!(!comparison.constraint_changed);

        let won = comparison
            .rows
            .iter()
            .find(|row| row.label == "Won per week")
            .unwrap();
        assert!((won.delta_pct.unwrap() - (15.0 - 18.0) / 18.0).abs() < 1e-9);

        let win_rate = comparison
            .rows
            .iter()
            .find(|row| row.label == "Win rate")
            .unwrap();
        let delta = win_rate.delta_pct.unwrap();
        assert!((delta - (0.25 - 0.3) / 0.3).abs() < 1e-12);
    }

    #[test]
    fn comparison_delta_is_undefined_against_zero() {
        let mut input = input();
        if let Some(previous) = input.previous.as_mut() {
            previous.conversion_rates.0 = vec![0.0, 0.0];
        }
        let report = analyze(&input, &AnalysisConfig::default()).unwrap();
        let rows = report.comparison.unwrap().rows;
        let won = rows.iter().find(|row| row.label == "Won per week").unwrap();
        assert_eq!(won.previous, Some(0.0));
        assert_eq!(won.delta_pct, None);
    }

    #[test]
    fn analysis_is_idempotent() {
        let input = input();
        let config = AnalysisConfig::default();
        let first = serde_json::to_string(&analyze(&input, &config).unwrap()).unwrap();
        let second = serde_json::to_string(&analyze(&input, &config).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn concurrent_runs_match_serial_runs() {
        let config = AnalysisConfig::default();
        let inputs: Vec<AnalysisInput> = (0..8)
            .map(|i| {
                let mut input = input();
                input.current.commercial.average_selling_price = 1000.0 + i as f64 * 250.0;
                input
            })
            .collect();
        let serial: Vec<AnalysisReport> = inputs
            .iter()
            .map(|input| analyze(input, &config).unwrap())
            .collect();

        let config = &config;
        let parallel: Vec<AnalysisReport> = std::thread::scope(|scope| {
            let handles: Vec<_> = inputs
                .iter()
                .map(|input| scope.spawn(move || analyze(input, config).unwrap()))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        assert_eq!(serial, parallel);
    }

    #[test]
    fn no_previous_and_no_benchmark_gives_empty_scorecard() {
        let mut input = input();
        input.previous = None;
        let report = analyze(&input, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.benchmark_source, BenchmarkSource::None);
        assert!(report.scorecard.rows.is_empty());
        assert!(report.impacts.is_empty());
        assert!(report.comparison.is_none());
    }
}
