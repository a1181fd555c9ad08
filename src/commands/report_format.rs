use crate::domain::numeric::Bounded;
use crate::services::analysis_types::{AnalysisReport, BenchmarkSource};
use crate::services::benchmark_scorer::Attainment;
use crate::services::constraint_solver::RequiredVolume;

const UNBOUNDED: &str = "∞";
const MISSING: &str = "—";

pub fn format_analysis_report(report: &AnalysisReport) -> String {
    let current = &report.current;
    let economics = &current.economics;

    let mut lines = Vec::new();
    lines.push("Bottleneck Report".to_string());
    lines.push(format!("Scenario: {}", current.scenario));
    lines.push(format!(
        "Window: {:.0} days ({:.2} weeks)",
        current.window_days, current.weeks_in_window
    ));
    lines.push(format!("Constraint: {}", current.constraint));
    lines.push(format!("System flow: {:.2} /wk", current.system_flow_per_week));
    lines.push(format!("Demand flow: {:.2} /wk", current.demand_flow_per_week));
    lines.push(format!(
        "Delivery capacity: {}",
        current
            .delivery_capacity_per_week
            .map(|value| format!("{value:.2} /wk"))
            .unwrap_or_else(|| "unconstrained".to_string())
    ));
    lines.push(String::new());

    lines.push("Stages:".to_string());
    lines.push("Stage | Capacity/wk | Limit/wk | Downstream | Won/wk | Backlog wks | Input for delivery".to_string());
    lines.push("------|-------------|----------|------------|--------|-------------|-------------------".to_string());
    for stage in &current.stages {
        lines.push(format!(
            "{} | {:.2} | {:.2} | {:.4} | {:.2} | {} | {}",
            stage.name,
            stage.capacity_per_week,
            stage.limit_per_week,
            stage.downstream_product,
            stage.terminal_flow_per_week,
            format_bounded(stage.weeks_of_backlog),
            format_required(stage.required_input_for_delivery),
        ));
    }
    lines.push(String::new());

    lines.push("Economics:".to_string());
    lines.push(format!("Units in window: {:.2}", economics.units_window));
    lines.push(format!("Revenue in window: {:.2}", economics.revenue_window));
    lines.push(format!("Gross profit in window: {:.2}", economics.gross_profit_window));
    lines.push(format!(
        "Gross profit per headcount: {:.2}",
        economics.revenue_per_headcount_ceiling
    ));
    lines.push(format!(
        "Cash efficiency (GP30/CAC): {}{}",
        format_bounded(economics.cash_efficiency_ratio),
        if economics.cash_constrained {
            " (cash constrained)"
        } else {
            ""
        }
    ));
    lines.push(format!(
        "Sales velocity: {:.2} /wk",
        economics.sales_velocity_per_week
    ));
    lines.push(format!("LTV : CAC: {}", format_bounded(economics.ltv_to_cac)));
    lines.push(format!(
        "CAC payback: {} months",
        format_bounded(economics.payback_months)
    ));

    if !report.scorecard.rows.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Scorecard (targets from {}):",
            match report.benchmark_source {
                BenchmarkSource::Explicit => "benchmark",
                BenchmarkSource::Previous => "previous scenario",
                BenchmarkSource::None => "none",
            }
        ));
        lines.push("Metric | Current | Target | Attainment | Status".to_string());
        lines.push("-------|---------|--------|------------|-------".to_string());
        for row in &report.scorecard.rows {
            lines.push(format!(
                "{} | {:.2} | {:.2} | {} | {}",
                row.label,
                row.current,
                row.target,
                format_attainment(row.attainment),
                row.status
            ));
        }
        if let Some(best) = &report.scorecard.best_metric {
            lines.push(format!("Best metric: {best}"));
        }
    }

    if !report.impacts.is_empty() {
        lines.push(String::new());
        lines.push("Impact of restoring each lever:".to_string());
        lines.push("Lever | Flow delta/wk | Gross profit delta".to_string());
        lines.push("------|---------------|-------------------".to_string());
        for impact in &report.impacts {
            lines.push(format!(
                "{} | {:+.2} | {:+.2}",
                impact.label,
                impact.flow_delta_per_week,
                impact.gross_profit_delta()
            ));
        }
    }
    lines.push(format!(
        "Top recommendation: {}",
        report
            .top_recommendation
            .as_ref()
            .map(|impact| impact.label.as_str())
            .unwrap_or(MISSING)
    ));

    if let Some(comparison) = &report.comparison {
        lines.push(String::new());
        lines.push(format!("Compared with {}:", comparison.previous.scenario));
        if comparison.constraint_changed {
            lines.push(format!(
                "Constraint moved from {} to {}",
                comparison.previous.constraint, current.constraint
            ));
        }
        for row in &comparison.rows {
            lines.push(format!(
                "{}: {}",
                row.label,
                row.delta_pct
                    .map(|delta| format!("{:+.1}%", delta * 100.0))
                    .unwrap_or_else(|| MISSING.to_string())
            ));
        }
    }

    lines.join("\n")
}

fn format_bounded(value: Bounded) -> String {
    match value {
        Bounded::Finite(value) => format!("{value:.2}"),
        Bounded::Unbounded => UNBOUNDED.to_string(),
    }
}

fn format_attainment(value: Attainment) -> String {
    match value {
        Attainment::Ratio(ratio) => format!("{:.1}%", ratio * 100.0),
        Attainment::NotComparable => MISSING.to_string(),
    }
}

fn format_required(value: Option<RequiredVolume>) -> String {
    match value {
        Some(RequiredVolume::PerWeek(volume)) => format!("{volume:.2}"),
        Some(RequiredVolume::Unreachable) => UNBOUNDED.to_string(),
        None => MISSING.to_string(),
    }
}
