use plotters::prelude::*;
use thiserror::Error;

use crate::domain::config::ConfigOverrides;
use crate::services::constraint_solver::{ConstraintLabel, DELIVERY_LABEL};
use crate::services::evaluation::{evaluate, AnalysisError, Evaluation};
use crate::services::scenario_yaml::{load_scenario_file, ScenarioFileError};

#[derive(Error, Debug)]
pub enum CapacityPlotError {
    #[error("failed to load scenario: {0}")]
    LoadScenario(#[from] ScenarioFileError),
    #[error("failed to analyze scenario: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("failed to render capacity plot: {0}")]
    Plot(String),
}

// Bars above this are drawn clipped and do not stretch the axis.
const AXIS_CEILING: f64 = 1e12;

struct Bar {
    label: String,
    value: f64,
    binding: bool,
}

pub fn plot_capacity_from_scenario_file(
    input_path: &str,
    output_path: &str,
    overrides: &ConfigOverrides,
) -> Result<(), CapacityPlotError> {
    let bundle = load_scenario_file(input_path, overrides)?;
    let evaluation = evaluate(&bundle.input.current, &bundle.config)?;
    render_capacity_png(output_path, &evaluation)
}

fn bars(evaluation: &Evaluation) -> Vec<Bar> {
    let mut bars: Vec<Bar> = evaluation
        .stages
        .iter()
        .map(|stage| Bar {
            label: stage.name.clone(),
            value: stage.limit_per_week,
            binding: matches!(
                &evaluation.constraint,
                ConstraintLabel::Stage { index, .. } if *index == stage.index
            ),
        })
        .collect();
    if let Some(capacity) = evaluation.delivery_capacity_per_week {
        bars.push(Bar {
            label: DELIVERY_LABEL.to_string(),
            value: capacity,
            binding: evaluation.constraint == ConstraintLabel::Delivery,
        });
    }
    bars
}

fn axis_max(bars: &[Bar]) -> f64 {
    let max_value = bars
        .iter()
        .map(|bar| bar.value)
        .filter(|value| value.is_finite() && *value < AXIS_CEILING)
        .fold(0.0_f64, f64::max);
    if max_value > 0.0 { max_value * 1.1 } else { 1.0 }
}

/// Weekly limit per stage, with the binding constraint drawn in red.
pub fn render_capacity_png(
    output_path: &str,
    evaluation: &Evaluation,
) -> Result<(), CapacityPlotError> {
    let bars = bars(evaluation);
    let max_y = axis_max(&bars);
    let max_x = bars.len().max(1) as i32;

    let root = BitMapBackend::new(output_path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| CapacityPlotError::Plot(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Weekly Capacity by Stage", ("sans-serif", 30))
        .x_label_area_size(55)
        .y_label_area_size(75)
        .build_cartesian_2d(0..max_x, 0.0..max_y)
        .map_err(|e| CapacityPlotError::Plot(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Stage")
        .y_desc("Units per week")
        .label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 22))
        .x_labels(bars.len().max(1))
        .x_label_formatter(&|index| {
            if *index < 0 {
                return String::new();
            }
            bars.get(*index as usize)
                .map(|bar| bar.label.clone())
                .unwrap_or_default()
        })
        .draw()
        .map_err(|e| CapacityPlotError::Plot(e.to_string()))?;

    let normal = RGBColor(30, 122, 204);
    let binding = RGBColor(204, 51, 51);
    chart
        .draw_series(bars.iter().enumerate().map(|(idx, bar)| {
            let color = if bar.binding { binding } else { normal };
            Rectangle::new(
                [(idx as i32, 0.0), (idx as i32 + 1, bar.value.min(max_y))],
                ShapeStyle::from(&color).filled().stroke_width(1),
            )
        }))
        .map_err(|e| CapacityPlotError::Plot(e.to_string()))?;

    root.present()
        .map_err(|e| CapacityPlotError::Plot(e.to_string()))?;
    Ok(())
}
