use std::process::ExitCode;

use crate::commands::base_commands::{overrides, Commands};
use crate::services::capacity_plot::plot_capacity_from_scenario_file;

pub fn plot_capacity_command(cmd: Commands) -> ExitCode {
    if let Commands::PlotCapacity {
        input,
        output,
        window_days,
    } = cmd
    {
        match plot_capacity_from_scenario_file(&input, &output, &overrides(window_days, None)) {
            Ok(()) => println!("Capacity chart written to {output}"),
            Err(e) => {
                eprintln!("Failed to plot capacity: {e}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
