use std::process::ExitCode;

use tracing::{error, info};

use crate::commands::base_commands::{overrides, Commands, OutputFormat};
use crate::commands::report_format::format_analysis_report;
use crate::services::analysis::analyze;
use crate::services::analysis_types::AnalysisExport;
use crate::services::scenario_yaml::load_scenario_file;

pub fn analyze_command(cmd: Commands) -> ExitCode {
    if let Commands::Analyze {
        input,
        output,
        format,
        window_days,
        cash_threshold,
    } = cmd
    {
        let bundle = match load_scenario_file(&input, &overrides(window_days, cash_threshold)) {
            Ok(bundle) => bundle,
            Err(e) => {
                error!(path = %input, "scenario file rejected");
                eprintln!("Failed to load scenario: {e}");
                return ExitCode::FAILURE;
            }
        };

        let report = match analyze(&bundle.input, &bundle.config) {
            Ok(report) => report,
            Err(e) => {
                eprintln!("Failed to analyze scenario: {e}");
                return ExitCode::FAILURE;
            }
        };

        let contents = match format {
            OutputFormat::Yaml => serde_yaml::to_string(&report).map_err(|e| e.to_string()),
            OutputFormat::Json => serde_json::to_string_pretty(&AnalysisExport {
                config: &bundle.config,
                input: &bundle.input,
                report: &report,
            })
            .map_err(|e| e.to_string()),
        };
        let contents = match contents {
            Ok(contents) => contents,
            Err(e) => {
                eprintln!("Failed to serialize analysis output: {e}");
                return ExitCode::FAILURE;
            }
        };

        if let Err(e) = std::fs::write(&output, contents) {
            eprintln!("Failed to write analysis output: {e}");
            return ExitCode::FAILURE;
        }

        println!("{}", format_analysis_report(&report));
        println!();
        println!("Analysis written to {output}");
        info!(path = %output, ?format, "analysis written");
    }
    ExitCode::SUCCESS
}
