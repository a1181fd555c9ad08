use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::domain::config::ConfigOverrides;

#[derive(Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Analysis report only
    Yaml,
    /// Inputs, settings and report in one record
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find the bottleneck of a scenario and simulate fixing each lever
    Analyze {
        /// Scenario YAML file
        #[arg(short, long)]
        input: String,
        /// Output file for the analysis record
        #[arg(short, long)]
        output: String,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
        /// Analysis window in days, overrides the scenario file
        #[arg(short, long)]
        window_days: Option<f64>,
        /// GP30/CAC below which cash counts as constrained
        #[arg(short = 't', long)]
        cash_threshold: Option<f64>,
    },
    /// Plot weekly capacity by stage into a PNG chart
    PlotCapacity {
        /// Scenario YAML file
        #[arg(short, long)]
        input: String,
        /// Output PNG file
        #[arg(short, long)]
        output: String,
        /// Analysis window in days, overrides the scenario file
        #[arg(short, long)]
        window_days: Option<f64>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn overrides(window_days: Option<f64>, cash_threshold: Option<f64>) -> ConfigOverrides {
    ConfigOverrides {
        window_days,
        cash_efficiency_threshold: cash_threshold,
    }
}
