use std::io;
use std::process::ExitCode;

use bottleneck::commands::analyze_cmd::analyze_command;
use bottleneck::commands::base_commands::{CliArgs, Commands};
use bottleneck::commands::plot_capacity_cmd::plot_capacity_command;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let args = CliArgs::parse();
    match args.command {
        cmd @ Commands::Analyze { .. } => analyze_command(cmd),
        cmd @ Commands::PlotCapacity { .. } => plot_capacity_command(cmd),
        Commands::Completions { shell } => {
            let mut command = CliArgs::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut io::stdout());
            ExitCode::SUCCESS
        }
    }
}
