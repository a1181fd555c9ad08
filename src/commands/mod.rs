pub mod analyze_cmd;
pub mod base_commands;
pub mod plot_capacity_cmd;
pub mod report_format;
