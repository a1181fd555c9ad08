pub mod analysis;
pub mod analysis_types;
pub mod benchmark_scorer;
pub mod capacity;
pub mod capacity_plot;
pub mod constraint_solver;
pub mod conversion;
pub mod economics;
pub mod evaluation;
pub mod impact_simulator;
pub mod scenario_yaml;
