pub mod benchmark;
pub mod config;
pub mod funnel;
pub mod lever;
pub mod metric;
pub mod numeric;
pub mod scenario;
pub mod stage;
