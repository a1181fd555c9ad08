use serde::Serialize;

pub const DEFAULT_UTILIZATION: f64 = 0.85;
pub const DEFAULT_YIELD: f64 = 1.0;

/// One step of the pipeline with its own resourcing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stage {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub owner: String,
    pub fte: f64,
    pub focus_hours_per_week: f64,
    pub utilization: f64,
    pub standard_rate_per_hour: f64,
    #[serde(rename = "yield")]
    pub yield_rate: f64,
}

impl Stage {
    /// An unstaffed stage with default utilization and yield.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            unit: String::new(),
            owner: String::new(),
            fte: 0.0,
            focus_hours_per_week: 0.0,
            utilization: DEFAULT_UTILIZATION,
            standard_rate_per_hour: 0.0,
            yield_rate: DEFAULT_YIELD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacklogItem {
    pub stage_id: String,
    pub queued_units: f64,
}
