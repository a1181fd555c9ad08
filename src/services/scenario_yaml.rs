use std::collections::{BTreeSet, HashSet};
use std::io;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::benchmark::Benchmark;
use crate::domain::config::{AnalysisConfig, ConfigOverrides};
use crate::domain::funnel::{ConversionRates, FunnelCounts};
use crate::domain::metric::MetricKind;
use crate::domain::scenario::{
    Cash, Commercial, Delivery, Headcount, HeadcountRow, Offer, Scenario,
};
use crate::domain::stage::{BacklogItem, Stage, DEFAULT_UTILIZATION, DEFAULT_YIELD};
use crate::services::analysis_types::AnalysisInput;

#[derive(Error, Debug)]
pub enum ScenarioFileError {
    #[error("failed to read scenario file: {0}")]
    Read(#[from] io::Error),
    #[error("failed to parse scenario yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("scenario '{0}' has no stages")]
    NoStages(String),
    #[error("scenario '{0}' needs funnel rates or counts")]
    MissingFunnel(String),
    #[error("scenario '{scenario}': expected {expected} funnel {kind}, found {found}")]
    FunnelLength {
        scenario: String,
        kind: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("scenario '{0}' needs an average selling price or an offer mix")]
    MissingCommercial(String),
    #[error("{field} must be between 0 and 1, found {value}")]
    OutOfRange { field: String, value: f64 },
    #[error("{field} must not be negative, found {value}")]
    Negative { field: String, value: f64 },
    #[error("window_days must be positive, found {0}")]
    InvalidWindow(f64),
    #[error("duplicate stage id: {0}")]
    DuplicateStage(String),
    #[error("backlog refers to unknown stage: {0}")]
    UnknownBacklogStage(String),
    #[error("benchmark has {found} conversion rates but the funnel has {expected}")]
    BenchmarkLength { expected: usize, found: usize },
}

/// Settings and inputs read from one scenario file.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioBundle {
    pub config: AnalysisConfig,
    pub input: AnalysisInput,
}

#[derive(Deserialize)]
struct ScenarioFileRecord {
    #[serde(default)]
    settings: SettingsRecord,
    current: ScenarioRecord,
    previous: Option<ScenarioRecord>,
    benchmark: Option<BenchmarkRecord>,
}

#[derive(Deserialize, Default)]
struct SettingsRecord {
    window_days: Option<f64>,
    cash_efficiency_threshold: Option<f64>,
    lower_is_better: Option<Vec<MetricKind>>,
}

#[derive(Deserialize)]
struct ScenarioRecord {
    name: Option<String>,
    window_days: Option<f64>,
    #[serde(default)]
    stages: Vec<StageRecord>,
    funnel: Option<FunnelRecord>,
    inbound_volume: Option<f64>,
    commercial: CommercialRecord,
    #[serde(default)]
    delivery: DeliveryRecord,
    #[serde(default)]
    cash: CashRecord,
    headcount: Option<HeadcountRecord>,
    #[serde(default)]
    backlog: Vec<BacklogRecord>,
    no_show_rate: Option<f64>,
}

#[derive(Deserialize)]
struct StageRecord {
    id: Option<String>,
    name: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    owner: String,
    #[serde(default)]
    fte: f64,
    #[serde(default)]
    focus_hours_per_week: f64,
    utilization: Option<f64>,
    #[serde(default)]
    standard_rate_per_hour: f64,
    #[serde(rename = "yield")]
    yield_rate: Option<f64>,
}

#[derive(Deserialize)]
struct FunnelRecord {
    rates: Option<Vec<f64>>,
    counts: Option<Vec<f64>>,
}

#[derive(Deserialize)]
struct CommercialRecord {
    average_selling_price: Option<f64>,
    gross_margin: Option<f64>,
    #[serde(default)]
    sales_cycle_days: f64,
    #[serde(default)]
    churn_monthly: f64,
    #[serde(default)]
    offers: Vec<OfferRecord>,
}

#[derive(Deserialize)]
struct OfferRecord {
    name: String,
    average_selling_price: f64,
    gross_margin: f64,
    share: f64,
}

#[derive(Deserialize, Default)]
struct DeliveryRecord {
    capacity_per_week: Option<f64>,
    onboarding_days: Option<f64>,
    #[serde(default)]
    stages: Vec<StageRecord>,
}

#[derive(Deserialize, Default)]
struct CashRecord {
    #[serde(default)]
    cac: f64,
    #[serde(default)]
    payback_days: f64,
    #[serde(default)]
    dso: f64,
    #[serde(default)]
    prepay_share: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HeadcountRecord {
    Total(f64),
    Roster(Vec<HeadcountRowRecord>),
}

#[derive(Deserialize)]
struct HeadcountRowRecord {
    role: String,
    #[serde(default)]
    fte: f64,
    #[serde(default)]
    contractors: f64,
}

#[derive(Deserialize)]
struct BacklogRecord {
    stage_id: String,
    queued_units: f64,
}

#[derive(Deserialize, Default)]
struct BenchmarkRecord {
    inbound_volume: Option<f64>,
    #[serde(default)]
    conversion_rates: Vec<Option<f64>>,
    average_selling_price: Option<f64>,
    sales_cycle_days: Option<f64>,
    gross_margin: Option<f64>,
    churn_monthly: Option<f64>,
    cac: Option<f64>,
    dso: Option<f64>,
    onboarding_days: Option<f64>,
    no_show_rate: Option<f64>,
}

pub fn load_scenario_file<P: AsRef<Path>>(
    path: P,
    overrides: &ConfigOverrides,
) -> Result<ScenarioBundle, ScenarioFileError> {
    let contents = std::fs::read_to_string(path)?;
    deserialize_scenario_bundle_from_yaml_str(&contents, overrides)
}

/// Parses and validates a scenario file.
///
/// Settings resolve as defaults, then the file's `settings`, then `overrides`.
pub fn deserialize_scenario_bundle_from_yaml_str(
    input: &str,
    overrides: &ConfigOverrides,
) -> Result<ScenarioBundle, ScenarioFileError> {
    let record: ScenarioFileRecord = serde_yaml::from_str(input)?;
    let config = overrides.apply(config_from_record(record.settings));

    let current = scenario_from_record(record.current, "Current", &config, overrides)?;
    let previous = record
        .previous
        .map(|previous| scenario_from_record(previous, "Previous", &config, overrides))
        .transpose()?;
    let benchmark = record
        .benchmark
        .map(|benchmark| benchmark_from_record(benchmark, current.conversion_rates.len()))
        .transpose()?;

    debug!(
        stages = current.stages.len(),
        has_previous = previous.is_some(),
        has_benchmark = benchmark.is_some(),
        "loaded scenario file"
    );

    Ok(ScenarioBundle {
        config,
        input: AnalysisInput {
            current,
            previous,
            benchmark,
        },
    })
}

fn config_from_record(record: SettingsRecord) -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    if let Some(window_days) = record.window_days {
        config.window_days = window_days;
    }
    if let Some(threshold) = record.cash_efficiency_threshold {
        config.cash_efficiency_threshold = threshold;
    }
    if let Some(metrics) = record.lower_is_better {
        config.lower_is_better = metrics.into_iter().collect::<BTreeSet<_>>();
    }
    config
}

fn scenario_from_record(
    record: ScenarioRecord,
    default_name: &str,
    config: &AnalysisConfig,
    overrides: &ConfigOverrides,
) -> Result<Scenario, ScenarioFileError> {
    let name = record.name.unwrap_or_else(|| default_name.to_string());

    let window_days = overrides
        .window_days
        .or(record.window_days)
        .unwrap_or(config.window_days);
    if !(window_days.is_finite() && window_days > 0.0) {
        return Err(ScenarioFileError::InvalidWindow(window_days));
    }

    if record.stages.is_empty() {
        return Err(ScenarioFileError::NoStages(name));
    }
    let stages = stages_from_records(record.stages, "s")?;
    let delivery_stages = stages_from_records(record.delivery.stages, "d")?;

    let mut seen: HashSet<String> = HashSet::new();
    for stage in stages.iter().chain(&delivery_stages) {
        if !seen.insert(stage.id.clone()) {
            return Err(ScenarioFileError::DuplicateStage(stage.id.clone()));
        }
    }

    let funnel = record
        .funnel
        .ok_or_else(|| ScenarioFileError::MissingFunnel(name.clone()))?;
    let conversion_rates = funnel_from_record(funnel, &name, stages.len())?;
    let inbound_volume = optional_non_negative("inbound_volume", record.inbound_volume)?;

    let commercial = commercial_from_record(record.commercial, &name)?;

    if let Some(capacity) = record.delivery.capacity_per_week {
        non_negative("delivery.capacity_per_week", capacity)?;
    }
    if let Some(days) = record.delivery.onboarding_days {
        non_negative("delivery.onboarding_days", days)?;
    }
    let delivery = Delivery {
        capacity_per_week: record.delivery.capacity_per_week,
        onboarding_days: record.delivery.onboarding_days,
        stages: delivery_stages,
    };

    let cash = Cash {
        cac: non_negative("cash.cac", record.cash.cac)?,
        payback_days: non_negative("cash.payback_days", record.cash.payback_days)?,
        dso: non_negative("cash.dso", record.cash.dso)?,
        prepay_share: fraction("cash.prepay_share", record.cash.prepay_share)?,
    };

    let headcount = match record.headcount {
        None => Headcount::default(),
        Some(HeadcountRecord::Total(total)) => {
            Headcount::from_total(non_negative("headcount", total)?)
        }
        Some(HeadcountRecord::Roster(rows)) => Headcount::from_roster(
            rows.into_iter()
                .map(|row| {
                    Ok(HeadcountRow {
                        fte: non_negative("headcount.fte", row.fte)?,
                        contractors: non_negative("headcount.contractors", row.contractors)?,
                        role: row.role,
                    })
                })
                .collect::<Result<Vec<_>, ScenarioFileError>>()?,
        ),
    };

    let backlog = record
        .backlog
        .into_iter()
        .map(|item| {
            if !seen.contains(&item.stage_id) {
                return Err(ScenarioFileError::UnknownBacklogStage(item.stage_id));
            }
            Ok(BacklogItem {
                queued_units: non_negative("backlog.queued_units", item.queued_units)?,
                stage_id: item.stage_id,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let no_show_rate = record
        .no_show_rate
        .map(|rate| fraction("no_show_rate", rate))
        .transpose()?;

    Ok(Scenario {
        name,
        window_days,
        stages,
        conversion_rates,
        inbound_volume,
        commercial,
        delivery,
        cash,
        headcount,
        backlog,
        no_show_rate,
    })
}

fn stages_from_records(
    records: Vec<StageRecord>,
    id_prefix: &str,
) -> Result<Vec<Stage>, ScenarioFileError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let id = record
                .id
                .unwrap_or_else(|| format!("{id_prefix}{}", index + 1));
            let mut stage = Stage::new(&id, &record.name);
            stage.unit = record.unit;
            stage.owner = record.owner;
            stage.fte = non_negative("stage.fte", record.fte)?;
            stage.focus_hours_per_week =
                non_negative("stage.focus_hours_per_week", record.focus_hours_per_week)?;
            stage.utilization = fraction(
                "stage.utilization",
                record.utilization.unwrap_or(DEFAULT_UTILIZATION),
            )?;
            stage.standard_rate_per_hour =
                non_negative("stage.standard_rate_per_hour", record.standard_rate_per_hour)?;
            stage.yield_rate = fraction("stage.yield", record.yield_rate.unwrap_or(DEFAULT_YIELD))?;
            Ok(stage)
        })
        .collect()
}

/// Counts only define the conversion rates; they never cap stage capacity.
fn funnel_from_record(
    record: FunnelRecord,
    scenario: &str,
    stage_count: usize,
) -> Result<ConversionRates, ScenarioFileError> {
    match (record.rates, record.counts) {
        (Some(rates), _) => {
            let expected = stage_count - 1;
            if rates.len() != expected {
                return Err(ScenarioFileError::FunnelLength {
                    scenario: scenario.to_string(),
                    kind: "rates",
                    expected,
                    found: rates.len(),
                });
            }
            for rate in &rates {
                fraction("funnel.rates", *rate)?;
            }
            Ok(ConversionRates(rates))
        }
        (None, Some(counts)) => {
            if counts.len() != stage_count {
                return Err(ScenarioFileError::FunnelLength {
                    scenario: scenario.to_string(),
                    kind: "counts",
                    expected: stage_count,
                    found: counts.len(),
                });
            }
            for count in &counts {
                non_negative("funnel.counts", *count)?;
            }
            let rates = FunnelCounts(counts).to_rates();
            for rate in &rates.0 {
                fraction("funnel.counts conversion", *rate)?;
            }
            Ok(rates)
        }
        (None, None) => Err(ScenarioFileError::MissingFunnel(scenario.to_string())),
    }
}

fn commercial_from_record(
    record: CommercialRecord,
    scenario: &str,
) -> Result<Commercial, ScenarioFileError> {
    let sales_cycle_days = non_negative("commercial.sales_cycle_days", record.sales_cycle_days)?;
    let churn_monthly = fraction("commercial.churn_monthly", record.churn_monthly)?;

    if !record.offers.is_empty() {
        let offers = record
            .offers
            .into_iter()
            .map(|offer| {
                Ok(Offer {
                    average_selling_price: non_negative(
                        "offer.average_selling_price",
                        offer.average_selling_price,
                    )?,
                    gross_margin: fraction("offer.gross_margin", offer.gross_margin)?,
                    share: fraction("offer.share", offer.share)?,
                    name: offer.name,
                })
            })
            .collect::<Result<Vec<_>, ScenarioFileError>>()?;
        return Ok(Commercial::from_offers(offers, sales_cycle_days, churn_monthly));
    }

    let price = record
        .average_selling_price
        .ok_or_else(|| ScenarioFileError::MissingCommercial(scenario.to_string()))?;
    let mut commercial = Commercial::new(
        non_negative("commercial.average_selling_price", price)?,
        fraction("commercial.gross_margin", record.gross_margin.unwrap_or(1.0))?,
        sales_cycle_days,
    );
    commercial.churn_monthly = churn_monthly;
    Ok(commercial)
}

fn benchmark_from_record(
    record: BenchmarkRecord,
    rate_count: usize,
) -> Result<Benchmark, ScenarioFileError> {
    if record.conversion_rates.len() > rate_count {
        return Err(ScenarioFileError::BenchmarkLength {
            expected: rate_count,
            found: record.conversion_rates.len(),
        });
    }
    for rate in record.conversion_rates.iter().flatten() {
        fraction("benchmark.conversion_rates", *rate)?;
    }

    Ok(Benchmark {
        inbound_volume: optional_non_negative("benchmark.inbound_volume", record.inbound_volume)?,
        conversion_rates: record.conversion_rates,
        average_selling_price: optional_non_negative(
            "benchmark.average_selling_price",
            record.average_selling_price,
        )?,
        sales_cycle_days: optional_non_negative(
            "benchmark.sales_cycle_days",
            record.sales_cycle_days,
        )?,
        gross_margin: record
            .gross_margin
            .map(|value| fraction("benchmark.gross_margin", value))
            .transpose()?,
        churn_monthly: record
            .churn_monthly
            .map(|value| fraction("benchmark.churn_monthly", value))
            .transpose()?,
        cac: optional_non_negative("benchmark.cac", record.cac)?,
        dso: optional_non_negative("benchmark.dso", record.dso)?,
        onboarding_days: optional_non_negative("benchmark.onboarding_days", record.onboarding_days)?,
        no_show_rate: record
            .no_show_rate
            .map(|value| fraction("benchmark.no_show_rate", value))
            .transpose()?,
    })
}

fn fraction(field: &str, value: f64) -> Result<f64, ScenarioFileError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ScenarioFileError::OutOfRange {
            field: field.to_string(),
            value,
        })
    }
}

fn non_negative(field: &str, value: f64) -> Result<f64, ScenarioFileError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ScenarioFileError::Negative {
            field: field.to_string(),
            value,
        })
    }
}

fn optional_non_negative(field: &str, value: Option<f64>) -> Result<Option<f64>, ScenarioFileError> {
    value.map(|value| non_negative(field, value)).transpose()
}
