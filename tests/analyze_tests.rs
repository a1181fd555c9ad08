use assert_fs::prelude::*;
use predicates::prelude::*;
use std::fs;
use tokio::task;

const SCENARIO: &str = r#"
settings:
  window_days: 90
current:
  name: Demo
  stages:
    - { id: proposal, name: Proposal, fte: 1, focus_hours_per_week: 10, utilization: 1, standard_rate_per_hour: 4 }
    - { id: won, name: Won, fte: 1, focus_hours_per_week: 10, utilization: 1, standard_rate_per_hour: 10 }
  funnel:
    rates: [0.25]
  commercial:
    average_selling_price: 1000
    gross_margin: 0.8
    sales_cycle_days: 14
  delivery:
    capacity_per_week: 8
  cash: { cac: 2000 }
  headcount: 10
benchmark:
  conversion_rates: [0.5]
  average_selling_price: 1200
"#;

fn demo_path() -> String {
    format!("{}/demos/cargo_like.yaml", env!("CARGO_MANIFEST_DIR"))
}

#[tokio::test]
async fn analyze_writes_yaml_report_and_summary() {
    let input_file = assert_fs::NamedTempFile::new("scenario.yaml").unwrap();
    input_file.write_str(SCENARIO).unwrap();
    let output_file = assert_fs::NamedTempFile::new("report.yaml").unwrap();

    let input_arg = input_file.path().to_str().unwrap().to_string();
    let output_arg = output_file.path().to_str().unwrap().to_string();
    let output_path = output_arg.clone();

    task::spawn_blocking(move || {
        let mut cmd = assert_cmd::cargo_bin_cmd!("bottleneck");
        cmd.args(["analyze", "-i", &input_arg, "-o", &output_arg]);

        cmd.assert()
            .success()
            .stdout(predicate::str::contains("Constraint: Delivery"))
            .stdout(predicate::str::contains("System flow: 8.00 /wk"))
            .stdout(predicate::str::contains("Top recommendation: Average selling price"))
            .stdout(predicate::str::contains("Analysis written to"));
    })
    .await
    .unwrap();

    let report: serde_yaml::Value = serde_yaml::from_str(&fs::read_to_string(output_path).unwrap()).unwrap();
    assert_eq!(report["current"]["constraint"]["kind"], "delivery");
    assert_eq!(report["current"]["system_flow_per_week"].as_f64(), Some(8.0));
    assert_eq!(report["benchmark_source"], "explicit");
    assert_eq!(
        report["top_recommendation"]["lever"]["lever"],
        "average_selling_price"
    );
}

#[test]
fn analyze_json_export_carries_inputs_and_config() {
    let output_file = assert_fs::NamedTempFile::new("report.json").unwrap();
    let output_arg = output_file.path().to_str().unwrap().to_string();

    let mut cmd = assert_cmd::cargo_bin_cmd!("bottleneck");
    cmd.args([
        "analyze",
        "-i",
        &demo_path(),
        "-o",
        &output_arg,
        "--format",
        "json",
        "--window-days",
        "30",
    ]);
    cmd.assert().success();

    let export: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output_arg).unwrap()).unwrap();
    assert_eq!(export["config"]["window_days"], 30.0);
    assert_eq!(export["input"]["current"]["window_days"], 30.0);
    assert_eq!(export["report"]["current"]["window_days"], 30.0);
    assert_eq!(export["input"]["current"]["name"], "Cargo-like Q3");
    assert_eq!(export["input"]["previous"]["name"], "Cargo-like Q2");
    assert!(export["report"]["comparison"]["rows"].is_array());
    assert!(export["report"]["impacts"].as_array().unwrap().len() > 0);
}

#[test]
fn analyze_reports_invalid_scenario() {
    let input_file = assert_fs::NamedTempFile::new("bad.yaml").unwrap();
    input_file
        .write_str(&SCENARIO.replace("rates: [0.25]", "rates: [1.25]"))
        .unwrap();
    let output_file = assert_fs::NamedTempFile::new("report.yaml").unwrap();

    let mut cmd = assert_cmd::cargo_bin_cmd!("bottleneck");
    cmd.args([
        "analyze",
        "-i",
        input_file.path().to_str().unwrap(),
        "-o",
        output_file.path().to_str().unwrap(),
    ]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load scenario"))
        .stderr(predicate::str::contains("funnel.rates must be between 0 and 1"));
    output_file.assert(predicate::path::missing());
}
