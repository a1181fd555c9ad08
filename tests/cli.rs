use assert_cmd::prelude::*;
use predicates::prelude::*;

#[test]
fn test_cli_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = assert_cmd::cargo_bin_cmd!("bottleneck");
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("plot-capacity"));
    Ok(())
}

#[test]
fn analyze_requires_input_and_output() {
    let mut cmd = assert_cmd::cargo_bin_cmd!("bottleneck");
    cmd.arg("analyze");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--input"));
}
