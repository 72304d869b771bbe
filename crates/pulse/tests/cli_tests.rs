//! End-to-end tests for the stats, forecast and efficiency commands.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

const ITEMS: &str = r#"[
  {"id": 1, "title": "Login crash", "status": "closed", "labels": ["bug", "auth"],
   "created_at": "2024-01-05T10:00:00Z", "closed_at": "2024-01-08T10:00:00Z"},
  {"id": 2, "title": "Dark mode", "status": "open", "labels": ["feature", "ui"],
   "created_at": "2024-01-20T09:00:00Z"},
  {"id": 3, "title": "Slow search", "status": "in_progress", "labels": ["bug", "perf"],
   "created_at": "2024-02-02T12:00:00Z"},
  {"id": 4, "title": "Typo in docs", "status": "closed", "labels": ["docs"],
   "created_at": "2024-02-10T08:00:00Z", "closed_at": "2024-03-01T08:00:00Z"}
]"#;

/// Temp dir holding an items file; also used as the working directory so no
/// stray pulse.toml is picked up
fn setup_items(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("items.json");
    std::fs::write(&path, contents).unwrap();
    (temp_dir, path)
}

fn pulse(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pulse"));
    cmd.current_dir(temp_dir.path()).env_remove("PULSE_CONFIG");
    cmd
}

#[test]
fn test_stats_text_output() {
    let (temp_dir, items) = setup_items(ITEMS);

    pulse(&temp_dir)
        .arg("stats")
        .arg(&items)
        .assert()
        .success()
        .stdout(predicate::str::contains("Items: 4 total, 2 open, 2 closed"))
        .stdout(predicate::str::contains("Average resolution: 12 days"))
        .stdout(predicate::str::contains("bug"));
}

#[test]
fn test_stats_json_envelope() {
    let (temp_dir, items) = setup_items(ITEMS);

    let output = pulse(&temp_dir)
        .arg("stats")
        .arg(&items)
        .arg("--json")
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["metadata"]["command"], "stats");

    let data = &json["data"];
    assert_eq!(data["total"], 4);
    assert_eq!(data["open"], 2);
    assert_eq!(data["closed"], 2);
    assert_eq!(data["monthly_trends"].as_array().unwrap().len(), 12);
    assert_eq!(data["monthly_trends"][0]["created"], 2);
    assert_eq!(data["monthly_trends"][0]["resolved"], 1);
    assert_eq!(data["monthly_trends"][2]["resolved"], 1);
    assert_eq!(data["label_stats"][0]["name"], "bug");
    assert_eq!(data["label_stats"][0]["count"], 2);
    assert_eq!(data["label_stats"][0]["avg_resolution_days"], 3.0);
}

#[test]
fn test_stats_reads_stdin() {
    let (temp_dir, _) = setup_items(ITEMS);

    pulse(&temp_dir)
        .args(["stats", "-"])
        .write_stdin(ITEMS)
        .assert()
        .success()
        .stdout(predicate::str::contains("Items: 4 total"));
}

#[test]
fn test_stats_accepts_envelope_document() {
    let (temp_dir, items) = setup_items(&format!(r#"{{"items": {}}}"#, ITEMS));

    pulse(&temp_dir)
        .arg("stats")
        .arg(&items)
        .assert()
        .success()
        .stdout(predicate::str::contains("Items: 4 total"));
}

#[test]
fn test_stats_top_limits_labels() {
    let (temp_dir, items) = setup_items(ITEMS);

    pulse(&temp_dir)
        .arg("stats")
        .arg(&items)
        .args(["--top", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("... 5 more"));
}

#[test]
fn test_forecast_json_has_fifteen_points() {
    let (temp_dir, items) = setup_items(ITEMS);

    let output = pulse(&temp_dir)
        .arg("forecast")
        .arg(&items)
        .arg("--json")
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let points = json["data"]["points"].as_array().unwrap();
    assert_eq!(points.len(), 15);
    assert_eq!(points[0]["kind"], "historical");
    assert_eq!(points[0]["name"], "Jan");
    assert_eq!(points[12]["kind"], "projected");
    assert_eq!(points[12]["name"], "Next 1");
    assert_eq!(points[14]["name"], "Next 3");
    assert_eq!(json["data"]["current_backlog"], 2);
    assert_eq!(json["data"]["efficiency"]["combined"], 1.0);
}

#[test]
fn test_forecast_text_and_quiet() {
    let (temp_dir, items) = setup_items(ITEMS);

    pulse(&temp_dir)
        .arg("forecast")
        .arg(&items)
        .assert()
        .success()
        .stdout(predicate::str::contains("scenario:"))
        .stdout(predicate::str::contains("Next 3"))
        .stdout(predicate::str::contains("over 3 periods"));

    pulse(&temp_dir)
        .arg("forecast")
        .arg(&items)
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("scenario:").not())
        .stdout(predicate::str::contains("Next 3"));
}

#[test]
fn test_forecast_accepts_negative_developer_change() {
    let (temp_dir, items) = setup_items(ITEMS);

    let output = pulse(&temp_dir)
        .arg("forecast")
        .arg(&items)
        .args(["--developer-change", "-2", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["data"]["scenario"]["developer_count_change"], -2);
    let headcount = json["data"]["efficiency"]["headcount"].as_f64().unwrap();
    assert!((headcount - 0.64).abs() < 1e-9);
}

#[test]
fn test_efficiency_baseline() {
    let temp_dir = TempDir::new().unwrap();

    pulse(&temp_dir)
        .arg("efficiency")
        .assert()
        .success()
        .stdout(predicate::str::contains("Efficiency: 1.000"));
}

#[test]
fn test_efficiency_json_scenario() {
    let temp_dir = TempDir::new().unwrap();

    let output = pulse(&temp_dir)
        .args(["efficiency", "--meeting-hours", "40", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let meeting = json["data"]["meeting"].as_f64().unwrap();
    assert!((meeting - 10.0 / 34.0).abs() < 1e-9);
}

#[test]
fn test_no_command_fails() {
    let temp_dir = TempDir::new().unwrap();

    pulse(&temp_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No command provided"));
}
