//! CLI tests for the wl binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn wl() -> Command {
    Command::cargo_bin("wl").expect("wl binary should build")
}

#[test]
fn test_status_of_waiting_rank() {
    wl().args(["status-of", "--rank", "4", "--window", "2"])
        .assert()
        .success()
        .stdout(predicate::str::diff("3\n"));
}

#[test]
fn test_status_of_admitted_rank() {
    wl().args(["status-of", "--rank", "2", "--window", "2"])
        .assert()
        .success()
        .stdout(predicate::str::diff("1\n"));
}

#[test]
fn test_simulate_text() {
    wl().args([
        "simulate",
        "--participants",
        "3",
        "--window",
        "0",
        "--ticks",
        "1",
        "--interval-ms",
        "10",
    ])
    .env("NO_COLOR", "1")
    .assert()
    .success()
    .stdout(predicate::str::contains("3 participants, admission window 0"))
    .stdout(predicate::str::contains("admitted"))
    .stdout(predicate::str::contains("waiting (2)"));
}

#[test]
fn test_simulate_json() {
    let output = wl()
        .args(["simulate", "-n", "2", "--ticks", "1", "--interval-ms", "10", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rounds: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rounds.as_array().map(Vec::len), Some(1));
    assert_eq!(rounds[0]["report"]["live"], 2);
}

#[test]
fn test_config_file_sets_window() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("waitline.yml");
    std::fs::write(&path, "queue:\n  admission-window: 0\n  recalibrator:\n    tick-interval-ms: 10\n").unwrap();

    wl().args(["--config", path.to_str().unwrap(), "simulate", "-n", "2", "--ticks", "1"])
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("admission window 0"))
        .stdout(predicate::str::contains("waiting (2)"));
}

#[test]
fn test_missing_config_fails() {
    wl().args(["--config", "/nonexistent/waitline.yml", "status-of", "-r", "0", "-w", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
