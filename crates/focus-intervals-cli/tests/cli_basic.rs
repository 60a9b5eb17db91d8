//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory
//! and checks the JSON it prints.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_focus-intervals"))
        .args(args)
        .env("FOCUS_INTERVALS_DATA_DIR", data_dir)
        .env_remove("FOCUS_INTERVALS_LOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("{args:?} printed non-JSON ({e}): {stdout}"))
}

fn statuses(report: &Value) -> Vec<String> {
    report["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["status"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_fresh_status() {
    let dir = tempfile::tempdir().unwrap();
    let report = run_json(dir.path(), &["timer", "status"]);

    assert_eq!(statuses(&report), vec!["pending"; 8]);
    assert_eq!(report["first_active_index"], 0);
    assert!(report["running_index"].is_null());
    assert_eq!(report["rows"][0]["remaining"], "45:00");
    assert_eq!(report["rows"][0]["current"], true);
}

#[test]
fn test_start_then_status() {
    let dir = tempfile::tempdir().unwrap();
    let started = run_json(dir.path(), &["timer", "start", "1"]);
    assert_eq!(started["event"]["type"], "SlotStarted");
    assert_eq!(started["status"]["running_index"], 0);

    let report = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(report["rows"][0]["status"], "running");
    assert_eq!(report["running_index"], 0);
}

#[test]
fn test_start_out_of_order_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_json(dir.path(), &["timer", "start", "3"]);
    assert!(output["event"].is_null());
    assert_eq!(statuses(&output["status"]), vec!["pending"; 8]);
}

#[test]
fn test_stop_pauses_running_interval() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["timer", "start", "1"]);

    let stopped = run_json(dir.path(), &["timer", "stop"]);
    assert_eq!(stopped["event"]["type"], "SlotStopped");
    assert_eq!(stopped["status"]["rows"][0]["status"], "paused");

    let again = run_json(dir.path(), &["timer", "stop", "1"]);
    assert!(again["event"].is_null());
}

#[test]
fn test_reset_clears_progress() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["timer", "start", "1"]);

    let reset = run_json(dir.path(), &["timer", "reset"]);
    assert_eq!(reset["event"]["type"], "SessionReset");

    let report = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(statuses(&report), vec!["pending"; 8]);
    assert!(report["running_index"].is_null());
}

#[test]
fn test_rejects_slot_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["timer", "start", "9"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("9"), "{stderr}");
}

#[test]
fn test_status_table() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["timer", "status", "--table"]);
    assert_eq!(code, 0);
    assert!(stdout.lines().next().unwrap().starts_with("> #1"));
    assert!(stdout.contains("0/8 done"));
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "persistence.throttle_ms"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "1000");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "persistence.throttle_ms", "250"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "persistence.throttle_ms"]);
    assert_eq!(stdout.trim(), "250");

    let (code, _, stderr) = run_cli(dir.path(), &["config", "get", "theme"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown config key"), "{stderr}");
}

#[test]
fn test_config_list_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["config", "set", "notifications.bell", "false"]);

    let listed = run_json(dir.path(), &["config", "list"]);
    assert_eq!(listed["notifications"]["bell"], false);

    let (code, _, _) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let listed = run_json(dir.path(), &["config", "list"]);
    assert_eq!(listed["notifications"]["bell"], true);
}
