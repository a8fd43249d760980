//! The --json mode must emit one well-formed JSON object per stdout line.

use assert_cmd::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn write_config(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let toml = r#"
[stream]
sample_rate_hz = 100
display_rate_hz = 10
history_secs = 1
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

#[test]
fn run_json_lines_are_parseable() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir);

    let mut cmd = Command::cargo_bin("plate_cli").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("--json")
        .arg("run")
        .arg("--batches")
        .arg("5");

    let output = cmd.assert().success().get_output().clone();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();
    assert!(!lines.is_empty(), "expected at least one JSON line");

    let mut saw_telemetry = false;
    let mut saw_complete = false;
    for line in &lines {
        let v: serde_json::Value =
            serde_json::from_str(line).unwrap_or_else(|e| panic!("bad JSON line {line:?}: {e}"));
        if let Some(load) = v.get("left_load") {
            assert!(load.as_f64().is_some(), "left_load not a number: {line}");
            assert!(v.get("right_load").is_some());
            saw_telemetry = true;
        }
        if v.get("event").and_then(|e| e.as_str()) == Some("complete") {
            assert_eq!(v["batches_applied"].as_u64(), Some(5));
            saw_complete = true;
        }
    }
    assert!(saw_telemetry, "no telemetry line seen in: {stdout}");
    assert!(saw_complete, "no completion line seen in: {stdout}");
}

#[test]
fn json_error_is_structured() {
    let mut cmd = Command::cargo_bin("plate_cli").unwrap();
    cmd.arg("--config")
        .arg("/nonexistent/plate.toml")
        .arg("--json")
        .arg("self-check");

    let output = cmd.assert().code(2).get_output().clone();
    let stderr = String::from_utf8(output.stderr).unwrap();
    let line = stderr
        .lines()
        .find(|l| l.trim_start().starts_with('{'))
        .expect("no JSON error object on stderr");
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["error"]["kind"], "config");
    assert!(v["error"]["message"].as_str().is_some());
}
