//! End-to-end tests for the `dosesched` binary.
//!
//! Each test runs the real binary with `HOME` pointed at a temp directory so
//! no user configuration leaks in.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const ORDERS: &str = r#"[
    {
        "id": "rx-warfarin",
        "patient_id": "p-1",
        "utc_offset_minutes": 0,
        "start": "2026-01-15T00:00",
        "frequency_per_day": 2,
        "dose_window_minutes": 30,
        "group": "anticoagulant",
        "priority": 4
    },
    {
        "id": "rx-heparin",
        "patient_id": "p-1",
        "utc_offset_minutes": 0,
        "start": "2026-01-15T00:00",
        "frequency_per_day": 3,
        "dose_window_minutes": 15,
        "group": "anticoagulant",
        "priority": 2
    }
]"#;

fn dosesched(home: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_dosesched"));
    command
        .env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("DOSESCHED_DEFAULT_DAYS")
        .env_remove("DOSESCHED_OVERLAP_WINDOW_MINUTES")
        .env_remove("DOSESCHED_DAILY_ANCHOR")
        .env_remove("RUST_LOG");
    command
}

fn write_orders(temp: &TempDir, contents: &str) -> PathBuf {
    let path = temp.path().join("orders.json");
    std::fs::write(&path, contents).unwrap();
    path
}

fn generate_json(temp: &TempDir, orders: &Path, days: &str) -> Output {
    dosesched(temp.path())
        .args(["generate", "--start", "2026-01-15", "--days", days, "--json", "--orders"])
        .arg(orders)
        .output()
        .expect("failed to run dosesched generate")
}

fn parse_events(output: &Output) -> Vec<serde_json::Value> {
    assert!(
        output.status.success(),
        "dosesched should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be a JSON array")
}

#[test]
fn test_generate_two_day_schedule() {
    let temp = TempDir::new().unwrap();
    let orders = write_orders(&temp, ORDERS);

    let events = parse_events(&generate_json(&temp, &orders, "2"));

    let summary: Vec<(String, String)> = events
        .iter()
        .map(|e| {
            (
                e["scheduled_at"].as_str().unwrap().to_string(),
                e["order_id"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    let expected = [
        ("2026-01-15T08:00:00+00:00", "rx-warfarin"),
        ("2026-01-15T16:00:00+00:00", "rx-heparin"),
        ("2026-01-15T20:00:00+00:00", "rx-warfarin"),
        ("2026-01-16T00:00:00+00:00", "rx-heparin"),
        ("2026-01-16T08:00:00+00:00", "rx-warfarin"),
        ("2026-01-16T16:00:00+00:00", "rx-heparin"),
        ("2026-01-16T20:00:00+00:00", "rx-warfarin"),
        ("2026-01-17T00:00:00+00:00", "rx-heparin"),
    ];
    let expected: Vec<(String, String)> = expected
        .iter()
        .map(|(at, id)| ((*at).to_string(), (*id).to_string()))
        .collect();
    assert_eq!(summary, expected);
    assert!(events.iter().all(|e| e["status"] == "SCHEDULED"));
}

#[test]
fn test_generate_is_deterministic() {
    let temp = TempDir::new().unwrap();
    let orders = write_orders(&temp, ORDERS);

    let first = generate_json(&temp, &orders, "3");
    let second = generate_json(&temp, &orders, "3");
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_generate_rejects_long_horizon() {
    let temp = TempDir::new().unwrap();
    let orders = write_orders(&temp, ORDERS);

    let output = generate_json(&temp, &orders, "31");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("days must be between 1 and 30"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn test_generate_reads_orders_from_stdin() {
    let temp = TempDir::new().unwrap();

    let mut child = dosesched(temp.path())
        .args(["generate", "--start", "2026-01-15", "--days", "1", "--json", "--orders", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn dosesched");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(ORDERS.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    let events = parse_events(&output);
    assert_eq!(events.len(), 4);
}

#[test]
fn test_config_file_and_env_override_defaults() {
    let temp = TempDir::new().unwrap();
    let orders = write_orders(&temp, ORDERS);
    let config = temp.path().join("dosesched.toml");
    std::fs::write(&config, "default_days = 2\noverlap_window_minutes = 0\n").unwrap();

    // Without an exclusion window nothing is dropped
    let output = dosesched(temp.path())
        .args(["generate", "--start", "2026-01-15", "--json", "--config"])
        .arg(&config)
        .arg("--orders")
        .arg(&orders)
        .output()
        .unwrap();
    assert_eq!(parse_events(&output).len(), 10);

    let output = dosesched(temp.path())
        .env("DOSESCHED_DEFAULT_DAYS", "1")
        .args(["generate", "--start", "2026-01-15", "--json", "--config"])
        .arg(&config)
        .arg("--orders")
        .arg(&orders)
        .output()
        .unwrap();
    assert_eq!(parse_events(&output).len(), 5);
}

#[test]
fn test_validate_reports_success_and_failure() {
    let temp = TempDir::new().unwrap();
    let orders = write_orders(&temp, ORDERS);

    let output = dosesched(temp.path())
        .args(["validate", "--orders"])
        .arg(&orders)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "2 order(s) valid\n");

    let bad = write_orders(&temp, &ORDERS.replace("\"priority\": 2", "\"priority\": 9"));
    let output = dosesched(temp.path())
        .args(["validate", "--orders"])
        .arg(&bad)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "order 'rx-heparin': priority must be between 1 and 5, got 9\n"
    );
    assert!(String::from_utf8_lossy(&output.stderr).contains("1 of 2 order(s) invalid"));
}

#[test]
fn test_verbose_logs_go_to_stderr() {
    let temp = TempDir::new().unwrap();
    let orders = write_orders(&temp, ORDERS);

    let output = dosesched(temp.path())
        .args(["-v", "generate", "--start", "2026-01-15", "--days", "1", "--json", "--orders"])
        .arg(&orders)
        .output()
        .unwrap();
    assert_eq!(parse_events(&output).len(), 4);
    assert!(String::from_utf8_lossy(&output.stderr).contains("schedule generated"));
}
