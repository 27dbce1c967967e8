//! Integration tests for switchyard-cli.
//!
//! Tests drive the built `switchyard` binary against routing configurations
//! written to a temporary directory.

use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Helper to get the path to the `switchyard` binary built by cargo.
fn switchyard_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_switchyard"))
}

const SITE: &str = r#"
name = "Test Site"
description = "Laptop into a matrix feeding a splitter"

[[midpoints]]
device = 20
name = "Matrix"

[[midpoints]]
device = 40
name = "Splitter"

[[connections]]
id = 1
source = "10.0.1"
destination = "20.0.1"
types = ["audio", "video"]

[[connections]]
id = 2
source = "20.0.2"
destination = "40.0.1"
types = ["audio", "video"]

[[connections]]
id = 3
source = "40.0.1"
destination = "50.0.1"
types = ["video"]

[[connections]]
id = 4
source = "40.0.2"
destination = "51.0.1"
types = ["video"]
rooms = { mode = "only", ids = [2] }

[[connections]]
id = 5
source = "20.0.3"
destination = "60.0.1"
types = ["audio"]
"#;

const BROKEN: &str = r#"
name = "Broken Site"

[[connections]]
id = 1
source = "1.0.1"
destination = "2.0.1"
types = ["video", "smell"]

[[connections]]
id = 1
source = "3.0.1"
destination = "4.0.1"
types = ["video"]

[[connections]]
id = 2
source = "3.0.1"
destination = "5.0.1"
types = ["video"]
"#;

fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("failed to write config");
    path
}

fn run(args: &[&str], config: &PathBuf) -> Output {
    switchyard_bin()
        .arg(args[0])
        .arg(config)
        .args(&args[1..])
        .output()
        .expect("failed to run switchyard")
}

// ---------------------------------------------------------------------------
// `switchyard validate`
// ---------------------------------------------------------------------------

#[test]
fn cli_validate_accepts_valid_config() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "site.toml", SITE);

    let output = run(&["validate"], &config);
    assert!(output.status.success(), "validate failed: {output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Test Site: valid (5 connections, 2 midpoints)"), "got: {stdout}");
}

#[test]
fn cli_validate_lists_every_problem() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "broken.toml", BROKEN);

    let output = run(&["validate"], &config);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 problem(s)"), "got: {stdout}");
    assert!(stdout.contains("unknown connection type 'smell'"));
    assert!(stdout.contains("two outgoing Video connections"));
}

#[test]
fn cli_validate_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = run(&["validate"], &dir.path().join("absent.toml"));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read file"), "got: {stderr}");
}

// ---------------------------------------------------------------------------
// `switchyard connections`
// ---------------------------------------------------------------------------

#[test]
fn cli_connections_lists_table() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "site.toml", SITE);

    let output = run(&["connections"], &config);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Midpoints: 20.0, 40.0"), "got: {stdout}");
    assert!(stdout.contains("Audio|Video"));
    assert!(stdout.contains("only 2"));
    assert!(stdout.contains("5 of 5 connections"));
}

#[test]
fn cli_connections_filters_by_type() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "site.toml", SITE);

    let output = run(&["connections", "--types", "audio"], &config);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("3 of 5 connections"), "got: {stdout}");
}

// ---------------------------------------------------------------------------
// `switchyard paths`
// ---------------------------------------------------------------------------

#[test]
fn cli_paths_prints_hops_and_switches() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "site.toml", SITE);

    let output = run(&["paths", "--from", "10.0.1", "--to", "50.0.1", "--room", "1"], &config);
    assert!(output.status.success(), "paths failed: {output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Room(1): 1 of 1 paths found"), "got: {stdout}");
    assert!(stdout.contains("[Video] 10.0.1 -(1)-> 20.0.1 -(2)-> 40.0.1 -(3)-> 50.0.1"));
    assert!(stdout.contains("switch 20.0: in 1 -> out 2 [Video]"));
    assert!(stdout.contains("switch 40.0: in 1 -> out 1 [Video]"));
}

#[test]
fn cli_paths_json_output() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "site.toml", SITE);

    let output = run(
        &["paths", "--from", "10.0.1", "--to", "50.0.1", "--to", "60.0.1", "--types", "audio,video", "--json"],
        &config,
    );
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    let paths = report.as_array().unwrap();

    // 50.0.1 is video-only and 60.0.1 audio-only.
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0]["type"], "Video");
    assert_eq!(paths[0]["connections"], serde_json::json!([1, 2, 3]));
    assert_eq!(paths[1]["type"], "Audio");
    assert_eq!(paths[1]["destination"], "60.0.1");
    assert_eq!(paths[1]["operations"][0]["output"], 3);
}

#[test]
fn cli_paths_require_fails_when_unreachable() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "site.toml", SITE);

    let reachable = run(
        &["paths", "--from", "10.0.1", "--to", "51.0.1", "--room", "2", "--require"],
        &config,
    );
    assert!(reachable.status.success());

    let blocked = run(
        &["paths", "--from", "10.0.1", "--to", "51.0.1", "--room", "1", "--require"],
        &config,
    );
    assert!(!blocked.status.success());
    let stderr = String::from_utf8_lossy(&blocked.stderr);
    assert!(stderr.contains("only 0 of 1 requested paths exist"), "got: {stderr}");
}

#[test]
fn cli_paths_rejects_bad_endpoint() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "site.toml", SITE);

    let output = run(&["paths", "--from", "10.0", "--to", "50.0.1"], &config);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid endpoint '10.0'"), "got: {stderr}");
}
