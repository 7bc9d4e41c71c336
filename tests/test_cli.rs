//! Tests for CLI argument parsing and the binary

use assert_cmd::Command;
use clap::Parser;
use featkeep::cli::{Cli, SearchMode};
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

const REQUIRED: [&str; 9] = [
    "featkeep",
    "-i",
    "data.csv",
    "-t",
    "target",
    "--importance",
    "importance.json",
    "--auc-limit",
    "0.9834",
];

fn parse_with(extra: &[&str]) -> Cli {
    let args: Vec<&str> = REQUIRED.iter().chain(extra.iter()).copied().collect();
    Cli::parse_from(args)
}

#[test]
fn test_cli_default_values() {
    let cli = parse_with(&[]);

    assert_eq!(cli.input, PathBuf::from("data.csv"));
    assert_eq!(cli.importance, PathBuf::from("importance.json"));
    assert_eq!(cli.auc_limit, 0.9834);
    assert_eq!(cli.importance_type, "gain", "Default importance type should be gain");
    assert_eq!(cli.ci, 0.99, "Default ci should be 0.99");
    assert_eq!(cli.steps, 5, "Default steps should be 5");
    assert_eq!(cli.span, 5, "Default span should be 5");
    assert_eq!(cli.mode, "two-phase");
    assert_eq!(cli.start_count, None);
    assert_eq!(cli.test_size, 0.25);
    assert_eq!(cli.seed, 42);
    assert_eq!(cli.workers, None);
    assert!(!cli.no_confirm, "Default no_confirm should be false");
    assert!(cli.drop_columns.is_empty());
    assert_eq!(cli.infer_schema_length, 10000);
}

#[test]
fn test_cli_custom_search_parameters() {
    let cli = parse_with(&[
        "--importance-type",
        "weight",
        "--ci",
        "0.95",
        "--steps",
        "10",
        "--span",
        "3",
        "--mode",
        "auto-precise",
        "--start-count",
        "28",
        "--workers",
        "2",
    ]);

    assert_eq!(cli.importance_type, "weight");
    assert_eq!(cli.ci, 0.95);
    assert_eq!(cli.steps, 10);
    assert_eq!(cli.span, 3);
    assert_eq!(cli.mode.parse::<SearchMode>().unwrap(), SearchMode::AutoPrecise);
    assert_eq!(cli.start_count, Some(28));
    assert_eq!(cli.workers, Some(2));
}

#[test]
fn test_cli_drop_columns() {
    let cli = parse_with(&["--drop-columns", "id,timestamp,uuid"]);

    assert_eq!(cli.drop_columns, vec!["id", "timestamp", "uuid"]);
}

#[test]
fn test_cli_rejects_out_of_range_values() {
    let with = |extra: &[&str]| {
        let args: Vec<&str> = REQUIRED.iter().chain(extra.iter()).copied().collect();
        Cli::try_parse_from(args)
    };

    assert!(with(&["--ci", "0"]).is_err());
    assert!(with(&["--ci", "1.01"]).is_err());
    assert!(with(&["--steps", "0"]).is_err());
    assert!(with(&["--span", "0"]).is_err());
    assert!(with(&["--test-size", "1.0"]).is_err());
}

#[test]
fn test_cli_event_value_requires_non_event_value() {
    let args: Vec<&str> = REQUIRED
        .iter()
        .copied()
        .chain(["--event-value", "B"])
        .collect();
    assert!(Cli::try_parse_from(args).is_err());

    let cli = parse_with(&["--event-value", "B", "--non-event-value", "G"]);
    assert_eq!(cli.event_value.as_deref(), Some("B"));
    assert_eq!(cli.non_event_value.as_deref(), Some("G"));
}

#[test]
fn test_cli_requires_importance_and_limit() {
    let result = Cli::try_parse_from(["featkeep", "-i", "data.csv", "-t", "target"]);
    assert!(result.is_err());
}

// ============================================================================
// Binary
// ============================================================================

fn write_fixture() -> (TempDir, PathBuf, PathBuf) {
    let mut df = common::create_signal_dataframe(200, 3, 7);
    let (temp_dir, csv_path) = common::create_temp_csv(&mut df);

    let mut gain = serde_json::Map::new();
    for s in 0..3 {
        gain.insert(format!("signal_{}", s), serde_json::json!(10.0 - s as f64));
    }
    for n in 0..7 {
        gain.insert(format!("noise_{}", n), serde_json::json!(1.0 - n as f64 * 0.1));
    }
    let json = serde_json::json!({ "gain": gain }).to_string();
    let importance_path = common::write_importance_file(&temp_dir, &json);

    (temp_dir, csv_path, importance_path)
}

#[test]
fn test_binary_auto_broad_run() {
    let (_temp_dir, csv_path, importance_path) = write_fixture();

    Command::cargo_bin("featkeep")
        .unwrap()
        .arg("-i")
        .arg(&csv_path)
        .args(["-t", "target", "--importance"])
        .arg(&importance_path)
        .args(["--auc-limit", "0.9", "--mode", "auto-broad", "--no-confirm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("COARSE SEARCH SUMMARY"))
        .stdout(predicate::str::contains("of 10 features"));
}

#[test]
fn test_binary_two_phase_without_prompt() {
    let (_temp_dir, csv_path, importance_path) = write_fixture();

    Command::cargo_bin("featkeep")
        .unwrap()
        .arg("-i")
        .arg(&csv_path)
        .args(["-t", "target", "--importance"])
        .arg(&importance_path)
        .args(["--auc-limit", "0.9", "--span", "2", "--no-confirm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("COARSE SEARCH SUMMARY"))
        .stdout(predicate::str::contains("FINE SEARCH SUMMARY"));
}

#[test]
fn test_binary_precise_mode_requires_start_count() {
    let (_temp_dir, csv_path, importance_path) = write_fixture();

    Command::cargo_bin("featkeep")
        .unwrap()
        .arg("-i")
        .arg(&csv_path)
        .args(["-t", "target", "--importance"])
        .arg(&importance_path)
        .args(["--auc-limit", "0.9", "--mode", "precise"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--start-count"));
}

#[test]
fn test_binary_unknown_target() {
    let (_temp_dir, csv_path, importance_path) = write_fixture();

    Command::cargo_bin("featkeep")
        .unwrap()
        .arg("-i")
        .arg(&csv_path)
        .args(["-t", "label", "--importance"])
        .arg(&importance_path)
        .args(["--auc-limit", "0.9", "--no-confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Target column 'label' not found"));
}
