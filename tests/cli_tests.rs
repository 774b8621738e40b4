//! Integration tests for the Autotext CLI
//!
//! These tests run the actual CLI binary and verify output.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the binary to test
fn autotext_cmd() -> Command {
    Command::cargo_bin("autotext").unwrap()
}

fn write_control(dir: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let file = dir.path().join(name);
    fs::write(&file, yaml).unwrap();
    file
}

const ADDRESS_CONTROL: &str = r#"
schema: autotext/control@0.1
config_value: "Ship to|columnValue,AddressLine1|lookup,cityValue,name|lookup,cityValue,zip"
fields:
  AddressLine1: 1 Main Street
  String2: null
  cityValue:
    - id: "c1"
      entityType: city
      name: Paris
"#;

#[test]
fn test_help_flag() {
    autotext_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("validate"));
}

// ============================================================================
// render
// ============================================================================

#[test]
fn test_render_with_mock_fetcher() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_control(&temp_dir, "address.yaml", ADDRESS_CONTROL);

    // The mock fetcher has no records, so the zip lookup degrades inline
    autotext_cmd()
        .args(["render", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::eq(
            "Ship to 1 Main Street Paris [Error retrieving zip for cityValue]\n",
        ));
}

#[test]
fn test_render_config_value_override() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_control(&temp_dir, "address.yaml", ADDRESS_CONTROL);

    autotext_cmd()
        .args([
            "render",
            file.to_str().unwrap(),
            "--fetcher",
            "mock",
            "--config-value",
            "a|columnValue,String2|b",
        ])
        .assert()
        .success()
        .stdout(predicate::eq("a [columnValue for String2not available] b\n"));
}

#[test]
fn test_render_webapi_without_section_fails() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_control(&temp_dir, "address.yaml", ADDRESS_CONTROL);

    autotext_cmd()
        .args(["render", file.to_str().unwrap(), "--fetcher", "webapi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("AUTO-021"))
        .stderr(predicate::str::contains("Fix:"));
}

#[test]
fn test_render_missing_file() {
    autotext_cmd()
        .args(["render", "/nonexistent/control.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}

#[test]
fn test_render_wrong_schema() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_control(&temp_dir, "bad.yaml", "schema: nika/workflow@0.1\n");

    autotext_cmd()
        .args(["render", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("AUTO-010"));
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn test_validate_valid_control() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_control(&temp_dir, "address.yaml", ADDRESS_CONTROL);

    autotext_cmd()
        .args(["validate", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("Lookups: 2"))
        .stdout(predicate::str::contains("Fields: AddressLine1, cityValue"));
}

#[test]
fn test_validate_reports_warnings_and_errors() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_control(
        &temp_dir,
        "broken.yaml",
        r#"
schema: autotext/control@0.1
config_value: "upper,AddressLine1|lookup,cityValue"
fields:
  AddressLine1: x
  cityValue: null
"#,
    );

    autotext_cmd()
        .args(["validate", file.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("unknown directive 'upper'"))
        .stdout(predicate::str::contains("needs an attribute"))
        .stderr(predicate::str::contains("AUTO-030"));
}
