//! End-to-end tests for `bdaddr gazetteer`

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_gazetteer_export() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("templates").join("gazetteer.csv");

    Command::cargo_bin("bdaddr")
        .unwrap()
        .args(["gazetteer", "export", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let csv = std::fs::read_to_string(&output).unwrap();
    assert!(csv.starts_with("name,district,thana,aliases"));
    assert!(csv.contains("Dhanmondi"));
}

#[test]
fn test_gazetteer_export_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("gazetteer.csv");
    std::fs::write(&output, "keep me").unwrap();

    Command::cargo_bin("bdaddr")
        .unwrap()
        .args(["gazetteer", "export", "--output"])
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "keep me");

    Command::cargo_bin("bdaddr")
        .unwrap()
        .args(["gazetteer", "export", "--force", "--output"])
        .arg(&output)
        .assert()
        .success();
    assert!(std::fs::read_to_string(&output).unwrap().starts_with("name,"));
}
