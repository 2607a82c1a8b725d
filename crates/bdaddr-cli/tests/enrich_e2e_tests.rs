//! End-to-end tests for `bdaddr enrich`

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use bdaddr_enrich::{workbook, AddressCache, Cell};
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn bdaddr(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bdaddr").unwrap();
    cmd.current_dir(dir.path())
        .env("BDADDR_REQUEST_INTERVAL_MS", "0")
        .env_remove("BDADDR_NOMINATIM_URL");
    cmd
}

/// Helper to write a small customer workbook
fn write_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("customers.xlsx");
    let mut book = Workbook::new();
    let sheet = book.add_worksheet();
    sheet.write_string(0, 0, "Customer").unwrap();
    sheet.write_string(0, 1, "Delivery Address").unwrap();
    let rows = [
        ("Rahim", "Road 11, Banani, Dhaka-1213"),
        ("Karim", "Zakir Hossain Road, Foy's Lake"),
        ("Salma", "College Road, Jessore"),
    ];
    for (i, (name, address)) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, *name).unwrap();
        sheet.write_string(r, 1, *address).unwrap();
    }
    book.save(&path).unwrap();
    path
}

#[test]
fn test_enrich_offline() {
    let dir = TempDir::new().unwrap();
    let input = write_workbook(dir.path());
    let output = dir.path().join("out.xlsx");

    bdaddr(&dir)
        .arg("enrich")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .args(["--mode", "offline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Delivery Address"))
        .stdout(predicate::str::contains("Saved"));

    let enriched = workbook::read_xlsx_path(&output, 1).unwrap();
    assert_eq!(enriched.rows.len(), 3);
    assert_eq!(enriched.rows[0][2], Cell::Text("Dhaka".to_string()));
    assert_eq!(enriched.rows[0][3], Cell::Text("Banani".to_string()));
    assert_eq!(enriched.rows[1][2], Cell::Text("Not found".to_string()));
    assert_eq!(enriched.rows[2][2], Cell::Text("Jashore".to_string()));

    let original = workbook::read_xlsx_path(&output, 0).unwrap();
    assert_eq!(original.headers, vec!["Customer", "Delivery Address"]);
    assert!(!dir.path().join("cache_geocode.csv").exists());
}

#[test]
fn test_enrich_default_output_name() {
    let dir = TempDir::new().unwrap();
    let input = write_workbook(dir.path());

    bdaddr(&dir)
        .arg("enrich")
        .arg("--input")
        .arg(&input)
        .args(["--mode", "offline"])
        .assert()
        .success();

    assert!(dir.path().join("customers_enriched.xlsx").is_file());
}

#[tokio::test]
async fn test_enrich_auto_fills_gaps_online_and_saves_cache() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Zakir Hossain Road, Foy's Lake"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "address": { "suburb": "Pahartali", "state_district": "Chattogram" }
        }])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let input = write_workbook(dir.path());
    let output = dir.path().join("out.xlsx");
    let cache_path = dir.path().join("geo").join("cache.csv");

    bdaddr(&dir)
        .arg("enrich")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .arg("--cache")
        .arg(&cache_path)
        .arg("--nominatim-url")
        .arg(mock_server.uri())
        .assert()
        .success();

    let enriched = workbook::read_xlsx_path(&output, 1).unwrap();
    assert_eq!(enriched.rows[1][2], Cell::Text("Chattogram".to_string()));
    assert_eq!(enriched.rows[1][3], Cell::Text("Pahartali".to_string()));
    assert_eq!(enriched.rows[1][4], Cell::Text("online".to_string()));

    let cache = AddressCache::load(&cache_path).unwrap();
    assert!(cache.lookup("Zakir Hossain Road, Foy's Lake").is_some());
}

#[test]
fn test_enrich_missing_column() {
    let dir = TempDir::new().unwrap();
    let input = write_workbook(dir.path());

    bdaddr(&dir)
        .arg("enrich")
        .arg("--input")
        .arg(&input)
        .args(["--address-col", "Shipping", "--mode", "offline"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Shipping"))
        .stderr(predicate::str::contains("Customer, Delivery Address"))
        .stderr(predicate::str::contains("--address-col"));
}

#[test]
fn test_enrich_missing_input() {
    let dir = TempDir::new().unwrap();

    bdaddr(&dir)
        .args(["enrich", "--input", "nope.xlsx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_enrich_sheet_index_out_of_range() {
    let dir = TempDir::new().unwrap();
    let input = write_workbook(dir.path());

    bdaddr(&dir)
        .arg("enrich")
        .arg("--input")
        .arg(&input)
        .args(["--sheet-index", "3", "--mode", "offline"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_enrich_with_malformed_gazetteer_falls_back() {
    let dir = TempDir::new().unwrap();
    let input = write_workbook(dir.path());
    let gazetteer = dir.path().join("places.csv");
    std::fs::write(&gazetteer, "place,region\nFoo,Bar\n").unwrap();

    bdaddr(&dir)
        .arg("enrich")
        .arg("--input")
        .arg(&input)
        .arg("--gazetteer")
        .arg(&gazetteer)
        .args(["--mode", "offline"])
        .assert()
        .success()
        .stderr(predicate::str::contains("bundled gazetteer"));
}
