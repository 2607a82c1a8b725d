//! End-to-end run over a real workbook with a mocked geocoder

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use bdaddr_common::EnrichMode;
use bdaddr_enrich::{
    workbook, AddressCache, Cell, EnrichmentPipeline, Gazetteer, Matcher, MatcherConfig,
    NominatimResolver, ResolverConfig,
};
use rust_xlsxwriter::Workbook;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn input_workbook() -> Vec<u8> {
    let mut book = Workbook::new();
    let sheet = book.add_worksheet();
    sheet.write_string(0, 0, "Order").unwrap();
    sheet.write_string(0, 1, "Delivery Address").unwrap();
    sheet.write_string(0, 2, "Paid").unwrap();

    let rows = [
        "House 12, Road 5, Dhanmondi, Dhaka",
        "Zakir Hossain Road, Foy's Lake",
        "",
        "Boro Bazar, Jessore",
    ];
    for (i, address) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_number(r, 0, 1000.0 + i as f64).unwrap();
        if !address.is_empty() {
            sheet.write_string(r, 1, *address).unwrap();
        }
        sheet.write_boolean(r, 2, i % 2 == 0).unwrap();
    }
    book.save_to_buffer().unwrap()
}

async fn nominatim() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Zakir Hossain Road, Foy's Lake"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "address": { "suburb": "Pahartali", "state_district": "Chattogram" }
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;
    server
}

fn pipeline(server: &MockServer) -> EnrichmentPipeline {
    let config = ResolverConfig {
        min_interval: Duration::ZERO,
        ..ResolverConfig::default()
    }
    .with_base_url(server.uri());
    EnrichmentPipeline::new(
        Matcher::new(Gazetteer::bundled().unwrap(), MatcherConfig::default()),
        Arc::new(NominatimResolver::new(&config).unwrap()),
    )
}

#[tokio::test]
async fn test_auto_run_over_workbook() {
    let server = nominatim().await;
    let pipeline = pipeline(&server);
    let mut cache = AddressCache::new();

    let table = workbook::read_xlsx(&input_workbook(), 0).unwrap();
    assert_eq!(table.rows.len(), 4);
    let column = table.address_column(None).unwrap();
    assert_eq!(column, 1);

    let run = pipeline.run(&table, column, EnrichMode::Auto, &mut cache).await;
    assert_eq!(run.summary.total_rows, 4);
    assert_eq!(run.summary.offline, 2);
    assert_eq!(run.summary.online, 1);
    assert_eq!(run.summary.unresolved, 1);
    assert_eq!(cache.len(), 1);

    let output = workbook::read_xlsx(&workbook::write_enriched(&table, &run.rows).unwrap(), 1).unwrap();
    let text = |s: &str| Cell::Text(s.to_string());

    assert_eq!(output.rows[0][3], text("Dhaka"));
    assert_eq!(output.rows[0][4], text("Dhanmondi"));
    assert_eq!(output.rows[1][3], text("Chattogram"));
    assert_eq!(output.rows[1][4], text("Pahartali"));
    assert_eq!(output.rows[1][5], text("online"));
    assert_eq!(output.rows[2][3], text("Not found"));
    assert_eq!(output.rows[3][3], text("Jashore"));
    assert_eq!(output.rows[3][4], text("Not found"));
    assert_eq!(output.rows[3][0], Cell::Number(1003.0));
    assert_eq!(output.rows[3][2], Cell::Bool(false));
}

#[tokio::test]
async fn test_second_online_run_is_served_from_cache() {
    let server = nominatim().await;
    let pipeline = pipeline(&server);
    let mut cache = AddressCache::new();
    let table = workbook::read_xlsx(&input_workbook(), 0).unwrap();

    pipeline.run(&table, 1, EnrichMode::Online, &mut cache).await;
    let requests_after_first = server.received_requests().await.unwrap().len();

    let second = pipeline.run(&table, 1, EnrichMode::Online, &mut cache).await;
    let requests_after_second = server.received_requests().await.unwrap().len();

    assert_eq!(second.rows[1].source.as_str(), "cache");
    // Only the addresses the geocoder knew nothing about are asked again.
    assert!(requests_after_second > requests_after_first);
    assert_eq!(second.summary.cache, 1);
}
