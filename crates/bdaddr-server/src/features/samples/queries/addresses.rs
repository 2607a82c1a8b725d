//! A small address workbook for trying the enricher out

use bdaddr_enrich::workbook;
use mediator::Request;
use serde::{Deserialize, Serialize};

/// Download name of the sample workbook
pub const SAMPLE_FILE_NAME: &str = "sample_addresses.xlsx";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleAddressesQuery;

#[derive(Debug, Clone)]
pub struct SampleAddressesResponse {
    pub workbook: Vec<u8>,
}

impl Request<bdaddr_enrich::Result<SampleAddressesResponse>> for SampleAddressesQuery {}

pub fn handle(_query: SampleAddressesQuery) -> bdaddr_enrich::Result<SampleAddressesResponse> {
    Ok(SampleAddressesResponse {
        workbook: workbook::sample_workbook()?,
    })
}
