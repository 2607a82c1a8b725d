//! The bundled gazetteer, offered as a template for custom uploads

use bdaddr_enrich::BUNDLED_GAZETTEER_CSV;
use mediator::Request;
use serde::{Deserialize, Serialize};

/// Download name of the sample gazetteer
pub const SAMPLE_FILE_NAME: &str = "gazetteer_sample.csv";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GazetteerSampleQuery;

#[derive(Debug, Clone)]
pub struct GazetteerSampleResponse {
    pub csv: &'static str,
}

impl Request<GazetteerSampleResponse> for GazetteerSampleQuery {}

pub fn handle(_query: GazetteerSampleQuery) -> GazetteerSampleResponse {
    GazetteerSampleResponse {
        csv: BUNDLED_GAZETTEER_CSV,
    }
}
