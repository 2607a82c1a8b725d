//! Download the address cache as CSV

use bdaddr_enrich::EnrichError;
use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::features::FeatureState;

/// Download name of the exported cache
pub const CACHE_FILE_NAME: &str = "cache_geocode.csv";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportCacheQuery;

#[derive(Debug, Clone)]
pub struct ExportCacheResponse {
    /// `address,district,thana` CSV, header included
    pub csv: Vec<u8>,
    pub entries: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportCacheError {
    #[error("Failed to serialize cache: {0}")]
    Serialize(#[from] EnrichError),
}

impl Request<Result<ExportCacheResponse, ExportCacheError>> for ExportCacheQuery {}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: FeatureState,
    _query: ExportCacheQuery,
) -> Result<ExportCacheResponse, ExportCacheError> {
    let cache = state.cache.lock().await;
    Ok(ExportCacheResponse {
        csv: cache.to_csv_bytes()?,
        entries: cache.len(),
    })
}
