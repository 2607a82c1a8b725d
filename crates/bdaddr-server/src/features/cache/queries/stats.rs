use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::features::FeatureState;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStatsQuery;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatsResponse {
    pub entries: usize,
}

impl Request<CacheStatsResponse> for CacheStatsQuery {}

#[tracing::instrument(skip(state))]
pub async fn handle(state: FeatureState, _query: CacheStatsQuery) -> CacheStatsResponse {
    let cache = state.cache.lock().await;
    CacheStatsResponse {
        entries: cache.len(),
    }
}
