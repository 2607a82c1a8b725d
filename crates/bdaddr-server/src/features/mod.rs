//! Feature modules implementing the enrichment API
//!
//! Each feature is a vertical slice with its own commands or queries and
//! its `routes.rs`:
//!
//! - **enrich**: upload a workbook, get it back with District and Thana columns
//! - **cache**: inspect and download the address cache
//! - **gazetteer**: download the bundled gazetteer as a starting template
//! - **samples**: download an example address workbook
//!
//! Commands and queries implement the mediator pattern using the `mediator` crate.

pub mod cache;
pub mod enrich;
pub mod gazetteer;
pub mod samples;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use bdaddr_enrich::{
    AddressCache, AddressResolver, EnrichmentPipeline, Gazetteer, Matcher, MatcherConfig,
};
use tokio::sync::Mutex;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Pipeline over the server's gazetteer
    pub pipeline: Arc<EnrichmentPipeline>,
    /// Kept apart so a per-request gazetteer can get its own pipeline
    pub resolver: Arc<dyn AddressResolver>,
    /// Process-wide cache; one enrichment run holds the lock from start to end
    pub cache: Arc<Mutex<AddressCache>>,
    /// Where the cache is written after each run; `None` keeps it in memory
    pub cache_path: Option<PathBuf>,
}

impl FeatureState {
    pub fn new(
        gazetteer: Gazetteer,
        matcher: MatcherConfig,
        resolver: Arc<dyn AddressResolver>,
        cache: AddressCache,
    ) -> Self {
        Self {
            pipeline: Arc::new(EnrichmentPipeline::new(
                Matcher::new(gazetteer, matcher),
                resolver.clone(),
            )),
            resolver,
            cache: Arc::new(Mutex::new(cache)),
            cache_path: None,
        }
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Write the cache to `cache_path`, if one is configured
    pub async fn save_cache(&self) -> bdaddr_enrich::Result<()> {
        let cache = self.cache.lock().await;
        self.persist(&cache)
    }

    pub(crate) fn persist(&self, cache: &AddressCache) -> bdaddr_enrich::Result<()> {
        match &self.cache_path {
            Some(path) => cache.save(path),
            None => Ok(()),
        }
    }
}

/// Creates the API router with all feature routes mounted
///
/// - `/enrich` - Workbook enrichment
/// - `/cache` - Cache statistics and export
/// - `/gazetteer` - Gazetteer template download
/// - `/samples` - Example input workbook
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/enrich", enrich::enrich_routes().with_state(state.clone()))
        .nest("/cache", cache::cache_routes().with_state(state))
        .nest("/gazetteer", gazetteer::gazetteer_routes())
        .nest("/samples", samples::samples_routes())
}
