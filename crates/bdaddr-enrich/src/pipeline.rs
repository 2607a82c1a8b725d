//! Row-by-row enrichment
//!
//! | mode | stages |
//! |---|---|
//! | `offline` | matcher |
//! | `online` | cache, then the resolver |
//! | `auto` | matcher, then cache/resolver for whatever is still missing |
//!
//! Rows are resolved sequentially and in input order. The cache is passed in
//! by the caller, who owns its load/save lifecycle.

use std::sync::Arc;

use tracing::{debug, info, warn};

use bdaddr_common::{EnrichMode, Resolution, ResolutionSource, RunSummary};

use crate::cache::AddressCache;
use crate::matcher::Matcher;
use crate::resolver::AddressResolver;
use crate::workbook::{Cell, Table};

/// One output row; never changed after the pipeline built it
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    /// Input columns in their original order
    pub original: Vec<(String, Cell)>,
    pub address: String,
    pub resolution: Resolution,
    pub source: ResolutionSource,
}

/// Output of a whole run
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichRun {
    pub rows: Vec<EnrichedRow>,
    pub summary: RunSummary,
}

pub struct EnrichmentPipeline {
    matcher: Matcher,
    resolver: Arc<dyn AddressResolver>,
}

impl EnrichmentPipeline {
    pub fn new(matcher: Matcher, resolver: Arc<dyn AddressResolver>) -> Self {
        Self { matcher, resolver }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Resolve every row of `table` using the address in `address_column`
    pub async fn run(
        &self,
        table: &Table,
        address_column: usize,
        mode: EnrichMode,
        cache: &mut AddressCache,
    ) -> EnrichRun {
        let mut summary = RunSummary::default();
        let mut rows = Vec::with_capacity(table.rows.len());

        info!(rows = table.rows.len(), %mode, "Starting enrichment run");

        for (index, cells) in table.rows.iter().enumerate() {
            let address = cells
                .get(address_column)
                .map(|cell| cell.to_string())
                .unwrap_or_default();

            let (resolution, source) = self.resolve_address(&address, mode, cache).await;
            debug!(row = index + 1, %source, "Row resolved");
            summary.record(source);

            rows.push(EnrichedRow {
                original: table.headers.iter().cloned().zip(cells.iter().cloned()).collect(),
                address,
                resolution,
                source,
            });
        }

        info!(
            total = summary.total_rows,
            offline = summary.offline,
            cache = summary.cache,
            online = summary.online,
            unresolved = summary.unresolved,
            "Enrichment run finished"
        );

        EnrichRun { rows, summary }
    }

    /// Resolve a single address
    pub async fn resolve_address(
        &self,
        address: &str,
        mode: EnrichMode,
        cache: &mut AddressCache,
    ) -> (Resolution, ResolutionSource) {
        let address = address.trim();
        if address.is_empty() {
            return (Resolution::default(), ResolutionSource::None);
        }

        let mut resolution = Resolution::default();
        let mut source = ResolutionSource::None;

        if mode.uses_matcher() {
            resolution = self.matcher.resolve(address);
            if !resolution.is_empty() {
                source = ResolutionSource::Offline;
            }
        }

        if mode.uses_online() && !resolution.is_complete() {
            if let Some((online, online_source)) = self.lookup_online(address, cache).await {
                if resolution.fill_missing(&online) {
                    source = online_source;
                }
            }
        }

        (resolution, source)
    }

    async fn lookup_online(
        &self,
        address: &str,
        cache: &mut AddressCache,
    ) -> Option<(Resolution, ResolutionSource)> {
        if let Some(record) = cache.lookup(address) {
            return Some((record.resolution(), ResolutionSource::Cache));
        }

        match self.resolver.resolve(address).await {
            Ok(Some(resolution)) => {
                cache.store(address, &resolution);
                Some((resolution, ResolutionSource::Online))
            },
            Ok(None) => None,
            Err(err) => {
                warn!(address, error = %err, "Online lookup failed, leaving row unresolved");
                None
            },
        }
    }
}
