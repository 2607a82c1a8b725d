//! Address enrichment engine
//!
//! Adds a District and a Thana to spreadsheet rows that carry a free-text
//! Bangladeshi address.
//!
//! - [`normalize`]: text cleanup shared by matching and lookups
//! - [`gazetteer`]: known area names and districts
//! - [`matcher`]: offline fuzzy matching against the gazetteer
//! - [`cache`]: flat-file memory of online lookups
//! - [`resolver`]: online geocoding behind the [`resolver::AddressResolver`] trait
//! - [`pipeline`]: per-row orchestration for the `offline`, `online` and `auto` modes
//! - [`workbook`]: `.xlsx` reading and writing
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bdaddr_common::EnrichMode;
//! use bdaddr_enrich::{
//!     workbook, AddressCache, EnrichConfig, EnrichmentPipeline, Gazetteer, Matcher,
//!     NominatimResolver,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EnrichConfig::from_env()?;
//! let matcher = Matcher::new(Gazetteer::bundled()?, config.matcher);
//! let resolver = Arc::new(NominatimResolver::new(&config.resolver)?);
//! let pipeline = EnrichmentPipeline::new(matcher, resolver);
//!
//! let mut cache = AddressCache::load("cache_geocode.csv")?;
//! let table = workbook::read_xlsx_path("customers.xlsx", 0)?;
//! let column = table.address_column(None)?;
//! let run = pipeline.run(&table, column, EnrichMode::Auto, &mut cache).await;
//!
//! std::fs::write("customers_enriched.xlsx", workbook::write_enriched(&table, &run.rows)?)?;
//! cache.save("cache_geocode.csv")?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod cache;
pub mod config;
pub mod error;
pub mod gazetteer;
pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod resolver;
pub mod workbook;

pub use cache::AddressCache;
pub use config::{EnrichConfig, ResolverConfig};
pub use error::{EnrichError, Result};
pub use gazetteer::{Gazetteer, GazetteerEntry, BUNDLED_GAZETTEER_CSV};
pub use matcher::{MatchOutcome, Matcher, MatcherConfig};
pub use pipeline::{EnrichRun, EnrichedRow, EnrichmentPipeline};
pub use resolver::{AddressResolver, NominatimResolver, ResolveError};
pub use workbook::{Cell, Table};
