//! BD Address Enricher Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the address enricher workspace.
//!
//! # Overview
//!
//! This crate provides common functionality used across all workspace members:
//!
//! - **Error Handling**: Shared error type and result alias
//! - **Logging**: Centralized `tracing` subscriber setup
//! - **Types**: Enrichment modes, resolutions and run summaries
//!
//! # Example
//!
//! ```no_run
//! use bdaddr_common::{EnrichMode, Result};
//!
//! fn parse_mode(raw: &str) -> Result<EnrichMode> {
//!     raw.parse()
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{BdAddrError, Result};
pub use types::{
    CacheRecord, EnrichMode, Resolution, ResolutionSource, RunSummary, UNRESOLVED_LABEL,
};
