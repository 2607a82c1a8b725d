//! Error types shared across the address enricher

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, BdAddrError>;

/// Main error type shared by the workspace crates
#[derive(Error, Debug)]
pub enum BdAddrError {
    #[error("Invalid enrichment mode '{0}': expected one of auto, offline, online")]
    InvalidMode(String),
}
