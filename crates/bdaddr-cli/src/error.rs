//! Error types for the bdaddr CLI
//!
//! Messages are user-facing and say what to do next.

use bdaddr_enrich::{EnrichError, ResolveError};
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// Required file is missing
    #[error("File not found: '{0}'. Verify the file path exists and you have read permissions.")]
    FileNotFound(String),

    /// Refusing to overwrite an existing file
    #[error("File already exists: '{0}'. Use --force to overwrite it.")]
    FileExists(String),

    /// The address column is not in the sheet
    #[error("{0}. Pass --address-col with one of the available columns.")]
    MissingColumn(String),

    /// The input is not a readable workbook
    #[error("{0}. Check that the input is an .xlsx file and that --sheet-index is in range.")]
    UnreadableWorkbook(String),

    /// Any other enrichment failure
    #[error("Enrichment failed: {0}")]
    Enrich(EnrichError),

    /// The online resolver could not be set up
    #[error("Online lookup is unavailable: {0}. Check --nominatim-url and BDADDR_* settings.")]
    Resolver(#[from] ResolveError),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// JSON output failed
    #[error("Failed to format JSON: {0}")]
    JsonFormat(#[from] serde_json::Error),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables.")]
    Config(String),
}

impl From<EnrichError> for CliError {
    fn from(err: EnrichError) -> Self {
        match err {
            EnrichError::MissingColumn { .. } => Self::MissingColumn(err.to_string()),
            EnrichError::UnreadableWorkbook(_) => Self::UnreadableWorkbook(err.to_string()),
            EnrichError::Config(message) => Self::Config(message),
            other => Self::Enrich(other),
        }
    }
}

impl CliError {
    /// Create a file not found error
    pub fn file_not_found(path: &std::path::Path) -> Self {
        Self::FileNotFound(path.display().to_string())
    }
}
