//! Error types for the enrichment engine

use thiserror::Error;

/// Result type alias for enrichment operations
pub type Result<T> = std::result::Result<T, EnrichError>;

/// Structural problems with the inputs of a run.
///
/// Lookup failures for individual rows are not errors; see
/// [`crate::resolver::ResolveError`].
#[derive(Error, Debug)]
pub enum EnrichError {
    /// The address column is absent from the sheet header
    #[error("Address column '{column}' not found. Available columns: {}", available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// A gazetteer or cache file lacks a required column
    #[error("Malformed {kind} file: {reason}")]
    MalformedUpload { kind: &'static str, reason: String },

    /// The workbook could not be opened or has no such sheet
    #[error("Unable to read workbook: {0}")]
    UnreadableWorkbook(String),

    #[error("Failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EnrichError {
    /// Create a missing column error
    pub fn missing_column(column: impl Into<String>, available: &[String]) -> Self {
        Self::MissingColumn {
            column: column.into(),
            available: available.to_vec(),
        }
    }

    /// Create a malformed upload error
    pub fn malformed(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedUpload {
            kind,
            reason: reason.into(),
        }
    }

    pub fn unreadable(reason: impl Into<String>) -> Self {
        Self::UnreadableWorkbook(reason.into())
    }
}
