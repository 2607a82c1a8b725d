//! Enrich an uploaded workbook
//!
//! The whole run happens inside one request: the workbook is parsed, every
//! row is resolved in order, and the enriched workbook comes back as bytes.
//! The process-wide cache stays locked for the duration of the run, so
//! concurrent uploads are served one after the other.

use bdaddr_common::{EnrichMode, RunSummary};
use bdaddr_enrich::{
    workbook, AddressCache, EnrichError, EnrichmentPipeline, Gazetteer, Matcher,
};
use mediator::Request;
use serde::Serialize;

use crate::features::FeatureState;

/// Command to enrich one uploaded workbook
#[derive(Debug, Clone, Default)]
pub struct EnrichFileCommand {
    /// Raw `.xlsx` bytes
    pub file: Vec<u8>,
    /// Name the browser sent with the upload, if any
    pub file_name: Option<String>,
    /// Header of the address column; detected when `None`
    pub address_column: Option<String>,
    pub mode: EnrichMode,
    /// Zero-based worksheet index
    pub sheet_index: usize,
    /// Replacement gazetteer CSV for this run only
    pub gazetteer: Option<Vec<u8>>,
    /// Cache CSV merged into the server cache before the run
    pub cache: Option<Vec<u8>>,
}

/// Enriched workbook plus the counters of the run
#[derive(Debug, Clone, Serialize)]
pub struct EnrichFileResponse {
    #[serde(skip)]
    pub workbook: Vec<u8>,
    pub summary: RunSummary,
}

/// Errors that can occur when enriching a workbook
#[derive(Debug, thiserror::Error)]
pub enum EnrichFileError {
    #[error("An .xlsx file is required")]
    FileRequired,

    #[error("Unsupported file '{0}': only .xlsx workbooks are accepted")]
    UnsupportedFile(String),

    #[error(transparent)]
    Enrich(#[from] EnrichError),
}

impl Request<Result<EnrichFileResponse, EnrichFileError>> for EnrichFileCommand {}

impl EnrichFileCommand {
    /// Validates the command parameters
    ///
    /// # Errors
    ///
    /// - The file must not be empty
    /// - When a file name is known it must end in `.xlsx`
    pub fn validate(&self) -> Result<(), EnrichFileError> {
        if self.file.is_empty() {
            return Err(EnrichFileError::FileRequired);
        }

        if let Some(name) = self.file_name.as_deref().filter(|n| !n.trim().is_empty()) {
            if !name.trim().to_lowercase().ends_with(".xlsx") {
                return Err(EnrichFileError::UnsupportedFile(name.to_string()));
            }
        }

        Ok(())
    }
}

/// Handler function for enriching a workbook
///
/// Problems with the optional gazetteer or cache uploads do not fail the run;
/// they are returned as warnings in the summary.
#[tracing::instrument(
    skip(state, command),
    fields(
        mode = %command.mode,
        sheet_index = command.sheet_index,
        bytes = command.file.len()
    )
)]
pub async fn handle(
    state: FeatureState,
    command: EnrichFileCommand,
) -> Result<EnrichFileResponse, EnrichFileError> {
    command.validate()?;

    let table = workbook::read_xlsx(&command.file, command.sheet_index)?;
    let column = table.address_column(command.address_column.as_deref())?;

    tracing::info!(
        rows = table.rows.len(),
        column = %table.headers[column],
        "Enriching workbook"
    );

    let mut warnings = Vec::new();

    let custom_pipeline = match &command.gazetteer {
        Some(csv) => {
            let (gazetteer, warning) = Gazetteer::load_or_bundled(csv.as_slice())?;
            warnings.extend(warning);
            tracing::debug!(entries = gazetteer.len(), "Using uploaded gazetteer");
            Some(EnrichmentPipeline::new(
                Matcher::new(gazetteer, state.pipeline.matcher().config()),
                state.resolver.clone(),
            ))
        },
        None => None,
    };
    let pipeline = custom_pipeline.as_ref().unwrap_or(&*state.pipeline);

    let mut cache = state.cache.lock().await;

    if let Some(csv) = &command.cache {
        match AddressCache::from_reader(csv.as_slice()) {
            Ok(uploaded) => {
                tracing::info!(entries = uploaded.len(), "Merging uploaded cache");
                cache.merge(uploaded);
            },
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring uploaded cache");
                warnings.push(format!("{err}; the uploaded cache was ignored"));
            },
        }
    }

    let mut run = pipeline.run(&table, column, command.mode, &mut cache).await;

    if let Err(err) = state.persist(&cache) {
        tracing::warn!(error = %err, "Failed to save address cache");
    }
    drop(cache);

    run.summary.warnings.extend(warnings);
    let workbook = workbook::write_enriched(&table, &run.rows)?;

    Ok(EnrichFileResponse {
        workbook,
        summary: run.summary,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn command() -> EnrichFileCommand {
        EnrichFileCommand {
            file: vec![0x50, 0x4b, 0x03, 0x04],
            file_name: Some("customers.xlsx".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_accepts_xlsx() {
        assert!(command().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_file() {
        let command = EnrichFileCommand {
            file: Vec::new(),
            ..command()
        };
        assert!(matches!(command.validate(), Err(EnrichFileError::FileRequired)));
    }

    #[test]
    fn test_validate_rejects_other_extensions() {
        let command = EnrichFileCommand {
            file_name: Some("customers.csv".to_string()),
            ..command()
        };
        assert!(matches!(
            command.validate(),
            Err(EnrichFileError::UnsupportedFile(name)) if name == "customers.csv"
        ));
    }

    #[test]
    fn test_validate_ignores_missing_file_name() {
        let command = EnrichFileCommand {
            file_name: None,
            ..command()
        };
        assert!(command.validate().is_ok());
    }
}
