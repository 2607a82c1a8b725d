//! Enrichment API routes
//!
//! - `POST /api/v1/enrich` - Upload a workbook, receive it enriched

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use bdaddr_common::EnrichMode;
use bdaddr_enrich::EnrichError;
use serde::Serialize;
use serde_json::json;
use std::fmt::Write;

use super::commands::{EnrichFileCommand, EnrichFileError};
use crate::api::response::ErrorResponse;
use crate::features::FeatureState;
use crate::middleware::SUMMARY_HEADER;

/// Download name of the enriched workbook
pub const ENRICHED_FILE_NAME: &str = "address_enriched.xlsx";

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub fn enrich_routes() -> Router<FeatureState> {
    Router::new().route("/", post(enrich_file))
}

/// Enrich an uploaded workbook
///
/// # Endpoint
///
/// `POST /api/v1/enrich` (multipart form)
///
/// | field | |
/// |---|---|
/// | `file` | required `.xlsx` workbook |
/// | `address_column` | header of the address column, detected when blank |
/// | `mode` | `auto` (default), `offline` or `online` |
/// | `sheet_index` | zero-based worksheet, default 0 |
/// | `gazetteer` | optional gazetteer CSV for this run |
/// | `cache` | optional cache CSV merged before the run |
///
/// # Response
///
/// - `200 OK` - The enriched workbook as an attachment, run counters in the
///   `x-enrich-summary` header
/// - `400 Bad Request` - Missing file, unknown mode or missing address column
/// - `422 Unprocessable Entity` - The workbook cannot be read
#[tracing::instrument(skip(state, multipart))]
async fn enrich_file(
    State(state): State<FeatureState>,
    multipart: Multipart,
) -> Result<Response, EnrichApiError> {
    let command = read_form(multipart).await?;
    let response = super::commands::enrich_file::handle(state, command).await?;

    tracing::info!(
        total = response.summary.total_rows,
        resolved = response.summary.resolved(),
        warnings = response.summary.warnings.len(),
        "Workbook enriched via API"
    );

    let summary = header_json(&response.summary)
        .map_err(|err| EnrichApiError::Internal(err.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{ENRICHED_FILE_NAME}\""),
            ),
            (HeaderName::from_static(SUMMARY_HEADER), summary),
        ],
        response.workbook,
    )
        .into_response())
}

/// JSON for a header value: non-ASCII characters and DEL become `\uXXXX`
/// escapes, which header values cannot carry raw.
fn header_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let json = serde_json::to_string(value)?;
    let mut escaped = String::with_capacity(json.len());
    for ch in json.chars() {
        if ch.is_ascii() && ch != '\x7f' {
            escaped.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                let _ = write!(escaped, "\\u{unit:04x}");
            }
        }
    }
    Ok(escaped)
}

/// Collect the multipart fields into a command
async fn read_form(mut multipart: Multipart) -> Result<EnrichFileCommand, EnrichApiError> {
    let mut command = EnrichFileCommand::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                command.file_name = field.file_name().map(|s| s.to_string());
                command.file = field.bytes().await?.to_vec();
            },
            "gazetteer" => command.gazetteer = non_empty(field.bytes().await?.to_vec()),
            "cache" => command.cache = non_empty(field.bytes().await?.to_vec()),
            "address_column" => {
                let text = field.text().await?;
                command.address_column = Some(text.trim().to_string()).filter(|s| !s.is_empty());
            },
            "mode" => {
                let text = field.text().await?;
                command.mode = text
                    .parse::<EnrichMode>()
                    .map_err(|err| EnrichApiError::BadRequest(err.to_string()))?;
            },
            "sheet_index" => {
                let text = field.text().await?;
                let text = text.trim();
                if !text.is_empty() {
                    command.sheet_index = text.parse().map_err(|_| {
                        EnrichApiError::BadRequest(format!(
                            "sheet_index must be a non-negative integer, got '{text}'"
                        ))
                    })?;
                }
            },
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(command)
}

/// Browsers send an empty part for an untouched file input.
fn non_empty(bytes: Vec<u8>) -> Option<Vec<u8>> {
    Some(bytes).filter(|b| !b.is_empty())
}

#[derive(Debug)]
enum EnrichApiError {
    Multipart(MultipartError),
    BadRequest(String),
    Enrich(EnrichFileError),
    Internal(String),
}

impl From<MultipartError> for EnrichApiError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart(err)
    }
}

impl From<EnrichFileError> for EnrichApiError {
    fn from(err: EnrichFileError) -> Self {
        Self::Enrich(err)
    }
}

impl IntoResponse for EnrichApiError {
    fn into_response(self) -> Response {
        match self {
            EnrichApiError::Multipart(err) => {
                let status = err.status();
                let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "PAYLOAD_TOO_LARGE"
                } else {
                    "BAD_REQUEST"
                };
                ErrorResponse::new(code, err.body_text()).into_response_with(status)
            },
            EnrichApiError::BadRequest(message) => {
                ErrorResponse::new("BAD_REQUEST", message).into_response_with(StatusCode::BAD_REQUEST)
            },
            EnrichApiError::Enrich(
                ref err @ (EnrichFileError::FileRequired | EnrichFileError::UnsupportedFile(_)),
            ) => ErrorResponse::new("VALIDATION_ERROR", err.to_string())
                .into_response_with(StatusCode::BAD_REQUEST),
            EnrichApiError::Enrich(EnrichFileError::Enrich(
                ref err @ EnrichError::MissingColumn { ref available, .. },
            )) => ErrorResponse::with_details(
                "MISSING_COLUMN",
                err.to_string(),
                json!({ "available": available }),
            )
            .into_response_with(StatusCode::BAD_REQUEST),
            EnrichApiError::Enrich(EnrichFileError::Enrich(
                ref err @ EnrichError::MalformedUpload { .. },
            )) => ErrorResponse::new("MALFORMED_UPLOAD", err.to_string())
                .into_response_with(StatusCode::BAD_REQUEST),
            EnrichApiError::Enrich(EnrichFileError::Enrich(
                ref err @ EnrichError::UnreadableWorkbook(_),
            )) => ErrorResponse::new("UNREADABLE_WORKBOOK", err.to_string())
                .into_response_with(StatusCode::UNPROCESSABLE_ENTITY),
            EnrichApiError::Enrich(EnrichFileError::Enrich(err)) => {
                tracing::error!("Enrichment failed: {}", err);
                ErrorResponse::new("INTERNAL_ERROR", "The workbook could not be enriched")
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            },
            EnrichApiError::Internal(message) => {
                tracing::error!("Internal error during enrichment: {}", message);
                ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred")
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use bdaddr_common::RunSummary;

    fn status_of(err: EnrichApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_missing_column_is_bad_request() {
        let err = EnrichApiError::Enrich(EnrichFileError::Enrich(EnrichError::missing_column(
            "Address",
            &["Name".to_string()],
        )));
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unreadable_workbook_is_unprocessable() {
        let err = EnrichApiError::Enrich(EnrichFileError::Enrich(EnrichError::unreadable(
            "not a zip archive",
        )));
        assert_eq!(status_of(err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_validation_errors_are_bad_request() {
        assert_eq!(
            status_of(EnrichApiError::Enrich(EnrichFileError::FileRequired)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(EnrichApiError::BadRequest("unknown mode".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_summary_header_escapes_non_ascii() {
        let mut summary = RunSummary::default();
        summary.warn("Malformed cache file: missing the 'ঠিকানা' column 😀");

        let value = header_json(&summary).unwrap();
        assert!(value.is_ascii());
        assert!(value.contains("\\u09a0"));
        assert!(axum::http::HeaderValue::from_str(&value).is_ok());

        let decoded: serde_json::Value = serde_json::from_str(&value).unwrap();
        assert_eq!(decoded["warnings"][0], summary.warnings[0].as_str());
    }

    #[test]
    fn test_io_failures_are_internal() {
        let err = EnrichApiError::Enrich(EnrichFileError::Enrich(EnrichError::Io(
            std::io::Error::other("disk full"),
        )));
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
