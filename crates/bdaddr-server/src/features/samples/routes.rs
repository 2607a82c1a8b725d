//! Sample file routes
//!
//! - `GET /api/v1/samples/addresses` - An example input workbook

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use super::queries::{addresses::SAMPLE_FILE_NAME, SampleAddressesQuery};
use crate::api::response::ErrorResponse;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub fn samples_routes() -> Router {
    Router::new().route("/addresses", get(sample_addresses))
}

#[tracing::instrument]
async fn sample_addresses() -> Response {
    match super::queries::addresses::handle(SampleAddressesQuery) {
        Ok(response) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{SAMPLE_FILE_NAME}\""),
                ),
            ],
            response.workbook,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Failed to build the sample workbook: {}", err);
            ErrorResponse::new("INTERNAL_ERROR", "The sample workbook could not be built")
                .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
        },
    }
}
