//! Gazetteer API routes
//!
//! - `GET /api/v1/gazetteer/sample` - The bundled gazetteer as a CSV attachment

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use super::queries::{sample::SAMPLE_FILE_NAME, GazetteerSampleQuery};

pub fn gazetteer_routes() -> Router {
    Router::new().route("/sample", get(gazetteer_sample))
}

#[tracing::instrument]
async fn gazetteer_sample() -> Response {
    let response = super::queries::sample::handle(GazetteerSampleQuery);

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{SAMPLE_FILE_NAME}\""),
            ),
        ],
        response.csv,
    )
        .into_response()
}
