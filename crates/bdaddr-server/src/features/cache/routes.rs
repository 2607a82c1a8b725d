//! Cache API routes
//!
//! - `GET /api/v1/cache` - Number of cached addresses
//! - `GET /api/v1/cache/export` - The cache as a CSV attachment

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::queries::{export::CACHE_FILE_NAME, CacheStatsQuery, ExportCacheError, ExportCacheQuery};
use crate::api::response::ErrorResponse;
use crate::features::FeatureState;

pub fn cache_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(cache_stats))
        .route("/export", get(export_cache))
}

/// `GET /api/v1/cache`
///
/// ```json
/// { "entries": 42 }
/// ```
#[tracing::instrument(skip(state))]
async fn cache_stats(State(state): State<FeatureState>) -> Response {
    let response = super::queries::stats::handle(state, CacheStatsQuery).await;
    (StatusCode::OK, Json(response)).into_response()
}

/// `GET /api/v1/cache/export`
#[tracing::instrument(skip(state))]
async fn export_cache(State(state): State<FeatureState>) -> Result<Response, CacheApiError> {
    let response = super::queries::export::handle(state, ExportCacheQuery).await?;

    tracing::debug!(entries = response.entries, "Cache exported via API");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CACHE_FILE_NAME}\""),
            ),
        ],
        response.csv,
    )
        .into_response())
}

#[derive(Debug)]
enum CacheApiError {
    ExportError(ExportCacheError),
}

impl From<ExportCacheError> for CacheApiError {
    fn from(err: ExportCacheError) -> Self {
        Self::ExportError(err)
    }
}

impl IntoResponse for CacheApiError {
    fn into_response(self) -> Response {
        match self {
            CacheApiError::ExportError(err) => {
                tracing::error!("Cache export failed: {}", err);
                ErrorResponse::new("INTERNAL_ERROR", "The cache could not be exported")
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            },
        }
    }
}
