//! Address enrichment server
//!
//! Web front end for the enrichment engine: upload a workbook, pick the
//! address column and a mode, and download the workbook with District and
//! Thana columns added.
//!
//! - **Features**: vertical slices under [`features`] (`enrich`, `cache`, `gazetteer`)
//! - **Configuration**: environment variables, optionally from `.env` ([`config`])
//! - **Middleware**: CORS and request tracing ([`middleware`])
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bdaddr_enrich::{AddressCache, Gazetteer, NominatimResolver};
//! use bdaddr_server::{config::Config, create_router, features::FeatureState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let resolver = Arc::new(NominatimResolver::new(&config.enrich.resolver)?);
//!     let state = FeatureState::new(
//!         Gazetteer::bundled()?,
//!         config.enrich.matcher,
//!         resolver,
//!         AddressCache::load(&config.storage.cache_path)?,
//!     );
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, create_router(state, &config)).await?;
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod config;
pub mod features;
pub mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::compression::CompressionLayer;

use crate::config::Config;
use crate::features::FeatureState;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Create the application router with all routes and middleware
pub fn create_router(state: FeatureState, config: &Config) -> Router {
    let feature_routes = features::router(state);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .nest("/api/v1", feature_routes)
        // Apply layers from innermost to outermost
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Upload page
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check handler
async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
