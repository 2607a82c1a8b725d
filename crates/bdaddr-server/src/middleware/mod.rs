//! Middleware for the enrichment server
//!
//! - CORS (Cross-Origin Resource Sharing)
//! - Request logging with tracing

use axum::http::{header, HeaderName, Method};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::CorsConfig;

/// Response header carrying the JSON run summary of an enrichment
pub const SUMMARY_HEADER: &str = "x-enrich-summary";

/// Create CORS layer from configuration
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
            header::CONTENT_LANGUAGE,
            header::CONTENT_TYPE,
        ])
        .expose_headers([
            header::CONTENT_DISPOSITION,
            HeaderName::from_static(SUMMARY_HEADER),
        ])
        .max_age(Duration::from_secs(3600));

    // Credentials cannot be combined with a wildcard origin.
    if config.allowed_origins.is_empty() || config.allowed_origins.iter().any(|o| o == "*") {
        if config.allow_credentials {
            tracing::warn!("CORS credentials are ignored when all origins are allowed");
        }
        return cors.allow_origin(Any);
    }

    let origins: Vec<_> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    cors.allow_origin(origins)
        .allow_credentials(config.allow_credentials)
}

/// Create tracing/logging layer
pub fn tracing_layer(
) -> TraceLayer<tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>>
{
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(tower_http::LatencyUnit::Millis),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    fn app(config: &CorsConfig) -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(cors_layer(config))
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/ping")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_cors_allows_listed_origin() {
        let config = CorsConfig {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "https://example.com".to_string(),
            ],
            allow_credentials: true,
        };

        let response = app(&config).oneshot(preflight("https://example.com")).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://example.com"
        );
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn test_cors_rejects_unlisted_origin() {
        let config = CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allow_credentials: false,
        };

        let response = app(&config).oneshot(preflight("https://evil.example")).await.unwrap();
        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_cors_wildcard_drops_credentials() {
        let config = CorsConfig {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: true,
        };

        let response = app(&config).oneshot(preflight("https://anywhere.example")).await.unwrap();
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .is_none());
    }

    #[tokio::test]
    async fn test_cors_with_empty_origins_allows_any() {
        let config = CorsConfig {
            allowed_origins: vec![],
            allow_credentials: false,
        };

        let response = app(&config).oneshot(preflight("http://localhost:5173")).await.unwrap();
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
