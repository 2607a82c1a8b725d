//! Address enrichment server - main entry point

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use bdaddr_common::logging::{init_logging, LogConfig};
use bdaddr_enrich::{AddressCache, Gazetteer, NominatimResolver};
use tokio::signal;
use tracing::{info, warn};

use bdaddr_server::{config::Config, create_router, features::FeatureState};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("bdaddr-server")
        .filter_directives("bdaddr_server=debug,bdaddr_enrich=info,tower_http=debug")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting address enrichment server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let gazetteer = match &config.storage.gazetteer_path {
        Some(path) => Gazetteer::from_path(path)
            .with_context(|| format!("Failed to load gazetteer from {}", path.display()))?,
        None => Gazetteer::bundled()?,
    };
    info!(entries = gazetteer.len(), "Gazetteer loaded");

    let cache = AddressCache::load(&config.storage.cache_path).unwrap_or_else(|err| {
        warn!(
            path = %config.storage.cache_path.display(),
            error = %err,
            "Cache file is unusable, starting with an empty cache"
        );
        AddressCache::new()
    });

    let resolver = Arc::new(NominatimResolver::new(&config.enrich.resolver)?);
    info!(base_url = %config.enrich.resolver.base_url, "Online resolver ready");

    let state = FeatureState::new(gazetteer, config.enrich.matcher, resolver, cache)
        .with_cache_path(&config.storage.cache_path);

    let app = create_router(state.clone(), &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    state.save_cache().await?;
    info!("Server shut down gracefully");

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give ongoing requests time to complete
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
