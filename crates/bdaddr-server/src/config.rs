//! Configuration management

use std::path::PathBuf;

use bdaddr_enrich::EnrichConfig;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default upload limit for one request (25 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Default location of the persisted address cache.
pub const DEFAULT_CACHE_PATH: &str = "cache_geocode.csv";

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub enrich: EnrichConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    pub max_upload_bytes: usize,
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Files the server reads at start
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Loaded at start, written after every run and at shutdown
    pub cache_path: PathBuf,
    /// Replaces the bundled gazetteer when set
    pub gazetteer_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("BDADDR_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: std::env::var("BDADDR_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: std::env::var("BDADDR_SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
                max_upload_bytes: std::env::var("BDADDR_MAX_UPLOAD_BYTES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: std::env::var("CORS_ALLOW_CREDENTIALS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(false),
            },
            storage: StorageConfig {
                cache_path: std::env::var("BDADDR_CACHE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_CACHE_PATH)),
                gazetteer_path: std::env::var("BDADDR_GAZETTEER_PATH")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .map(PathBuf::from),
            },
            enrich: EnrichConfig::from_env()?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.server.max_upload_bytes == 0 {
            anyhow::bail!("Upload limit must be greater than 0");
        }

        if self.storage.cache_path.as_os_str().is_empty() {
            anyhow::bail!("Cache path cannot be empty");
        }

        if let Some(path) = &self.storage.gazetteer_path {
            if !path.is_file() {
                anyhow::bail!("Gazetteer file {} does not exist", path.display());
            }
        }

        self.enrich.resolver.validate()?;

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: false,
            },
            storage: StorageConfig {
                cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
                gazetteer_path: None,
            },
            enrich: EnrichConfig::default(),
        }
    }
}
