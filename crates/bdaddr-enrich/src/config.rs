//! Engine configuration
//!
//! Every setting has a default and can be overridden from the environment:
//!
//! - `BDADDR_MATCH_THRESHOLD` (default 0.85)
//! - `BDADDR_NOMINATIM_URL` (default the public OpenStreetMap instance)
//! - `BDADDR_USER_AGENT`
//! - `BDADDR_REQUEST_TIMEOUT_SECS` (default 20)
//! - `BDADDR_REQUEST_INTERVAL_MS` (default 1100, the public usage policy)

use std::str::FromStr;
use std::time::Duration;

use crate::error::{EnrichError, Result};
use crate::matcher::{MatcherConfig, DEFAULT_MATCH_THRESHOLD};

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "BD-Address-Enricher/1.1 (+https://github.com/noyonsoftworks/bd-address-enricher)";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_REQUEST_INTERVAL_MS: u64 = 1100;

/// Settings for the online geocoding service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Minimum gap between two requests
    pub min_interval: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            min_interval: Duration::from_millis(DEFAULT_REQUEST_INTERVAL_MS),
        }
    }
}

impl ResolverConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            base_url: std::env::var("BDADDR_NOMINATIM_URL").unwrap_or(defaults.base_url),
            user_agent: std::env::var("BDADDR_USER_AGENT").unwrap_or(defaults.user_agent),
            timeout: Duration::from_secs(env_or(
                "BDADDR_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            min_interval: Duration::from_millis(env_or(
                "BDADDR_REQUEST_INTERVAL_MS",
                DEFAULT_REQUEST_INTERVAL_MS,
            )?),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(EnrichError::Config(format!(
                "Nominatim URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(EnrichError::Config("User-Agent cannot be empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(EnrichError::Config("Request timeout must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Matcher and resolver settings together
#[derive(Debug, Clone, Default)]
pub struct EnrichConfig {
    pub matcher: MatcherConfig,
    pub resolver: ResolverConfig,
}

impl EnrichConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            matcher: MatcherConfig::new(env_or("BDADDR_MATCH_THRESHOLD", DEFAULT_MATCH_THRESHOLD)?)?,
            resolver: ResolverConfig::from_env()?,
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| EnrichError::Config(format!("{key} has an invalid value '{raw}'"))),
        Err(_) => Ok(default),
    }
}
