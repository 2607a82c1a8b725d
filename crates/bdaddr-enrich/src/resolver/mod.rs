//! Online address resolution
//!
//! The pipeline only sees the [`AddressResolver`] trait, so tests can swap the
//! geocoding service for an in-memory double.

mod nominatim;

pub use nominatim::{query_variants, NominatimResolver};

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use bdaddr_common::Resolution;

/// Failure of every lookup attempt for one address
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Geocoding service answered {status} for '{query}'")]
    Status { status: u16, query: String },

    #[error("Invalid resolver configuration: {0}")]
    Config(String),
}

#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Look up one address.
    ///
    /// `Ok(None)` means the service answered but knew nothing about it.
    async fn resolve(&self, address: &str) -> Result<Option<Resolution>, ResolveError>;
}

/// Enforces a minimum gap between consecutive requests
pub struct RateLimiter {
    min_interval: Duration,
    last_tick: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_tick: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Sleep until the next request is allowed, then claim the slot
    pub async fn wait(&self) {
        let mut last_tick = self.last_tick.lock().await;
        if let Some(previous) = *last_tick {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last_tick = Some(Instant::now());
    }
}
