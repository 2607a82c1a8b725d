//! OpenStreetMap Nominatim client

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use bdaddr_common::Resolution;

use super::{AddressResolver, RateLimiter, ResolveError};
use crate::config::ResolverConfig;
use crate::normalize::{title_case, transliterate_bangla};

const DISTRICT_KEYS: &[&str] = &["state_district", "district", "county", "state"];

const THANA_KEYS: &[&str] = &[
    "suburb",
    "neighbourhood",
    "city_district",
    "municipality",
    "borough",
    "town",
    "city",
    "village",
    "police",
];

const MIN_QUERY_CHARS: usize = 3;

#[derive(Debug, Deserialize)]
struct Place {
    #[serde(default)]
    address: HashMap<String, serde_json::Value>,
}

impl Place {
    fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.address.get(*key)?.as_str())
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(title_case)
    }

    fn resolution(&self) -> Resolution {
        Resolution::new(self.first_of(DISTRICT_KEYS), self.first_of(THANA_KEYS))
    }
}

/// Geocoder backed by a Nominatim `/search` endpoint, restricted to Bangladesh
pub struct NominatimResolver {
    client: Client,
    search_url: String,
    limiter: RateLimiter,
}

impl NominatimResolver {
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolveError> {
        config
            .validate()
            .map_err(|err| ResolveError::Config(err.to_string()))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            search_url: format!("{}/search", config.base_url.trim_end_matches('/')),
            limiter: RateLimiter::new(config.min_interval),
        })
    }

    async fn search(&self, query: &str) -> Result<Option<Resolution>, ResolveError> {
        self.limiter.wait().await;

        let response = self
            .client
            .get(&self.search_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("addressdetails", "1"),
                ("countrycodes", "bd"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ResolveError::Status {
                status: response.status().as_u16(),
                query: query.to_string(),
            });
        }

        let places: Vec<Place> = response.json().await?;
        Ok(places
            .first()
            .map(Place::resolution)
            .filter(|resolution| !resolution.is_empty()))
    }
}

#[async_trait]
impl AddressResolver for NominatimResolver {
    #[instrument(skip(self))]
    async fn resolve(&self, address: &str) -> Result<Option<Resolution>, ResolveError> {
        let mut last_error = None;
        let mut answered = false;

        for query in query_variants(address) {
            match self.search(&query).await {
                Ok(Some(resolution)) => {
                    debug!(query = %query, ?resolution, "Nominatim match");
                    return Ok(Some(resolution));
                },
                Ok(None) => answered = true,
                Err(err) => {
                    warn!(query = %query, error = %err, "Nominatim query failed");
                    last_error = Some(err);
                },
            }
        }

        match last_error {
            Some(err) if !answered => Err(err),
            _ => Ok(None),
        }
    }
}

/// Queries tried in order for one address.
///
/// Blank and very short queries are skipped, as are repeats.
pub fn query_variants(address: &str) -> Vec<String> {
    let raw = address.trim();
    let with_country = if raw.to_lowercase().contains("bangladesh") {
        raw.to_string()
    } else {
        format!("{raw}, Bangladesh")
    };
    let without_commas = raw.replace(',', " ").split_whitespace().collect::<Vec<_>>().join(" ");

    let candidates = [
        raw.to_string(),
        transliterate_bangla(raw),
        with_country,
        format!("{without_commas}, Bangladesh"),
    ];

    let mut variants: Vec<String> = Vec::new();
    for candidate in candidates {
        let candidate = candidate.trim().to_string();
        if candidate.chars().count() < MIN_QUERY_CHARS || variants.contains(&candidate) {
            continue;
        }
        variants.push(candidate);
    }

    // A blank address must not reach the network even with the suffix.
    if raw.chars().count() < MIN_QUERY_CHARS {
        variants.clear();
    }
    variants
}
