//! Common types used across the address enricher

use serde::{Deserialize, Serialize};

use crate::error::BdAddrError;

/// Label written to the output workbook for a field that could not be resolved.
pub const UNRESOLVED_LABEL: &str = "Not found";

/// How rows are resolved during an enrichment run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnrichMode {
    /// Offline matching first, online lookup for whatever is still missing
    #[default]
    Auto,
    /// Gazetteer matching only, never touches the cache or the network
    Offline,
    /// Cache, then the geocoding service
    Online,
}

impl EnrichMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EnrichMode::Auto => "auto",
            EnrichMode::Offline => "offline",
            EnrichMode::Online => "online",
        }
    }

    /// Whether this mode runs the gazetteer matcher
    pub fn uses_matcher(self) -> bool {
        matches!(self, EnrichMode::Auto | EnrichMode::Offline)
    }

    /// Whether this mode may consult the cache and the geocoding service
    pub fn uses_online(self) -> bool {
        matches!(self, EnrichMode::Auto | EnrichMode::Online)
    }
}

impl std::str::FromStr for EnrichMode {
    type Err = BdAddrError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(EnrichMode::Auto),
            "offline" => Ok(EnrichMode::Offline),
            "online" => Ok(EnrichMode::Online),
            other => Err(BdAddrError::InvalidMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for EnrichMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which stage produced a row's district/thana
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    Offline,
    Cache,
    Online,
    None,
}

impl ResolutionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionSource::Offline => "offline",
            ResolutionSource::Cache => "cache",
            ResolutionSource::Online => "online",
            ResolutionSource::None => "none",
        }
    }
}

impl std::fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (possibly partial) district/thana pair.
///
/// Either field may be missing: an address can name its district without any
/// recognizable thana, and geocoders often return only one of the two.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub district: Option<String>,
    pub thana: Option<String>,
}

impl Resolution {
    /// Build a resolution, treating blank strings as unresolved
    pub fn new(district: Option<String>, thana: Option<String>) -> Self {
        Self {
            district: district.filter(|d| !d.trim().is_empty()),
            thana: thana.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn complete(district: impl Into<String>, thana: impl Into<String>) -> Self {
        Self::new(Some(district.into()), Some(thana.into()))
    }

    pub fn district_only(district: impl Into<String>) -> Self {
        Self::new(Some(district.into()), None)
    }

    pub fn is_complete(&self) -> bool {
        self.district.is_some() && self.thana.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.district.is_none() && self.thana.is_none()
    }

    /// Fill fields that are still missing from `other`.
    ///
    /// Returns true when at least one field was filled.
    pub fn fill_missing(&mut self, other: &Resolution) -> bool {
        let mut filled = false;
        if self.district.is_none() && other.district.is_some() {
            self.district = other.district.clone();
            filled = true;
        }
        if self.thana.is_none() && other.thana.is_some() {
            self.thana = other.thana.clone();
            filled = true;
        }
        filled
    }

    /// District for display, or the unresolved label
    pub fn district_label(&self) -> &str {
        self.district.as_deref().unwrap_or(UNRESOLVED_LABEL)
    }

    /// Thana for display, or the unresolved label
    pub fn thana_label(&self) -> &str {
        self.thana.as_deref().unwrap_or(UNRESOLVED_LABEL)
    }
}

/// One row of the persisted address cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Raw address (trimmed), unique key
    pub address: String,
    /// Empty when the district is unknown
    pub district: String,
    /// Empty when the thana is unknown
    pub thana: String,
}

impl CacheRecord {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(Some(self.district.clone()), Some(self.thana.clone()))
    }
}

/// Per-run counters reported back to the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_rows: usize,
    pub offline: usize,
    pub cache: usize,
    pub online: usize,
    pub unresolved: usize,
    /// Non-fatal problems hit while loading optional inputs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl RunSummary {
    pub fn record(&mut self, source: ResolutionSource) {
        self.total_rows += 1;
        match source {
            ResolutionSource::Offline => self.offline += 1,
            ResolutionSource::Cache => self.cache += 1,
            ResolutionSource::Online => self.online += 1,
            ResolutionSource::None => self.unresolved += 1,
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Rows resolved by any stage
    pub fn resolved(&self) -> usize {
        self.total_rows - self.unresolved
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("auto".parse::<EnrichMode>().unwrap(), EnrichMode::Auto);
        assert_eq!("OFFLINE".parse::<EnrichMode>().unwrap(), EnrichMode::Offline);
        assert_eq!(" Online ".parse::<EnrichMode>().unwrap(), EnrichMode::Online);
        assert_eq!("".parse::<EnrichMode>().unwrap(), EnrichMode::Auto);
        assert!(matches!(
            "fast".parse::<EnrichMode>(),
            Err(BdAddrError::InvalidMode(m)) if m == "fast"
        ));
    }

    #[test]
    fn test_mode_stages() {
        assert!(EnrichMode::Offline.uses_matcher());
        assert!(!EnrichMode::Offline.uses_online());
        assert!(!EnrichMode::Online.uses_matcher());
        assert!(EnrichMode::Online.uses_online());
        assert!(EnrichMode::Auto.uses_matcher() && EnrichMode::Auto.uses_online());
    }

    #[test]
    fn test_resolution_blank_fields_are_unresolved() {
        let resolution = Resolution::new(Some("  ".to_string()), Some("Mirpur".to_string()));
        assert_eq!(resolution.district, None);
        assert_eq!(resolution.thana.as_deref(), Some("Mirpur"));
        assert!(!resolution.is_complete());
        assert_eq!(resolution.district_label(), crate::UNRESOLVED_LABEL);
        assert_eq!(crate::UNRESOLVED_LABEL, "Not found");
    }

    #[test]
    fn test_fill_missing_keeps_existing_fields() {
        let mut resolution = Resolution::district_only("Dhaka");
        let filled = resolution.fill_missing(&Resolution::complete("Gazipur", "Tongi"));

        assert!(filled);
        assert_eq!(resolution, Resolution::complete("Dhaka", "Tongi"));
        assert!(!resolution.fill_missing(&Resolution::complete("Khulna", "Sonadanga")));
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = RunSummary::default();
        summary.record(ResolutionSource::Offline);
        summary.record(ResolutionSource::Cache);
        summary.record(ResolutionSource::None);

        assert_eq!(summary.total_rows, 3);
        assert_eq!(summary.resolved(), 2);
        assert_eq!(summary.unresolved, 1);
    }
}
