//! Place-name gazetteer
//!
//! Maps known area names (and their variant spellings) to a district/thana
//! pair, and carries the district list used when no area is recognized.
//!
//! The bundled data ships with the crate. A user-supplied CSV replaces the
//! area entries but keeps the bundled district list. Accepted columns:
//!
//! | column | required | meaning |
//! |---|---|---|
//! | `district` | yes | district display name |
//! | `thana`, `upazila` or `area` | yes | thana display name |
//! | `name` | no | name matched against addresses, defaults to the thana |
//! | `alias*` | no | extra spellings, several per cell separated by `\|` |

use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{EnrichError, Result};
use crate::normalize::{normalize, title_case};

/// Bundled area gazetteer, also served as the downloadable sample
pub const BUNDLED_GAZETTEER_CSV: &str = include_str!("../data/gazetteer.csv");

const BUNDLED_DISTRICTS_CSV: &str = include_str!("../data/districts.csv");

const THANA_COLUMNS: &[&str] = &["thana", "upazila", "area"];

/// A known area name and the administrative units it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GazetteerEntry {
    /// Normalized name matched against addresses
    pub canonical_name: String,
    pub district: String,
    pub thana: String,
    /// Normalized alternative spellings
    pub aliases: Vec<String>,
}

impl GazetteerEntry {
    /// Canonical name followed by the aliases
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical_name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// A district with the spellings it is known by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistrictName {
    /// Display name
    pub name: String,
    normalized: String,
    /// Normalized alternative spellings
    pub aliases: Vec<String>,
}

impl DistrictName {
    pub fn new(name: impl Into<String>, aliases: &[&str]) -> Self {
        let name = name.into();
        let normalized = normalize(&name);
        let aliases = normalized_aliases(aliases.iter().copied(), &normalized);
        Self {
            name,
            normalized,
            aliases,
        }
    }

    /// Normalized name followed by the aliases
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.normalized.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Whether a normalized district string names this district
    pub fn is_named(&self, normalized: &str) -> bool {
        self.names().any(|name| name == normalized)
    }
}

/// Immutable lookup table; entry order is significant for tie-breaking
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    entries: Vec<GazetteerEntry>,
    districts: Vec<DistrictName>,
}

impl Gazetteer {
    pub fn new(entries: Vec<GazetteerEntry>, districts: Vec<DistrictName>) -> Self {
        Self { entries, districts }
    }

    /// The gazetteer compiled into the binary
    pub fn bundled() -> Result<Self> {
        let entries = parse_entries(BUNDLED_GAZETTEER_CSV.as_bytes())?;
        let districts = bundled_districts()?;
        Ok(Self::new(entries, districts))
    }

    /// Parse a user CSV; the district list stays the bundled one
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let entries = parse_entries(reader)?;
        let districts = bundled_districts()?;
        debug!(entries = entries.len(), "Loaded gazetteer");
        Ok(Self::new(entries, districts))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Parse a user CSV, falling back to the bundled gazetteer when it is
    /// unusable. The second value carries the reason for a fallback.
    pub fn load_or_bundled<R: Read>(reader: R) -> Result<(Self, Option<String>)> {
        match Self::from_reader(reader) {
            Ok(gazetteer) => Ok((gazetteer, None)),
            Err(err @ (EnrichError::MalformedUpload { .. } | EnrichError::Csv(_))) => {
                warn!(error = %err, "Falling back to the bundled gazetteer");
                let message = format!("{err}; using the bundled gazetteer instead");
                Ok((Self::bundled()?, Some(message)))
            },
            Err(err) => Err(err),
        }
    }

    pub fn entries(&self) -> &[GazetteerEntry] {
        &self.entries
    }

    pub fn districts(&self) -> &[DistrictName] {
        &self.districts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn bundled_districts() -> Result<Vec<DistrictName>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BUNDLED_DISTRICTS_CSV.as_bytes());

    let mut districts = Vec::new();
    for record in reader.records() {
        let record = record?;
        let name = record.get(0).unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        let aliases: Vec<&str> = record.get(1).unwrap_or_default().split('|').collect();
        districts.push(DistrictName::new(name, &aliases));
    }
    Ok(districts)
}

fn parse_entries<R: Read>(reader: R) -> Result<Vec<GazetteerEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_lowercase())
        .collect();

    let position = |name: &str| headers.iter().position(|h| h == name);

    let district_col = position("district")
        .ok_or_else(|| EnrichError::malformed("gazetteer", "missing a 'district' column"))?;
    let thana_col = THANA_COLUMNS
        .iter()
        .find_map(|name| position(name))
        .ok_or_else(|| {
            EnrichError::malformed("gazetteer", "missing a 'thana', 'upazila' or 'area' column")
        })?;
    let name_col = position("name");
    let alias_cols: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.starts_with("alias"))
        .map(|(i, _)| i)
        .collect();

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record?;
        let district = record.get(district_col).unwrap_or_default();
        let thana = record.get(thana_col).unwrap_or_default();
        if district.is_empty() || thana.is_empty() {
            continue;
        }

        let name = name_col
            .and_then(|i| record.get(i))
            .filter(|n| !n.is_empty())
            .unwrap_or(thana);
        let canonical_name = normalize(name);
        if canonical_name.is_empty() {
            continue;
        }

        let raw_aliases = alias_cols
            .iter()
            .filter_map(|i| record.get(*i))
            .flat_map(|cell| cell.split('|'));
        let aliases = normalized_aliases(raw_aliases, &canonical_name);

        entries.push(GazetteerEntry {
            canonical_name,
            district: title_case(district),
            thana: title_case(thana),
            aliases,
        });
    }

    if entries.is_empty() {
        return Err(EnrichError::malformed("gazetteer", "no rows with both a district and a thana"));
    }

    Ok(entries)
}

fn normalized_aliases<'a>(raw: impl Iterator<Item = &'a str>, canonical: &str) -> Vec<String> {
    let mut aliases: Vec<String> = Vec::new();
    for alias in raw.map(normalize) {
        if !alias.is_empty() && alias != canonical && !aliases.contains(&alias) {
            aliases.push(alias);
        }
    }
    aliases
}
