//! Offline gazetteer matching
//!
//! Every gazetteer name is scored against the normalized address:
//!
//! - `1.0` when the name occurs as a whole-word phrase
//! - otherwise the best normalized Levenshtein similarity against address
//!   windows with the same number of words, plus space-free comparisons with
//!   windows one word shorter or longer ("notunbazar" vs "notun bazar")
//!
//! Among equal scores an entry in the district named by the address wins,
//! then a name equal to the whole address, then the longer phrase ("mirpur 10"
//! over "mirpur"), then the entry loaded first. A district written in the
//! address overrides the district of the matched area. Without an area hit
//! the district list is scored the same way.

use std::cmp::Ordering;

use strsim::normalized_levenshtein;
use tracing::trace;

use bdaddr_common::Resolution;

use crate::error::{EnrichError, Result};
use crate::gazetteer::{DistrictName, Gazetteer};
use crate::normalize::{compact, normalize, tokens};

/// Default minimum similarity for a match
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    pub threshold: f64,
}

impl MatcherConfig {
    pub fn new(threshold: f64) -> Result<Self> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(EnrichError::Config(format!(
                "match threshold must be in (0, 1], got {threshold}"
            )));
        }
        Ok(Self { threshold })
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

/// A successful offline match
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub resolution: Resolution,
    pub score: f64,
    /// The normalized gazetteer name that matched
    pub matched_name: String,
}

pub struct Matcher {
    gazetteer: Gazetteer,
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(gazetteer: Gazetteer, config: MatcherConfig) -> Self {
        Self { gazetteer, config }
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    pub fn config(&self) -> MatcherConfig {
        self.config
    }

    /// Match a raw address, returning `None` when nothing reaches the threshold
    pub fn match_address(&self, raw: &str) -> Option<MatchOutcome> {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return None;
        }
        let address = AddressWindows::new(&normalized);
        let named = self.named_district(&address);

        let area = best_of(
            self.gazetteer
                .entries()
                .iter()
                .map(|entry| (entry, entry.names())),
            |entry, name| {
                let in_district = named.is_some_and(|d| d.is_named(&normalize(&entry.district)));
                address.rank(name, in_district)
            },
        );
        if let Some((entry, rank, name)) = area {
            if rank.score >= self.config.threshold {
                let district = match named {
                    Some(named) if !rank.in_district => named.name.as_str(),
                    _ => entry.district.as_str(),
                };
                trace!(
                    address = raw,
                    matched = name,
                    score = rank.score,
                    district,
                    "Matched gazetteer entry"
                );
                return Some(MatchOutcome {
                    resolution: Resolution::complete(district, &entry.thana),
                    score: rank.score,
                    matched_name: name.to_string(),
                });
            }
        }

        let district = best_of(
            self.gazetteer
                .districts()
                .iter()
                .map(|district| (district, district.names())),
            |_, name| address.rank(name, false),
        );
        match district {
            Some((district, rank, name)) if rank.score >= self.config.threshold => {
                trace!(address = raw, matched = name, score = rank.score, "Matched district only");
                Some(MatchOutcome {
                    resolution: Resolution::district_only(&district.name),
                    score: rank.score,
                    matched_name: name.to_string(),
                })
            },
            _ => None,
        }
    }

    /// District/thana found offline; empty when nothing matched
    pub fn resolve(&self, raw: &str) -> Resolution {
        self.match_address(raw)
            .map(|outcome| outcome.resolution)
            .unwrap_or_default()
    }

    /// A district spelled out word for word in the address
    fn named_district(&self, address: &AddressWindows<'_>) -> Option<&DistrictName> {
        self.gazetteer
            .districts()
            .iter()
            .find(|district| district.names().any(|name| address.contains_phrase(name)))
    }
}

/// How well one gazetteer name fits an address; compared field by field
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rank {
    score: f64,
    /// The candidate belongs to the district named in the address
    in_district: bool,
    /// The name is the whole address
    whole: bool,
    /// Words covered by a phrase hit, 0 for fuzzy matches
    width: usize,
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(
            self.score
                .total_cmp(&other.score)
                .then(self.in_district.cmp(&other.in_district))
                .then(self.whole.cmp(&other.whole))
                .then(self.width.cmp(&other.width)),
        )
    }
}

/// Highest-ranked candidate; the earliest wins a tie
fn best_of<'a, T, N>(
    candidates: impl Iterator<Item = (&'a T, N)>,
    rank: impl Fn(&T, &str) -> Rank,
) -> Option<(&'a T, Rank, &'a str)>
where
    T: 'a,
    N: Iterator<Item = &'a str>,
{
    let mut best: Option<(&'a T, Rank, &'a str)> = None;
    for (candidate, names) in candidates {
        for name in names {
            let current = rank(candidate, name);
            if best.map_or(true, |(_, top, _)| current > top) {
                best = Some((candidate, current, name));
            }
        }
    }
    best
}

/// A normalized address prepared for repeated scoring
struct AddressWindows<'a> {
    normalized: &'a str,
    padded: String,
    tokens: Vec<&'a str>,
}

impl<'a> AddressWindows<'a> {
    fn new(normalized: &'a str) -> Self {
        Self {
            normalized,
            padded: format!(" {normalized} "),
            tokens: tokens(normalized),
        }
    }

    fn contains_phrase(&self, name: &str) -> bool {
        !name.is_empty() && self.padded.contains(&format!(" {name} "))
    }

    fn rank(&self, name: &str, in_district: bool) -> Rank {
        let phrase = self.contains_phrase(name);
        Rank {
            score: if phrase { 1.0 } else { self.fuzzy_score(name) },
            in_district,
            whole: name == self.normalized,
            width: if phrase { tokens(name).len() } else { 0 },
        }
    }

    fn fuzzy_score(&self, name: &str) -> f64 {
        if name.is_empty() || self.tokens.is_empty() {
            return 0.0;
        }

        let width = tokens(name).len();
        let name_compact = compact(name);
        let mut best = 0.0_f64;

        for size in width.saturating_sub(1).max(1)..=width + 1 {
            if size > self.tokens.len() {
                break;
            }
            for window in self.tokens.windows(size) {
                let joined = window.join(" ");
                if size == width {
                    best = best.max(normalized_levenshtein(name, &joined));
                }
                best = best.max(normalized_levenshtein(&name_compact, &compact(&joined)));
            }
        }
        best
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::gazetteer::{DistrictName, GazetteerEntry};

    fn entry(name: &str, district: &str, thana: &str, aliases: &[&str]) -> GazetteerEntry {
        GazetteerEntry {
            canonical_name: name.to_string(),
            district: district.to_string(),
            thana: thana.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn small_matcher() -> Matcher {
        let gazetteer = Gazetteer::new(
            vec![
                entry("mirpur", "Dhaka", "Mirpur", &[]),
                entry("notun bazar", "Dhaka", "Notun Bazar", &[]),
                entry("kotwali", "Chattogram", "Kotwali", &[]),
                entry("kotwali", "Sylhet", "Kotwali", &[]),
            ],
            vec![
                DistrictName::new("Dhaka", &[]),
                DistrictName::new("Bogura", &["bogra"]),
            ],
        );
        Matcher::new(gazetteer, MatcherConfig::default())
    }

    #[test]
    fn test_exact_phrase_match() {
        let outcome = small_matcher().match_address("Mirpur, Dhaka").unwrap();
        assert_eq!(outcome.resolution, Resolution::complete("Dhaka", "Mirpur"));
        assert_eq!(outcome.score, 1.0);
        assert_eq!(outcome.matched_name, "mirpur");
    }

    #[test]
    fn test_fuzzy_match_with_typo() {
        let resolution = small_matcher().resolve("House 5, Mirpurr 10");
        assert_eq!(resolution, Resolution::complete("Dhaka", "Mirpur"));
    }

    #[test]
    fn test_space_free_comparison() {
        let resolution = small_matcher().resolve("Notunbazar, Badda");
        assert_eq!(resolution.thana.as_deref(), Some("Notun Bazar"));
    }

    #[test]
    fn test_tie_goes_to_first_entry() {
        let resolution = small_matcher().resolve("Kotwali");
        assert_eq!(resolution.district.as_deref(), Some("Chattogram"));
    }

    #[test]
    fn test_longer_phrase_beats_shorter_overlap() {
        let gazetteer = Gazetteer::new(
            vec![
                entry("mirpur", "Dhaka", "Mirpur", &[]),
                entry("mirpur 10", "Dhaka", "Pallabi", &[]),
            ],
            vec![DistrictName::new("Dhaka", &[])],
        );
        let matcher = Matcher::new(gazetteer, MatcherConfig::default());

        let outcome = matcher.match_address("Mirpur 10").unwrap();
        assert_eq!(outcome.resolution, Resolution::complete("Dhaka", "Pallabi"));
        assert_eq!(outcome.matched_name, "mirpur 10");
        assert_eq!(
            matcher.resolve("House 3, Road 2, Mirpur 10, Dhaka"),
            Resolution::complete("Dhaka", "Pallabi")
        );
        assert_eq!(matcher.resolve("Mirpur 2"), Resolution::complete("Dhaka", "Mirpur"));
    }

    #[test]
    fn test_exact_name_from_user_csv() {
        let csv = "thana,district\nSavar,Dhaka\nSavar Cantonment,Dhaka Cantt\n";
        let gazetteer = Gazetteer::from_reader(csv.as_bytes()).unwrap();
        let matcher = Matcher::new(gazetteer, MatcherConfig::default());

        assert_eq!(
            matcher.resolve("Savar Cantonment"),
            Resolution::complete("Dhaka Cantt", "Savar Cantonment")
        );
        assert_eq!(matcher.resolve("Savar Bazar"), Resolution::complete("Dhaka", "Savar"));
    }

    #[test]
    fn test_named_district_picks_its_entry() {
        let gazetteer = Gazetteer::new(
            vec![
                entry("kotwali", "Chattogram", "Kotwali", &[]),
                entry("kotwali", "Sylhet", "Kotwali", &[]),
            ],
            vec![
                DistrictName::new("Chattogram", &["chittagong"]),
                DistrictName::new("Sylhet", &[]),
            ],
        );
        let matcher = Matcher::new(gazetteer, MatcherConfig::default());

        assert_eq!(
            matcher.resolve("Zindabazar, Kotwali, Sylhet"),
            Resolution::complete("Sylhet", "Kotwali")
        );
        assert_eq!(
            matcher.resolve("Kotwali, Chittagong"),
            Resolution::complete("Chattogram", "Kotwali")
        );
    }

    #[test]
    fn test_named_district_overrides_area_district() {
        let matcher = Matcher::new(Gazetteer::bundled().unwrap(), MatcherConfig::default());

        assert_eq!(
            matcher.resolve("Mirpur, Kushtia"),
            Resolution::complete("Kushtia", "Mirpur")
        );
        assert_eq!(matcher.resolve("Mirpur, Dhaka"), Resolution::complete("Dhaka", "Mirpur"));
    }

    #[test]
    fn test_district_only_fallback() {
        let resolution = small_matcher().resolve("Satmatha, Bogra");
        assert_eq!(resolution, Resolution::district_only("Bogura"));
    }

    #[test]
    fn test_below_threshold_is_unresolved() {
        let matcher = small_matcher();
        assert!(matcher.match_address("Agrabad Access Road").is_none());
        assert!(matcher.resolve("").is_empty());
    }

    #[test]
    fn test_threshold_is_configurable() {
        let gazetteer = Gazetteer::new(vec![entry("mirpur", "Dhaka", "Mirpur", &[])], vec![]);
        let strict = Matcher::new(gazetteer.clone(), MatcherConfig::new(1.0).unwrap());
        let loose = Matcher::new(gazetteer, MatcherConfig::new(0.6).unwrap());

        assert!(strict.match_address("Mirpor").is_none());
        assert!(loose.match_address("Mirpor").is_some());
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(MatcherConfig::new(0.0).is_err());
        assert!(MatcherConfig::new(1.5).is_err());
        assert!(MatcherConfig::new(f64::NAN).is_err());
    }

    #[test]
    fn test_bundled_gazetteer_examples() {
        let matcher = Matcher::new(Gazetteer::bundled().unwrap(), MatcherConfig::default());

        assert_eq!(
            matcher.resolve("Road 11, Banani, Dhaka-1213"),
            Resolution::complete("Dhaka", "Banani")
        );
        assert_eq!(
            matcher.resolve("Zindabazar, Kotwali, Sylhet"),
            Resolution::complete("Sylhet", "Kotwali")
        );
        assert_eq!(
            matcher.resolve("Kotwali, Chattogram"),
            Resolution::complete("Chattogram", "Kotwali")
        );
        assert_eq!(
            matcher.resolve("বাড্ডা, ঢাকা"),
            Resolution::complete("Dhaka", "Badda")
        );
        assert_eq!(matcher.resolve("College Road, Jessore"), Resolution::district_only("Jashore"));
    }

    #[test]
    fn test_matching_is_deterministic() {
        let matcher = small_matcher();
        let first = matcher.match_address("Mirpor 2, Dhaka");
        let second = matcher.match_address("Mirpor 2, Dhaka");
        assert_eq!(first, second);
    }
}
