//! Address text normalization
//!
//! Turns a free-text address into a lowercase, punctuation-free,
//! space-separated string that the matcher can compare against gazetteer
//! names. Common Bangla place names are transliterated first and well-known
//! variant spellings are folded onto the spelling used by the gazetteer.

use std::sync::OnceLock;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Bangla-script place names and their English spelling
const BANGLA_PLACES: &[(&str, &str)] = &[
    ("ঢাকা", "Dhaka"),
    ("চট্টগ্রাম", "Chattogram"),
    ("কমিল্লা", "Comilla"),
    ("কুমিল্লা", "Comilla"),
    ("বগুড়া", "Bogura"),
    ("নরসিংদী", "Narsingdi"),
    ("নরায়ণগঞ্জ", "Narayanganj"),
    ("নারায়ণগঞ্জ", "Narayanganj"),
    ("সিলেট", "Sylhet"),
    ("খুলনা", "Khulna"),
    ("বরিশাল", "Barishal"),
    ("রাজশাহী", "Rajshahi"),
    ("কিশোরগঞ্জ", "Kishoreganj"),
    ("দিনাজপুর", "Dinajpur"),
    ("ফেনী", "Feni"),
    ("নোয়াখালী", "Noakhali"),
    ("লক্ষ্মীপুর", "Lakshmipur"),
    ("গাজীপুর", "Gazipur"),
    ("শ্যামলী", "Shyamoli"),
    ("গুলশান", "Gulshan"),
    ("বনানী", "Banani"),
    ("বানানী", "Banani"),
    ("উত্তরা", "Uttara"),
    ("বাড্ডা", "Badda"),
    ("মিরপুর", "Mirpur"),
    ("ধানমন্ডি", "Dhanmondi"),
    ("মতিঝিল", "Motijheel"),
    ("শাহবাগ", "Shahbag"),
];

/// Variant spellings rewritten on whole-word boundaries after punctuation is gone
const VARIANT_SPELLINGS: &[(&str, &str)] = &[
    ("dacca", "dhaka"),
    ("chittagong", "chattogram"),
    ("ctg", "chattogram"),
    ("barisal", "barishal"),
    ("cumilla", "comilla"),
    ("uttora", "uttara"),
    ("kotowali", "kotwali"),
    ("mohammad pur", "mohammadpur"),
    ("badda thana", "badda"),
    ("banani thana", "banani"),
];

/// Bangla table keys in NFC so that precomposed and decomposed input agree
fn bangla_places() -> &'static [(String, &'static str)] {
    static TABLE: OnceLock<Vec<(String, &'static str)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        BANGLA_PLACES
            .iter()
            .map(|(bangla, english)| (bangla.nfc().collect(), *english))
            .collect()
    })
}

/// Replace known Bangla place names with their English spelling.
///
/// Everything else, punctuation included, is left untouched.
pub fn transliterate_bangla(raw: &str) -> String {
    let mut text: String = raw.nfc().collect();
    for (bangla, english) in bangla_places() {
        if text.contains(bangla.as_str()) {
            text = text.replace(bangla.as_str(), english);
        }
    }
    text
}

/// Normalize an address (or a gazetteer name) for matching.
///
/// The result only contains lowercase ASCII letters, digits and single
/// spaces. Empty input yields an empty string.
pub fn normalize(raw: &str) -> String {
    let transliterated = transliterate_bangla(raw);

    let folded: String = transliterated
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();

    let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    rewrite_variants(&collapsed)
}

fn rewrite_variants(normalized: &str) -> String {
    if normalized.is_empty() {
        return String::new();
    }

    // Padding turns whole-word matching into plain substring matching.
    let mut padded = format!(" {normalized} ");
    for (variant, canonical) in VARIANT_SPELLINGS {
        let pattern = format!(" {variant} ");
        let replacement = format!(" {canonical} ");
        while padded.contains(&pattern) {
            padded = padded.replace(&pattern, &replacement);
        }
    }
    padded.trim().to_string()
}

/// Capitalize each word. Mixed-case strings are kept as written; all-caps
/// strings are recased.
///
/// Used for display values coming from lowercase CSVs or from the geocoder.
pub fn title_case(value: &str) -> String {
    let value = value.trim();
    let has_upper = value.chars().any(char::is_uppercase);
    let has_lower = value.chars().any(char::is_lowercase);
    if has_upper && has_lower {
        return value.to_string();
    }

    value
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a normalized string into its words
pub fn tokens(normalized: &str) -> Vec<&str> {
    normalized.split(' ').filter(|t| !t.is_empty()).collect()
}

/// Normalized string with the spaces removed ("notun bazar" -> "notunbazar")
pub fn compact(normalized: &str) -> String {
    normalized.chars().filter(|c| *c != ' ').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        assert_eq!(normalize("House 12, Road-5; Mirpur-10."), "house 12 road 5 mirpur 10");
        assert_eq!(normalize("  DHANMONDI   R/A  "), "dhanmondi r a");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("  ,.;  "), "");
    }

    #[test]
    fn test_strips_diacritics() {
        assert_eq!(normalize("Mirpür, Dhākā"), "mirpur dhaka");
    }

    #[test]
    fn test_transliterates_bangla() {
        assert_eq!(normalize("গুলশান, ঢাকা"), "gulshan dhaka");
        assert_eq!(transliterate_bangla("বাসা ১২, উত্তরা"), "বাসা ১২, Uttara");
    }

    #[test]
    fn test_unknown_bangla_is_dropped() {
        assert_eq!(normalize("বাসা ১২ Banani"), "banani");
    }

    #[test]
    fn test_rewrites_variant_spellings() {
        assert_eq!(normalize("Agrabad, Chittagong"), "agrabad chattogram");
        assert_eq!(normalize("CTG port"), "chattogram port");
        assert_eq!(normalize("Old Dacca"), "old dhaka");
        assert_eq!(normalize("Mohammad Pur, Dhaka"), "mohammadpur dhaka");
        assert_eq!(normalize("Badda Thana, Dhaka"), "badda dhaka");
        assert_eq!(normalize("Sector 4, Uttora"), "sector 4 uttara");
    }

    #[test]
    fn test_variants_only_match_whole_words() {
        assert_eq!(normalize("Ctgroad"), "ctgroad");
        assert_eq!(normalize("Barisalpur"), "barisalpur");
    }

    #[test]
    fn test_repeated_variants() {
        assert_eq!(normalize("ctg ctg"), "chattogram chattogram");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("south surma"), "South Surma");
        assert_eq!(title_case("  dhaka "), "Dhaka");
        assert_eq!(title_case("Bashundhara R/A"), "Bashundhara R/A");
        assert_eq!(title_case(""), "");
        assert_eq!(title_case("CHATTOGRAM"), "Chattogram");
        assert_eq!(title_case("COX'S BAZAR"), "Cox's Bazar");
    }

    #[test]
    fn test_tokens_and_compact() {
        let normalized = normalize("Notun Bazar, Dhaka");
        assert_eq!(tokens(&normalized), vec!["notun", "bazar", "dhaka"]);
        assert_eq!(compact("notun bazar"), "notunbazar");
        assert!(tokens("").is_empty());
    }
}
