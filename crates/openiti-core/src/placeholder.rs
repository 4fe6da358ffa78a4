//! Sentinel values that curators leave in templates ("Fulān", "none", ...).
//!
//! The rules are a table from field category to patterns; a value matching
//! any pattern of its category counts as absent. Patterns are
//! case-insensitive unless they opt out with `(?-i)`.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCategory {
    /// Author name components (shuhra, ism, nasab, ...)
    Name,
    Title,
    /// "based on" edition statement of a version
    Edition,
    Genre,
    Relation,
    Location,
    Manuscript,
    /// Raw values read from a text header
    HeaderValue,
}

const RULES: &[(FieldCategory, &[&str])] = &[
    (FieldCategory::Name, &["fulān", "none"]),
    (FieldCategory::Title, &["al-muʾallif", "none"]),
    (FieldCategory::Edition, &["^perma", "(?-i)^NO"]),
    (FieldCategory::Genre, &["^src"]),
    (FieldCategory::Relation, &["^URI of"]),
    (FieldCategory::Location, &["name of the institution", "none"]),
    (FieldCategory::Manuscript, &["none", "^shelfmark of"]),
    (FieldCategory::HeaderValue, &["(?-i)^NO"]),
];

static COMPILED: Lazy<HashMap<FieldCategory, Vec<Regex>>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|(category, patterns)| {
            let compiled = patterns
                .iter()
                .map(|p| {
                    RegexBuilder::new(p)
                        .case_insensitive(true)
                        .build()
                        .expect("valid placeholder pattern")
                })
                .collect();
            (*category, compiled)
        })
        .collect()
});

/// True if the value is empty or a known template sentinel.
pub fn is_placeholder(category: FieldCategory, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return true;
    }
    COMPILED
        .get(&category)
        .map(|rules| rules.iter().any(|re| re.is_match(value)))
        .unwrap_or(false)
}

/// The trimmed value, unless it is a placeholder.
pub fn real_value(category: FieldCategory, value: &str) -> Option<&str> {
    if is_placeholder(category, value) {
        None
    } else {
        Some(value.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_sentinels() {
        assert!(is_placeholder(FieldCategory::Name, "Fulān"));
        assert!(is_placeholder(FieldCategory::Name, "Abū Fulān"));
        assert!(is_placeholder(FieldCategory::Name, "NONE"));
        assert!(is_placeholder(FieldCategory::Name, "   "));
        assert_eq!(real_value(FieldCategory::Name, " al-Ǧāḥiẓ "), Some("al-Ǧāḥiẓ"));
    }

    #[test]
    fn test_case_sensitive_opt_out() {
        assert!(is_placeholder(FieldCategory::Edition, "NODATA"));
        assert!(!is_placeholder(FieldCategory::Edition, "Nouvelle édition, Paris"));
        assert!(is_placeholder(FieldCategory::Edition, "Permalink to the source"));
        assert!(is_placeholder(FieldCategory::HeaderValue, "NO DATA"));
    }

    #[test]
    fn test_categories_are_independent() {
        assert!(is_placeholder(FieldCategory::Title, "Kitāb al-Muʾallif"));
        assert!(!is_placeholder(FieldCategory::Name, "Kitāb al-Muʾallif"));
        assert!(is_placeholder(FieldCategory::Genre, "src@keyword"));
        assert!(is_placeholder(FieldCategory::Relation, "URI of the related book"));
        assert!(is_placeholder(FieldCategory::Location, "Name of the institution"));
    }
}
