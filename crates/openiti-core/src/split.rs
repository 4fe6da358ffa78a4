//! Texts too large for one file are split into lettered parts
//! (`...VolsA-ara1`, `...VolsB-ara1`). The parts are regrouped under their
//! common unlettered URI and summarised in one compound row.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::row::MetadataRow;
use crate::status::{Status, StatusTable};

static PART_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]-").expect("valid regex"));
static URL_PART_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z](-[a-z]{3}\d)").expect("valid regex"));

/// Compound URI of a part, `None` for an unsplit version.
pub fn compound_uri(version_uri: &str) -> Option<String> {
    PART_RE
        .is_match(version_uri)
        .then(|| PART_RE.replace(version_uri, "-").into_owned())
}

/// Compound URI -> part URIs, in walk order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct SplitIndex {
    groups: BTreeMap<String, Vec<String>>,
}

impl SplitIndex {
    /// Register `version_uri` if it is a part; `false` otherwise.
    pub fn add(&mut self, version_uri: &str) -> bool {
        let Some(compound) = compound_uri(version_uri) else {
            return false;
        };
        log::debug!("{} is part of split text {}", version_uri, compound);
        let parts = self.groups.entry(compound).or_default();
        if !parts.iter().any(|p| p == version_uri) {
            parts.push(version_uri.to_string());
        }
        true
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Parts to promote: all parts of a split text once any of them won its
    /// book group. Parts without a text file are never promoted.
    pub fn promoted_parts(&self, statuses: &StatusTable) -> Vec<String> {
        self.groups
            .values()
            .filter(|parts| parts.iter().any(|p| statuses.is_primary(p)))
            .flatten()
            .filter(|p| !statuses.is_excluded(p))
            .cloned()
            .collect()
    }
}

/// Synthetic row of a split text: the first part's metadata with summed
/// lengths, the part letter stripped from ID and URL. Always secondary.
pub fn compound_row(compound: &str, parts: &[&MetadataRow]) -> Option<MetadataRow> {
    let first = parts.first()?;
    let mut row = (*first).clone();
    row.version_uri = compound.to_string();
    row.id.pop();
    row.status = Status::Secondary;
    row.tok_length = parts.iter().map(|p| p.tok_length).sum();
    row.char_length = first
        .char_length
        .map(|_| parts.iter().filter_map(|p| p.char_length).sum());
    row.url = URL_PART_RE.replace(&row.url, "$1").into_owned();
    Some(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{resolve_all, Candidate};
    use crate::uri::Extension;

    fn part_row(uri: &str, id: &str, tokens: u64) -> MetadataRow {
        MetadataRow {
            version_uri: uri.to_string(),
            id: id.to_string(),
            tok_length: tokens,
            char_length: Some(tokens * 4),
            url: format!("data/{}.completed", uri),
            status: Status::Primary,
            ..Default::default()
        }
    }

    #[test]
    fn test_compound_uri() {
        assert_eq!(
            compound_uri("0310Tabari.Tarikh.ShamelaVolsA-ara1").as_deref(),
            Some("0310Tabari.Tarikh.ShamelaVols-ara1")
        );
        assert_eq!(compound_uri("0255Jahiz.Hayawan.Shamela0001-ara1"), None);
    }

    #[test]
    fn test_compound_row_sums_parts() {
        let a = part_row("0310Tabari.Tarikh.ShamelaVolsA-ara1", "ShamelaVolsA", 100);
        let b = part_row("0310Tabari.Tarikh.ShamelaVolsB-ara1", "ShamelaVolsB", 150);
        let row = compound_row("0310Tabari.Tarikh.ShamelaVols-ara1", &[&a, &b]).unwrap();
        assert_eq!(row.version_uri, "0310Tabari.Tarikh.ShamelaVols-ara1");
        assert_eq!(row.id, "ShamelaVols");
        assert_eq!(row.tok_length, 250);
        assert_eq!(row.char_length, Some(1000));
        assert_eq!(row.status, Status::Secondary);
        assert_eq!(row.url, "data/0310Tabari.Tarikh.ShamelaVols-ara1.completed");
        assert!(compound_row("x", &[]).is_none());
    }

    #[test]
    fn test_parts_promoted_only_when_one_wins() {
        let mut index = SplitIndex::default();
        assert!(index.add("b.VolsA-ara1"));
        assert!(index.add("b.VolsB-ara1"));
        assert!(index.add("b.VolsA-ara1"));
        assert!(!index.add("b.Other-ara1"));
        assert_eq!(index.len(), 1);

        let cand = |uri: &str, ext, length| Candidate {
            uri: uri.to_string(),
            extension: ext,
            length,
            declared_primary: false,
            low_priority: false,
            file_present: true,
        };
        let groups = BTreeMap::from([(
            "b".to_string(),
            vec![
                cand("b.VolsA-ara1", Extension::None, 100),
                cand("b.VolsB-ara1", Extension::None, 150),
            ],
        )]);
        let statuses = resolve_all(&groups);
        assert_eq!(
            index.promoted_parts(&statuses),
            vec!["b.VolsA-ara1", "b.VolsB-ara1"]
        );

        let groups = BTreeMap::from([(
            "b".to_string(),
            vec![
                cand("b.VolsA-ara1", Extension::None, 100),
                cand("b.VolsB-ara1", Extension::None, 150),
                cand("b.Other-ara1", Extension::Completed, 10),
            ],
        )]);
        assert!(index.promoted_parts(&resolve_all(&groups)).is_empty());
    }

    #[test]
    fn test_part_without_text_is_not_promoted() {
        let mut index = SplitIndex::default();
        index.add("b.VolsA-ara1");
        index.add("b.VolsB-ara1");
        let groups = BTreeMap::from([(
            "b".to_string(),
            vec![
                Candidate {
                    uri: "b.VolsA-ara1".to_string(),
                    extension: Extension::None,
                    length: 100,
                    declared_primary: false,
                    low_priority: false,
                    file_present: true,
                },
                Candidate {
                    uri: "b.VolsB-ara1".to_string(),
                    extension: Extension::None,
                    length: 150,
                    declared_primary: false,
                    low_priority: false,
                    file_present: false,
                },
            ],
        )]);
        assert_eq!(index.promoted_parts(&resolve_all(&groups)), vec!["b.VolsA-ara1"]);
    }
}
