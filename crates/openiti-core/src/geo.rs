//! Place authority codes found in author biographies, and their validation
//! against a gazetteer.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::record::Record;

/// Codes ending in a role suffix, or carrying the to-be-verified marker.
static GEO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\w+_RE(?:_\w+)?|\w+_[RSNO]\b|\w+XXXYYY\w*").expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoRole {
    Born,
    Died,
    Resided,
    Visited,
}

impl GeoRole {
    pub const ALL: [GeoRole; 4] = [GeoRole::Born, GeoRole::Died, GeoRole::Resided, GeoRole::Visited];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeoRole::Born => "born",
            GeoRole::Died => "died",
            GeoRole::Resided => "resided",
            GeoRole::Visited => "visited",
        }
    }

    fn sidecar_key(&self) -> &'static str {
        match self {
            GeoRole::Born => "20#AUTH#BORN#####:",
            GeoRole::Died => "20#AUTH#DIED#####:",
            GeoRole::Resided => "20#AUTH#RESIDED##:",
            GeoRole::Visited => "20#AUTH#VISITED##:",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GeoRef {
    pub role: GeoRole,
    pub code: String,
}

impl fmt::Display for GeoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.role.as_str(), self.code)
    }
}

/// All authority codes of an author sidecar, tagged with their role.
pub fn extract_geo(record: &Record) -> Vec<GeoRef> {
    GeoRole::ALL
        .iter()
        .flat_map(|role| {
            GEO_RE
                .find_iter(record.get(role.sidecar_key()))
                .map(|m| GeoRef {
                    role: *role,
                    code: m.as_str().to_string(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Authority code -> author sidecar file names citing it.
#[derive(Debug, Clone, Default)]
pub struct GeoIndex {
    codes: BTreeMap<String, BTreeSet<String>>,
}

impl GeoIndex {
    pub fn add(&mut self, code: &str, author_yml: &str) {
        self.codes
            .entry(code.to_string())
            .or_default()
            .insert(author_yml.to_string());
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn sources(&self, code: &str) -> impl Iterator<Item = &str> {
        self.codes
            .get(code)
            .into_iter()
            .flat_map(|s| s.iter().map(String::as_str))
    }
}

/// Reference list of known authority codes.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    codes: HashSet<String>,
}

impl Gazetteer {
    /// One code per line; blank lines ignored.
    pub fn parse(content: &str) -> Self {
        Self {
            codes: content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum GeoProblem {
    Error,
    AutoAssigned,
    NeedsGazetteerAddition,
    SuffixMismatch,
}

impl GeoProblem {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeoProblem::Error => "error",
            GeoProblem::AutoAssigned => "auto-assigned",
            GeoProblem::NeedsGazetteerAddition => "needs-gazetteer-addition",
            GeoProblem::SuffixMismatch => "suffix-mismatch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct GeoIssue {
    pub problem: GeoProblem,
    pub code: String,
    pub author_yml: String,
}

/// Problem category of a code, if any. Without a gazetteer only the
/// categories readable from the code itself are reported.
pub fn classify(code: &str, gazetteer: Option<&Gazetteer>) -> Option<GeoProblem> {
    let known = gazetteer.map(|g| g.contains(code));
    if known == Some(true) {
        return ["_R", "_O", "_W"]
            .iter()
            .any(|s| code.ends_with(s))
            .then_some(GeoProblem::SuffixMismatch);
    }
    if ["Auto", "AUTO", "auto"].iter().any(|s| code.ends_with(s)) {
        Some(GeoProblem::AutoAssigned)
    } else if code.contains("XXXYYY") {
        Some(GeoProblem::NeedsGazetteerAddition)
    } else if known == Some(false) {
        Some(GeoProblem::Error)
    } else {
        None
    }
}

/// One row per (problem, code, citing author sidecar), sorted.
pub fn validate(index: &GeoIndex, gazetteer: Option<&Gazetteer>) -> Vec<GeoIssue> {
    let mut issues: Vec<GeoIssue> = index
        .codes
        .iter()
        .filter_map(|(code, sources)| classify(code, gazetteer).map(|p| (p, code, sources)))
        .flat_map(|(problem, code, sources)| {
            sources.iter().map(move |author_yml| GeoIssue {
                problem,
                code: code.clone(),
                author_yml: author_yml.clone(),
            })
        })
        .collect();
    issues.sort();
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_geo_roles() {
        let mut record = Record::new();
        record.set("20#AUTH#BORN#####:", "BASRA_443E305N_S");
        record.set("20#AUTH#DIED#####:", "BASRA_443E305N_S");
        record.set("20#AUTH#RESIDED##:", "BAGHDAD_443E333N_S, SAMARRA_438E342N_R");
        record.set("20#AUTH#VISITED##:", "DIMASHQXXXYYY, none");
        let geo = extract_geo(&record);
        let tags: Vec<String> = geo.iter().map(|g| g.to_string()).collect();
        assert_eq!(
            tags,
            vec![
                "born@BASRA_443E305N_S",
                "died@BASRA_443E305N_S",
                "resided@BAGHDAD_443E333N_S",
                "resided@SAMARRA_438E342N_R",
                "visited@DIMASHQXXXYYY",
            ]
        );
    }

    #[test]
    fn test_classify_with_gazetteer() {
        let gazetteer = Gazetteer::parse("BASRA_443E305N_S\nSAMARRA_438E342N_R\n");
        let g = Some(&gazetteer);
        assert_eq!(classify("BASRA_443E305N_S", g), None);
        assert_eq!(classify("SAMARRA_438E342N_R", g), Some(GeoProblem::SuffixMismatch));
        assert_eq!(classify("KUFA_Auto", g), Some(GeoProblem::AutoAssigned));
        assert_eq!(classify("DIMASHQXXXYYY", g), Some(GeoProblem::NeedsGazetteerAddition));
        assert_eq!(classify("MISSPELT_123E456N_S", g), Some(GeoProblem::Error));
    }

    #[test]
    fn test_classify_without_gazetteer() {
        assert_eq!(classify("KUFA_AUTO", None), Some(GeoProblem::AutoAssigned));
        assert_eq!(classify("DIMASHQXXXYYY", None), Some(GeoProblem::NeedsGazetteerAddition));
        assert_eq!(classify("MISSPELT_123E456N_S", None), None);
    }

    #[test]
    fn test_validate_lists_every_citing_sidecar() {
        let mut index = GeoIndex::default();
        index.add("DIMASHQXXXYYY", "0255Jahiz.yml");
        index.add("DIMASHQXXXYYY", "0310Tabari.yml");
        index.add("BASRA_443E305N_S", "0255Jahiz.yml");
        let issues = validate(&index, None);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].author_yml, "0255Jahiz.yml");
        assert_eq!(issues[1].author_yml, "0310Tabari.yml");
        assert!(issues.iter().all(|i| i.problem == GeoProblem::NeedsGazetteerAddition));
    }
}
