//! Primary-version resolution.
//!
//! Candidates are collected per group (book or manuscript) during the walk and
//! resolved only once the walk is complete: [`resolve_all`] takes the finished
//! candidate snapshot and never sees a partial group.

use std::cmp::{Ordering, Reverse};
use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::uri::Extension;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Status {
    Primary,
    #[default]
    Secondary,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Primary => "pri",
            Status::Secondary => "sec",
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One selectable text of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub uri: String,
    pub extension: Extension,
    pub length: u64,
    /// Carries the declared-primary tag in its issues field
    pub declared_primary: bool,
    /// Belongs to a collection that is always ranked last
    pub low_priority: bool,
    /// The underlying text file exists on disk
    pub file_present: bool,
}

/// Maturity band first, then length. Bands are disjoint, so a more mature
/// candidate outranks a less mature one whatever their lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score {
    band: Extension,
    length: u64,
}

impl Score {
    pub const ZERO: Score = Score {
        band: Extension::None,
        length: 0,
    };

    pub fn of(candidate: &Candidate) -> Self {
        if candidate.low_priority {
            return Score::ZERO;
        }
        Score {
            band: candidate.extension,
            length: candidate.length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub group: String,
    pub primaries: Vec<String>,
    /// More than one candidate declared itself primary
    pub ambiguous: bool,
    /// Candidates left out because their text file is missing
    pub excluded: Vec<String>,
}

/// Highest score first; equal scores fall back to the larger URI.
fn ranking(a: &Candidate, b: &Candidate) -> Ordering {
    (Reverse(Score::of(a)), Reverse(&a.uri)).cmp(&(Reverse(Score::of(b)), Reverse(&b.uri)))
}

pub fn resolve_group(group: &str, candidates: &[Candidate]) -> Resolution {
    let (present, missing): (Vec<&Candidate>, Vec<&Candidate>) =
        candidates.iter().partition(|c| c.file_present);

    let mut excluded: Vec<String> = missing.iter().map(|c| c.uri.clone()).collect();
    excluded.sort();

    let declared: Vec<&Candidate> = present
        .iter()
        .copied()
        .filter(|c| c.declared_primary)
        .collect();

    if !declared.is_empty() {
        let mut primaries: Vec<String> = declared.iter().map(|c| c.uri.clone()).collect();
        primaries.sort();
        let ambiguous = primaries.len() > 1;
        if ambiguous {
            log::warn!(
                "{}: {} versions are declared primary: {}",
                group,
                primaries.len(),
                primaries.join(", ")
            );
        }
        return Resolution {
            group: group.to_string(),
            primaries,
            ambiguous,
            excluded,
        };
    }

    let mut ranked = present;
    ranked.sort_by(|a, b| ranking(a, b));
    Resolution {
        group: group.to_string(),
        primaries: ranked.first().map(|c| c.uri.clone()).into_iter().collect(),
        ambiguous: false,
        excluded,
    }
}

/// Outcome of resolving every group.
#[derive(Debug, Clone, Default)]
pub struct StatusTable {
    statuses: BTreeMap<String, Status>,
    pub resolutions: Vec<Resolution>,
}

impl StatusTable {
    /// Status of a candidate URI; anything never promoted is secondary.
    pub fn status(&self, uri: &str) -> Status {
        self.statuses.get(uri).copied().unwrap_or_default()
    }

    pub fn is_primary(&self, uri: &str) -> bool {
        self.status(uri) == Status::Primary
    }

    /// Left out of scoring for lack of a text file.
    pub fn is_excluded(&self, uri: &str) -> bool {
        self.resolutions
            .iter()
            .any(|r| r.excluded.iter().any(|e| e == uri))
    }

    pub fn ambiguous(&self) -> impl Iterator<Item = &Resolution> {
        self.resolutions.iter().filter(|r| r.ambiguous)
    }
}

pub fn resolve_all(groups: &BTreeMap<String, Vec<Candidate>>) -> StatusTable {
    let mut table = StatusTable::default();
    for (group, candidates) in groups {
        for candidate in candidates {
            table
                .statuses
                .entry(candidate.uri.clone())
                .or_insert(Status::Secondary);
        }
        let resolution = resolve_group(group, candidates);
        for uri in &resolution.primaries {
            table.statuses.insert(uri.clone(), Status::Primary);
        }
        log::debug!("{}: primary {:?}", group, resolution.primaries);
        table.resolutions.push(resolution);
    }
    table
}
