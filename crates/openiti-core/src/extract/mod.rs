//! Metadata extractors.
//!
//! Every extractor is a pure function from a parsed URI and a loaded sidecar
//! to a normalized record. Records are memoized by URI in a [`Memo`] owned by
//! the aggregation context, so each author, book, manuscript or location is
//! extracted once per run however many versions point at it.

pub mod author;
pub mod book;
pub mod manuscript;
pub mod transcription;
pub mod version;

use std::collections::btree_map::{self, BTreeMap};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::RecordError;
use crate::record::{self, Record};
use crate::vfs::FileSystem;

pub use author::{extract_author, AuthorRecord};
pub use book::{extract_book, BookRecord};
pub use manuscript::{extract_location, extract_manuscript, LocationRecord, ManuscriptRecord};
pub use transcription::{extract_transcription, TranscriptionRecord};
pub use version::{extract_version, measure_lengths, Lengths, VersionRecord};

static CAMEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid regex"));
static BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \r\n]*¶ *").expect("valid regex"));

/// Records keyed by URI, built at most once.
#[derive(Debug, Clone)]
pub struct Memo<T> {
    entries: BTreeMap<String, T>,
    hits: usize,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            hits: 0,
        }
    }
}

impl<T> Memo<T> {
    /// The cached record for `key`, calling `build` only on first sight.
    pub fn get_or_insert_with(&mut self, key: &str, build: impl FnOnce() -> T) -> &T {
        match self.entries.entry(key.to_string()) {
            btree_map::Entry::Occupied(entry) => {
                self.hits += 1;
                entry.into_mut()
            }
            btree_map::Entry::Vacant(entry) => entry.insert(build()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: String, value: T) {
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.values_mut()
    }

    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Memo<U> {
        Memo {
            entries: self.entries.iter().map(|(k, v)| (k.clone(), f(v))).collect(),
            hits: self.hits,
        }
    }
}

impl<T: Serialize> Serialize for Memo<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

/// An extracted record together with the sidecar it came from.
#[derive(Debug, Clone, Default)]
pub struct Sourced<T> {
    pub record: T,
    pub sidecar: Record,
}

/// Load a sidecar for extraction. Missing or unrepairable files degrade to
/// an empty record.
pub fn load_sidecar(fs: &dyn FileSystem, path: &Path) -> Record {
    match record::read_or_repair(fs, path) {
        Ok(record) => record,
        Err(RecordError::NotFound(_)) => {
            log::warn!("No sidecar found: {}", path.display());
            Record::new()
        }
        Err(e) => {
            log::warn!("Unusable sidecar, falling back to URI data: {}", e);
            Record::new()
        }
    }
}

/// Split a camel-case URI component: `IbnHanbal` -> `Ibn Hanbal`.
pub fn insert_spaces(s: &str) -> String {
    CAMEL_RE.replace_all(s, "$1 $2").into_owned()
}

/// Collapse line-wrap markers into single spaces.
pub fn collapse_breaks(s: &str) -> String {
    BREAK_RE.replace_all(s, " ").trim().to_string()
}

/// Remove duplicates, keeping first occurrences.
pub(crate) fn dedup(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !v.is_empty() && !out.contains(&v) {
            out.push(v);
        }
    }
    out
}
