use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::extract::{
    AuthorRecord, BookRecord, LocationRecord, ManuscriptRecord, Memo, Sourced, TranscriptionRecord,
    VersionRecord,
};
use crate::geo::GeoIndex;
use crate::relations::RelationGraph;
use crate::row::MetadataRow;
use crate::split::SplitIndex;
use crate::status::Candidate;

/// A problem that was recovered from during the walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// File name looked like a version sidecar but did not parse as a URI
    InvalidUri { path: PathBuf, error: String },
    /// No text file next to the version sidecar
    MissingText { version: String, yml_path: PathBuf },
    InvalidManuscript { version: String, manuscript: String },
    /// A recounted length could not be written back
    UnwritableSidecar { path: PathBuf, error: String },
}

/// Facts accumulated across one walk. Append-only while walking, read-only
/// once status resolution starts.
#[derive(Debug, Default)]
pub struct AggregationContext {
    pub authors: Memo<Sourced<AuthorRecord>>,
    pub books: Memo<Sourced<BookRecord>>,
    pub versions: BTreeMap<String, Sourced<VersionRecord>>,
    pub manuscripts: Memo<ManuscriptRecord>,
    pub locations: Memo<LocationRecord>,
    pub transcriptions: BTreeMap<String, TranscriptionRecord>,
    /// Book URI -> its versions
    pub book_candidates: BTreeMap<String, Vec<Candidate>>,
    /// Manuscript ID -> its transcriptions
    pub manuscript_candidates: BTreeMap<String, Vec<Candidate>>,
    /// Draft rows keyed by version URI; statuses are filled in afterwards
    pub rows: BTreeMap<String, MetadataRow>,
    /// Text file path -> every header key/value
    pub headers: BTreeMap<String, BTreeMap<String, String>>,
    /// Version ID -> sidecar file names using it
    pub version_ids: BTreeMap<String, Vec<String>>,
    pub geo: GeoIndex,
    pub relations: RelationGraph,
    pub splits: SplitIndex,
    /// One entry per version: its version, book and author sidecars
    pub yml_dump: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AggregationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Version IDs used by more than one sidecar.
    pub fn duplicate_ids(&self) -> BTreeMap<String, Vec<String>> {
        self.version_ids
            .iter()
            .filter(|(_, files)| files.len() > 1)
            .map(|(id, files)| (id.clone(), files.clone()))
            .collect()
    }

    /// Lookups answered from the author, book, manuscript and location memos.
    pub fn memo_hits(&self) -> usize {
        self.authors.hits() + self.books.hits() + self.manuscripts.hits() + self.locations.hits()
    }
}
