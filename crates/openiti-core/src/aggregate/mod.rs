//! Corpus aggregation in two passes.
//!
//! [`Walker`] visits every version sidecar and fills an
//! [`AggregationContext`]; [`resolve`] then takes the finished context,
//! decides primary versions and transcriptions, recomposes split texts and
//! returns the immutable [`Aggregation`] the writers work from.

mod context;
mod walker;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

pub use context::{AggregationContext, Diagnostic};
pub use walker::{is_version_yml, WalkStats, Walker};

use crate::config::MetadataConfig;
use crate::counter::{ArabicCounter, TextCounter};
use crate::error::Result;
use crate::extract::{
    AuthorRecord, BookRecord, LocationRecord, ManuscriptRecord, Memo, TranscriptionRecord,
    VersionRecord,
};
use crate::geo::{self, Gazetteer, GeoIssue};
use crate::issues::{IssueIndex, IssueTracker, StaticIssues};
use crate::relations::RelationGraph;
use crate::row::MetadataRow;
use crate::split::{self, SplitIndex};
use crate::status::{resolve_all, Resolution, Status};
use crate::tags::TagTable;
use crate::translit::{SimpleArabic, Transliterator};
use crate::vfs::FileSystem;

/// Issue tracker repository holding the corpus metadata issues.
pub const ISSUES_REPO: &str = "OpenITI/Annotation";

/// Collaborators and reference data of one run.
pub struct Resources {
    pub counter: Box<dyn TextCounter>,
    pub translit: Box<dyn Transliterator>,
    pub tags: TagTable,
    pub gazetteer: Option<Gazetteer>,
    pub issues: IssueIndex,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            counter: Box::new(ArabicCounter),
            translit: Box::new(SimpleArabic),
            tags: TagTable::default(),
            gazetteer: None,
            issues: IssueIndex::default(),
        }
    }
}

impl Resources {
    /// Load the reference files named in the configuration.
    pub fn load(config: &MetadataConfig, fs: &dyn FileSystem) -> Result<Self> {
        let mut resources = Self::default();
        if let Some(path) = &config.tags_path {
            resources.tags = TagTable::parse(&fs.read_to_string(path)?);
        }
        if let Some(path) = &config.gazetteer_path {
            resources.gazetteer = Some(Gazetteer::parse(&fs.read_to_string(path)?));
        }
        if let Some(path) = &config.issues_path {
            resources.issues = Self::load_issues(&StaticIssues::load(path)?)?;
        }
        Ok(resources)
    }

    pub fn load_issues(tracker: &dyn IssueTracker) -> Result<IssueIndex> {
        let issues = tracker.fetch_issues(ISSUES_REPO, None)?;
        let index = IssueIndex::build(&issues);
        log::info!("{} issues concern {} URIs", issues.len(), index.len());
        Ok(index)
    }
}

/// Summary of what was skipped, defaulted or flagged during a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub stats: WalkStats,
    /// Version ID -> sidecar file names sharing it
    pub duplicate_ids: BTreeMap<String, Vec<String>>,
    /// Groups with more than one declared primary
    pub ambiguous: Vec<Resolution>,
    /// Candidates left out of status resolution for lack of a text file
    pub excluded: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub memo_hits: usize,
}

/// Result of a complete run.
#[derive(Debug, Default)]
pub struct Aggregation {
    /// One row per version with a text file plus one per split text, sorted
    pub rows: Vec<MetadataRow>,
    pub authors: Memo<AuthorRecord>,
    pub books: Memo<BookRecord>,
    pub versions: BTreeMap<String, VersionRecord>,
    pub manuscripts: Memo<ManuscriptRecord>,
    pub locations: Memo<LocationRecord>,
    pub transcriptions: BTreeMap<String, TranscriptionRecord>,
    pub relations: RelationGraph,
    pub splits: SplitIndex,
    pub headers: BTreeMap<String, BTreeMap<String, String>>,
    pub yml_dump: Vec<String>,
    pub geo_issues: Vec<GeoIssue>,
    pub report: RunReport,
}

impl Aggregation {
    /// Author URI -> script code -> name component -> value.
    pub fn name_elements(&self) -> BTreeMap<&str, &BTreeMap<String, BTreeMap<String, String>>> {
        self.authors
            .iter()
            .filter(|(_, a)| !a.name_elements.is_empty())
            .map(|(uri, a)| (uri, &a.name_elements))
            .collect()
    }
}

/// Walk the corpus and resolve it.
pub fn aggregate(
    config: &MetadataConfig,
    fs: &dyn FileSystem,
    resources: &Resources,
) -> Aggregation {
    let mut ctx = AggregationContext::new();
    let stats = Walker::new(config, fs, resources, &mut ctx).walk();
    log::info!(
        "Walk finished: {} versions, {} skipped, {} without text",
        stats.versions,
        stats.skipped,
        stats.missing_texts
    );
    resolve(ctx, stats, resources.gazetteer.as_ref())
}

/// Second pass. Runs only on a finished context: statuses depend on every
/// sibling of a group having been seen.
pub fn resolve(
    ctx: AggregationContext,
    stats: WalkStats,
    gazetteer: Option<&Gazetteer>,
) -> Aggregation {
    let book_status = resolve_all(&ctx.book_candidates);
    let manuscript_status = resolve_all(&ctx.manuscript_candidates);
    log::info!(
        "Resolved {} books and {} manuscripts",
        ctx.book_candidates.len(),
        ctx.manuscript_candidates.len()
    );

    let promoted: BTreeSet<String> = ctx.splits.promoted_parts(&book_status).into_iter().collect();
    let status_of = |uri: &str| {
        if promoted.contains(uri) {
            Status::Primary
        } else {
            book_status.status(uri)
        }
    };

    let mut report = RunReport {
        duplicate_ids: ctx.duplicate_ids(),
        memo_hits: ctx.memo_hits(),
        stats,
        ..Default::default()
    };
    for (id, files) in &report.duplicate_ids {
        log::warn!("Duplicate version ID {}: {}", id, files.join(", "));
    }
    for resolution in book_status.resolutions.iter().chain(&manuscript_status.resolutions) {
        if resolution.ambiguous {
            report.ambiguous.push(resolution.clone());
        }
        report.excluded.extend(resolution.excluded.iter().cloned());
    }

    let AggregationContext {
        authors,
        books,
        versions,
        manuscripts,
        locations,
        mut transcriptions,
        mut rows,
        headers,
        geo: geo_index,
        relations,
        splits,
        yml_dump,
        diagnostics,
        ..
    } = ctx;

    for row in rows.values_mut() {
        row.status = status_of(&row.version_uri);
    }
    let versions: BTreeMap<String, VersionRecord> = versions
        .into_iter()
        .map(|(uri, sourced)| {
            let mut version = sourced.record;
            version.status = status_of(&uri);
            (uri, version)
        })
        .collect();
    for transcription in transcriptions.values_mut() {
        transcription.status = manuscript_status.status(&transcription.uri);
    }

    let mut compounds = Vec::new();
    for (compound, parts) in splits.groups() {
        let part_rows: Vec<&MetadataRow> = parts.iter().filter_map(|p| rows.get(p)).collect();
        if let Some(row) = split::compound_row(compound, &part_rows) {
            compounds.push(row);
        }
    }
    for row in compounds {
        rows.insert(row.version_uri.clone(), row);
    }

    let geo_issues = geo::validate(&geo_index, gazetteer);
    if !geo_issues.is_empty() {
        log::warn!("{} authority code problems found", geo_issues.len());
    }
    report.diagnostics = diagnostics;

    Aggregation {
        rows: rows.into_values().collect(),
        authors: authors.map(|a| a.record.clone()),
        books: books.map(|b| b.record.clone()),
        versions,
        manuscripts,
        locations,
        transcriptions,
        relations,
        splits,
        headers,
        yml_dump,
        geo_issues,
        report,
    }
}
