//! Artifact writers. Every artifact is rendered to a string first and then
//! written through the [`FileSystem`], so rendering is testable on its own.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::{json, Value};

use crate::aggregate::Aggregation;
use crate::config::MetadataConfig;
use crate::error::Result;
use crate::geo::GeoIssue;
use crate::issues::IssueIndex;
use crate::row::{Columns, MetadataRow};
use crate::vfs::FileSystem;

pub const GEO_CSV_HEADER: &str = "problem_type\tauthority_code\tauthor_yml";

/// Header line plus one line per row.
pub fn render_tsv(rows: &[MetadataRow], columns: Columns) -> String {
    let mut lines = vec![columns.header().join("\t")];
    lines.extend(rows.iter().map(|r| r.to_tsv_line(columns)));
    lines.join("\n")
}

/// `{"data": [...], "date": ..., "time": ...}`; each row carries the
/// issues filed against its author, book and version.
pub fn render_json_light(
    rows: &[MetadataRow],
    columns: Columns,
    issues: &IssueIndex,
    now: DateTime<Local>,
) -> Result<String> {
    let data: Vec<Value> = rows
        .iter()
        .map(|row| {
            let [author_issues, book_issues, version_issues] = issues.for_version(&row.version_uri);
            let mut record: serde_json::Map<String, Value> = row
                .to_map(columns)
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            record.insert("author_issues".to_string(), json!(author_issues));
            record.insert("book_issues".to_string(), json!(book_issues));
            record.insert("version_issues".to_string(), json!(version_issues));
            Value::Object(record)
        })
        .collect();
    let doc = json!({
        "data": data,
        "date": now.format("%d %B %Y").to_string(),
        "time": now.format("%H:%M:%S").to_string(),
    });
    Ok(serde_json::to_string(&doc)?)
}

/// Tab-separated authority-code problems, sorted.
pub fn render_geo_csv(issues: &[GeoIssue]) -> String {
    let mut lines: Vec<String> = issues
        .iter()
        .map(|i| format!("{}\t{}\t{}", i.problem.as_str(), i.code, i.author_yml))
        .collect();
    lines.sort();
    lines.insert(0, GEO_CSV_HEADER.to_string());
    lines.join("\n")
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes every artifact of an aggregation.
pub struct ArtifactWriter<'a> {
    config: &'a MetadataConfig,
    fs: &'a dyn FileSystem,
    columns: Columns,
    written: Vec<PathBuf>,
}

impl<'a> ArtifactWriter<'a> {
    pub fn new(config: &'a MetadataConfig, fs: &'a dyn FileSystem) -> Self {
        Self {
            config,
            fs,
            columns: Columns::from_config(config),
            written: Vec::new(),
        }
    }

    fn write(&mut self, path: PathBuf, content: &str) -> Result<()> {
        self.fs.write(&path, content)?;
        log::debug!("Wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }

    /// Write all artifacts; returns the paths written.
    pub fn write_all(mut self, agg: &Aggregation, issues: &IssueIndex) -> Result<Vec<PathBuf>> {
        let config = self.config;
        let columns = self.columns;

        self.write(config.meta_tsv_path(), &render_tsv(&agg.rows, columns))?;
        self.write(config.meta_yml_path(), &agg.yml_dump.join("\n"))?;
        self.write(
            config.meta_json_path(),
            &render_json_light(&agg.rows, columns, issues, Local::now())?,
        )?;
        self.write(config.header_json_path(), &serde_json::to_string(&agg.headers)?)?;

        self.write(config.artifact_path("split_files.json"), &pretty(&agg.splits)?)?;
        self.write(
            config.artifact_path("book_relations.json"),
            &pretty(&agg.relations.adjacency())?,
        )?;
        self.write(
            config.artifact_path("name_elements.json"),
            &pretty(&agg.name_elements())?,
        )?;

        self.write(config.artifact_path("authors.json"), &pretty(&agg.authors)?)?;
        self.write(config.artifact_path("books.json"), &pretty(&agg.books)?)?;
        self.write(config.artifact_path("versions.json"), &pretty(&agg.versions)?)?;
        self.write(config.artifact_path("manuscripts.json"), &pretty(&agg.manuscripts)?)?;
        self.write(config.artifact_path("locations.json"), &pretty(&agg.locations)?)?;
        self.write(
            config.artifact_path("transcriptions.json"),
            &pretty(&agg.transcriptions)?,
        )?;

        self.write(
            config.artifact_path("authority_codes_to_be_checked.csv"),
            &render_geo_csv(&agg.geo_issues),
        )?;
        self.write(config.artifact_path("run_report.json"), &pretty(&agg.report)?)?;

        log::info!(
            "{} artifacts written to {}",
            self.written.len(),
            config.output.output_path.display()
        );
        Ok(self.written)
    }
}

/// Counts shown at the end of a run.
pub fn summary(agg: &Aggregation) -> BTreeMap<&'static str, usize> {
    BTreeMap::from([
        ("rows", agg.rows.len()),
        ("authors", agg.authors.len()),
        ("books", agg.books.len()),
        ("versions", agg.versions.len()),
        ("split texts", agg.splits.len()),
        ("transcriptions", agg.transcriptions.len()),
        ("duplicate ids", agg.report.duplicate_ids.len()),
        ("ambiguous primaries", agg.report.ambiguous.len()),
        ("authority code problems", agg.geo_issues.len()),
        ("skipped files", agg.report.stats.skipped),
        ("missing texts", agg.report.stats.missing_texts),
    ])
}
