use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::context::{AggregationContext, Diagnostic};
use super::Resources;
use crate::config::MetadataConfig;
use crate::counter::find_text_file;
use crate::extract::{
    extract_author, extract_book, extract_location, extract_manuscript, extract_transcription,
    extract_version, load_sidecar, measure_lengths, Sourced, VersionRecord,
};
use crate::header::{read_header, HeaderMeta};
use crate::record::{self, Record, RECORD_SEPARATOR};
use crate::row::{compose_row, text_url, RowSources};
use crate::status::Candidate;
use crate::uri::{Layout, Uri, UriKind};
use crate::vfs::FileSystem;

static VERSION_YML_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}[A-Za-z]+\.[A-Za-z\d]+\.\w+-[a-z]{3}\d+\.yml$").expect("valid regex")
});

/// File name of a version sidecar?
pub fn is_version_yml(file_name: &str) -> bool {
    VERSION_YML_RE.is_match(file_name)
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct WalkStats {
    pub yml_files: usize,
    pub versions: usize,
    pub skipped: usize,
    pub missing_texts: usize,
    pub recounted: usize,
}

/// First pass: visits every version sidecar under the corpus root and
/// collects records, candidates and draft rows into the context.
pub struct Walker<'a> {
    config: &'a MetadataConfig,
    fs: &'a dyn FileSystem,
    resources: &'a Resources,
    ctx: &'a mut AggregationContext,
    stats: WalkStats,
}

impl<'a> Walker<'a> {
    pub fn new(
        config: &'a MetadataConfig,
        fs: &'a dyn FileSystem,
        resources: &'a Resources,
        ctx: &'a mut AggregationContext,
    ) -> Self {
        Self {
            config,
            fs,
            resources,
            ctx,
            stats: WalkStats::default(),
        }
    }

    pub fn walk(mut self) -> WalkStats {
        let files = self.fs.list_files(
            &self.config.corpus_path,
            &self.config.exclude,
            &is_version_yml,
        );
        self.stats.yml_files = files.len();
        log::info!(
            "Collecting metadata from {} version files in {}",
            files.len(),
            self.config.corpus_path.display()
        );

        for path in &files {
            self.visit(path);
        }
        self.stats
    }

    /// Process one version sidecar.
    pub fn visit(&mut self, yml_path: &Path) {
        let file_name = yml_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = file_name.strip_suffix(".yml").unwrap_or(&file_name);

        let uri = match Uri::parse(stem) {
            Ok(uri) if uri.kind() == Some(UriKind::Version) => uri,
            Ok(_) => {
                self.skip(yml_path, "not a version URI".to_string());
                return;
            }
            Err(e) => {
                self.skip(yml_path, e.to_string());
                return;
            }
        };
        self.ctx
            .version_ids
            .entry(uri.version.clone())
            .or_default()
            .push(file_name.clone());

        let folder = yml_path.parent().unwrap_or_else(|| Path::new(""));
        let author_folder = match self.config.layout {
            Layout::Flat => folder,
            _ => folder.parent().unwrap_or(folder),
        };
        // Both builds succeed on a version URI.
        let book_yml = folder.join(uri.build(UriKind::BookYml).unwrap_or_default());
        let author_yml = author_folder.join(uri.build(UriKind::AuthorYml).unwrap_or_default());

        let author_uri = self.register_author(&uri, &author_yml);
        let book_uri = self.register_book(&uri, &book_yml);

        let mut sidecar = load_sidecar(self.fs, yml_path);
        let text = find_text_file(self.fs, &folder.join(stem));
        let (lengths, changed) = measure_lengths(
            self.fs,
            self.resources.counter.as_ref(),
            &mut sidecar,
            text.as_ref().map(|(p, _)| p.as_path()),
            self.config.incl_char_length,
            self.config.recount,
        );
        if changed {
            match record::write(self.fs, yml_path, &sidecar) {
                Ok(()) => self.stats.recounted += 1,
                Err(e) => {
                    log::warn!("{}", e);
                    self.ctx.diagnostics.push(Diagnostic::UnwritableSidecar {
                        path: yml_path.to_path_buf(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let version = extract_version(
            &uri,
            &sidecar,
            text,
            lengths,
            yml_path,
            &self.config.status.primary_tag,
        );
        let relative = yml_path
            .strip_prefix(&self.config.corpus_path)
            .unwrap_or(yml_path);
        let path_text = relative.to_string_lossy();
        let low_priority = self
            .config
            .status
            .low_priority_tags
            .iter()
            .any(|tag| path_text.contains(tag.as_str()));
        self.ctx
            .book_candidates
            .entry(book_uri.clone())
            .or_default()
            .push(Candidate {
                uri: version.uri.clone(),
                extension: version.extension,
                length: version.tok_length,
                declared_primary: version.declared_primary,
                low_priority,
                file_present: version.text_path.is_some(),
            });

        if let Some(manuscript) = version.manuscript.clone() {
            self.register_manuscript(&version, &manuscript);
            if let Some(transcription) = extract_transcription(&version) {
                self.ctx
                    .manuscript_candidates
                    .entry(manuscript)
                    .or_default()
                    .push(transcription.candidate(&version, low_priority));
                self.ctx
                    .transcriptions
                    .insert(transcription.uri.clone(), transcription);
            }
        }

        self.dump_sidecars(&sidecar, &book_uri, &author_uri);
        self.draft_row(&version, &author_uri, &book_uri);
        self.ctx.splits.add(&version.uri);

        self.stats.versions += 1;
        self.ctx
            .versions
            .insert(version.uri.clone(), Sourced { record: version, sidecar });
    }

    fn skip(&mut self, path: &Path, error: String) {
        log::warn!("Skipping {}: {}", path.display(), error);
        self.stats.skipped += 1;
        self.ctx.diagnostics.push(Diagnostic::InvalidUri {
            path: path.to_path_buf(),
            error,
        });
    }

    fn register_author(&mut self, uri: &Uri, yml_path: &Path) -> String {
        let key = uri.author_uri().unwrap_or_default();
        let fs = self.fs;
        let translit = self.resources.translit.as_ref();
        let mut fresh = false;
        let author = self.ctx.authors.get_or_insert_with(&key, || {
            fresh = true;
            let sidecar = load_sidecar(fs, yml_path);
            Sourced {
                record: extract_author(uri, &sidecar, translit),
                sidecar,
            }
        });
        if fresh {
            for geo in &author.record.geo {
                self.ctx.geo.add(&geo.code, &author.record.yml_name);
            }
        }
        key
    }

    fn register_book(&mut self, uri: &Uri, yml_path: &Path) -> String {
        let key = uri.book_uri().unwrap_or_default();
        let fs = self.fs;
        let translit = self.resources.translit.as_ref();
        let mut fresh = false;
        let book = self.ctx.books.get_or_insert_with(&key, || {
            fresh = true;
            let sidecar = load_sidecar(fs, yml_path);
            Sourced {
                record: extract_book(uri, &sidecar, translit),
                sidecar,
            }
        });
        if fresh {
            self.ctx.relations.extend(book.record.relations.iter().cloned());
        }
        key
    }

    /// Memoize the manuscript a version transcribes, and its holding location.
    fn register_manuscript(&mut self, version: &VersionRecord, id: &str) {
        let folder = self.config.manuscripts_path.clone();
        let fs = self.fs;
        let sidecar_of = |name: &str| match folder.as_deref() {
            Some(folder) => load_sidecar(fs, &folder.join(format!("{}.yml", name))),
            None => Record::new(),
        };

        if !self.ctx.manuscripts.contains(id) {
            match extract_manuscript(id, &sidecar_of(id)) {
                Some(manuscript) => self.ctx.manuscripts.insert(id.to_string(), manuscript),
                None => {
                    log::warn!("{}: invalid manuscript ID {:?}", version.uri, id);
                    self.ctx.diagnostics.push(Diagnostic::InvalidManuscript {
                        version: version.uri.clone(),
                        manuscript: id.to_string(),
                    });
                    return;
                }
            }
        }
        let Some(code) = self.ctx.manuscripts.get(id).map(|m| m.location.clone()) else {
            return;
        };
        self.ctx
            .locations
            .get_or_insert_with(&code, || extract_location(&code, &sidecar_of(&code)));
    }

    fn dump_sidecars(&mut self, version: &Record, book_uri: &str, author_uri: &str) {
        let mut entry = format!("{}{}\n", *RECORD_SEPARATOR, version.to_yml());
        for sidecar in [
            self.ctx.books.get(book_uri).map(|b| &b.sidecar),
            self.ctx.authors.get(author_uri).map(|a| &a.sidecar),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        {
            entry.push_str(&sidecar.to_yml());
            entry.push('\n');
        }
        self.ctx.yml_dump.push(entry);
    }

    /// Compose the row of a version with an existing text file.
    fn draft_row(&mut self, version: &VersionRecord, author_uri: &str, book_uri: &str) {
        let Some(text_path) = version.text_path.clone() else {
            log::warn!("MISSING FILE? no text file for {}", version.yml_path.display());
            self.stats.missing_texts += 1;
            self.ctx.diagnostics.push(Diagnostic::MissingText {
                version: version.uri.clone(),
                yml_path: version.yml_path.clone(),
            });
            return;
        };

        let header = match read_header(self.fs, &text_path) {
            Ok(header) => header,
            Err(e) => {
                log::warn!("{}: cannot read header: {}", text_path.display(), e);
                HeaderMeta::default()
            }
        };
        let (Some(author), Some(book)) =
            (self.ctx.authors.get(author_uri), self.ctx.books.get(book_uri))
        else {
            return;
        };

        let url = text_url(
            &text_path.to_string_lossy(),
            &self.config.corpus_path.to_string_lossy(),
            self.config.output.output_files_path.as_deref(),
        );
        let row = compose_row(RowSources {
            version,
            author: &author.record,
            book: &book.record,
            header: &header,
            source_tags: self.resources.tags.get(&version.id),
            url,
        });
        log::debug!("{}: row composed", version.uri);
        self.ctx.rows.insert(version.uri.clone(), row);
        self.ctx
            .headers
            .insert(text_path.to_string_lossy().replace('\\', "/"), header.all);
    }
}
