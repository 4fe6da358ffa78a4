use super::*;
use crate::extract::version::{LENGTH_KEY, MANUSCRIPT_KEY};
use crate::geo::{Gazetteer, GeoProblem};
use crate::record::Record;
use crate::uri::{Layout, Uri, UriKind};
use crate::vfs::PhysicalFileSystem;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TEXT: &str = "######OpenITI#\n#META# 010.AuthorNAME\t:: الجاحظ\n#META# 020.BookTITLE\t:: الحيوان\n#META#Header#End#\n\n# قال أبو عثمان\n";

struct Corpus {
    dir: TempDir,
}

impl Corpus {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Corpus whose root folder name starts with `prefix`.
    fn with_prefix(prefix: &str) -> Self {
        Self {
            dir: tempfile::Builder::new().prefix(prefix).tempdir().unwrap(),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Book folder in the 25-year layout.
    fn book_folder(&self, book_uri: &str) -> PathBuf {
        let mut uri = Uri::parse(book_uri).unwrap();
        uri.base_path = self.root().to_path_buf();
        uri.build_path(UriKind::Book, Layout::TwentyFiveYearRepos)
            .unwrap()
    }

    fn write(&self, path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Version sidecar plus, when `extension` is given, its text file.
    fn version(&self, version_uri: &str, sidecar: &str, extension: Option<&str>) -> PathBuf {
        let uri = Uri::parse(version_uri).unwrap();
        let folder = self.book_folder(&uri.book_uri().unwrap());
        let yml = folder.join(format!("{}.yml", version_uri));
        self.write(&yml, sidecar);
        if let Some(ext) = extension {
            self.write(&folder.join(format!("{}{}", version_uri, ext)), TEXT);
        }
        yml
    }

    fn author(&self, author_uri: &str, book_uri: &str, sidecar: &str) {
        let folder = self.book_folder(book_uri);
        let path = folder.parent().unwrap().join(format!("{}.yml", author_uri));
        self.write(&path, sidecar);
    }

    fn config(&self) -> MetadataConfig {
        MetadataConfig {
            corpus_path: self.root().to_path_buf(),
            ..Default::default()
        }
    }

    fn run(&self, config: &MetadataConfig, resources: &Resources) -> Aggregation {
        aggregate(config, &PhysicalFileSystem, resources)
    }
}

fn length(n: u64) -> String {
    format!("{} {}\n", LENGTH_KEY, n)
}

fn row<'a>(agg: &'a Aggregation, uri: &str) -> &'a MetadataRow {
    agg.rows
        .iter()
        .find(|r| r.version_uri == uri)
        .unwrap_or_else(|| panic!("no row for {}", uri))
}

#[test]
fn test_completed_version_beats_longer_bare_version() {
    let corpus = Corpus::new();
    corpus.version("0255Jahiz.Hayawan.JK000001-ara1", &length(500), Some(".completed"));
    corpus.version("0255Jahiz.Hayawan.Shamela0002-ara1", &length(900_000), Some(""));

    let agg = corpus.run(&corpus.config(), &Resources::default());

    assert_eq!(agg.rows.len(), 2);
    assert_eq!(row(&agg, "0255Jahiz.Hayawan.JK000001-ara1").status, Status::Primary);
    assert_eq!(row(&agg, "0255Jahiz.Hayawan.Shamela0002-ara1").status, Status::Secondary);
    assert_eq!(
        agg.versions["0255Jahiz.Hayawan.JK000001-ara1"].status,
        Status::Primary
    );
    // Stored lengths are trusted, not recounted.
    assert_eq!(row(&agg, "0255Jahiz.Hayawan.Shamela0002-ara1").tok_length, 900_000);
    assert_eq!(agg.report.stats.recounted, 0);
}

#[test]
fn test_rows_are_sorted_and_memos_are_shared() {
    let corpus = Corpus::new();
    corpus.version("0255Jahiz.Hayawan.Shamela0002-ara1", &length(10), Some(""));
    corpus.version("0255Jahiz.Hayawan.JK000001-ara1", &length(20), Some(""));
    corpus.version("0255Jahiz.Bukhala.JK000003-ara1", &length(30), Some(""));

    let agg = corpus.run(&corpus.config(), &Resources::default());

    let uris: Vec<&str> = agg.rows.iter().map(|r| r.version_uri.as_str()).collect();
    let mut sorted = uris.clone();
    sorted.sort();
    assert_eq!(uris, sorted);
    assert_eq!(agg.authors.len(), 1);
    assert_eq!(agg.books.len(), 2);
    // second Hayawan version: author + book hit; Bukhala: author hit
    assert_eq!(agg.report.memo_hits, 3);
}

#[test]
fn test_missing_length_is_recounted_and_persisted() {
    let corpus = Corpus::new();
    let yml = corpus.version("0255Jahiz.Hayawan.JK000001-ara1", "", Some(".mARkdown"));

    let agg = corpus.run(&corpus.config(), &Resources::default());

    assert_eq!(row(&agg, "0255Jahiz.Hayawan.JK000001-ara1").tok_length, 3);
    assert_eq!(agg.report.stats.recounted, 1);
    let sidecar = Record::parse(&fs::read_to_string(&yml).unwrap(), &yml).unwrap();
    assert_eq!(sidecar.get(LENGTH_KEY), "3");
}

#[test]
fn test_missing_text_is_excluded_but_recorded() {
    let corpus = Corpus::new();
    corpus.version("0255Jahiz.Hayawan.JK000001-ara1", &length(900_000), None);
    corpus.version("0255Jahiz.Hayawan.Shamela0002-ara1", &length(5), Some(""));

    let agg = corpus.run(&corpus.config(), &Resources::default());

    assert_eq!(agg.rows.len(), 1);
    assert_eq!(row(&agg, "0255Jahiz.Hayawan.Shamela0002-ara1").status, Status::Primary);
    assert!(agg.versions.contains_key("0255Jahiz.Hayawan.JK000001-ara1"));
    assert_eq!(agg.report.excluded, vec!["0255Jahiz.Hayawan.JK000001-ara1"]);
    assert_eq!(agg.report.stats.missing_texts, 1);
    assert!(agg
        .report
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::MissingText { version, .. } if version == "0255Jahiz.Hayawan.JK000001-ara1")));
}

#[test]
fn test_split_parts_are_primary_and_compound_is_secondary() {
    let corpus = Corpus::new();
    corpus.version("0310Tabari.Tarikh.ShamelaVolsA-ara1", &length(100), Some(""));
    corpus.version("0310Tabari.Tarikh.ShamelaVolsB-ara1", &length(150), Some(""));

    let agg = corpus.run(&corpus.config(), &Resources::default());

    let compound = row(&agg, "0310Tabari.Tarikh.ShamelaVols-ara1");
    assert_eq!(compound.tok_length, 250);
    assert_eq!(compound.status, Status::Secondary);
    assert_eq!(compound.id, "ShamelaVols");
    assert_eq!(row(&agg, "0310Tabari.Tarikh.ShamelaVolsA-ara1").status, Status::Primary);
    assert_eq!(row(&agg, "0310Tabari.Tarikh.ShamelaVolsB-ara1").status, Status::Primary);
    assert_eq!(agg.splits.len(), 1);
}

#[test]
fn test_split_part_without_text_stays_secondary() {
    let corpus = Corpus::new();
    corpus.version("0310Tabari.Tarikh.ShamelaVolsA-ara1", &length(100), Some(""));
    corpus.version("0310Tabari.Tarikh.ShamelaVolsB-ara1", &length(150), None);

    let agg = corpus.run(&corpus.config(), &Resources::default());

    let missing = &agg.versions["0310Tabari.Tarikh.ShamelaVolsB-ara1"];
    assert!(missing.text_path.is_none());
    assert_eq!(missing.status, Status::Secondary);
    assert_eq!(
        agg.versions["0310Tabari.Tarikh.ShamelaVolsA-ara1"].status,
        Status::Primary
    );
    assert_eq!(agg.report.excluded, vec!["0310Tabari.Tarikh.ShamelaVolsB-ara1"]);
    assert_eq!(row(&agg, "0310Tabari.Tarikh.ShamelaVols-ara1").tok_length, 100);
}

#[test]
fn test_low_priority_collection_loses_to_bare_sibling() {
    let corpus = Corpus::new();
    corpus.version("0255Jahiz.Hayawan.Sham30K0001-ara1", &length(900_000), Some(".mARkdown"));
    corpus.version("0255Jahiz.Hayawan.JK000002-ara1", &length(5), Some(""));

    let agg = corpus.run(&corpus.config(), &Resources::default());

    assert_eq!(row(&agg, "0255Jahiz.Hayawan.JK000002-ara1").status, Status::Primary);
    assert_eq!(row(&agg, "0255Jahiz.Hayawan.Sham30K0001-ara1").status, Status::Secondary);
}

#[test]
fn test_low_priority_tag_in_corpus_root_is_ignored() {
    let corpus = Corpus::with_prefix("Sham30K");
    corpus.version("0255Jahiz.Hayawan.JK000001-ara1", &length(5), Some(".completed"));
    corpus.version("0255Jahiz.Hayawan.Shamela0002-ara1", &length(10), Some(""));

    let agg = corpus.run(&corpus.config(), &Resources::default());

    // Zeroed scores would tie and hand the win to the larger URI.
    assert_eq!(row(&agg, "0255Jahiz.Hayawan.JK000001-ara1").status, Status::Primary);
    assert_eq!(row(&agg, "0255Jahiz.Hayawan.Shamela0002-ara1").status, Status::Secondary);
}

#[test]
fn test_malformed_author_sidecar_is_repaired() {
    let corpus = Corpus::new();
    corpus.version("0255Jahiz.Hayawan.JK000001-ara1", &length(5), Some(""));
    corpus.author("0255Jahiz", "0255Jahiz.Hayawan", "stray text\n00#AUTH#URI######: 0255Jahiz\n");

    let agg = corpus.run(&corpus.config(), &Resources::default());

    let row = row(&agg, "0255Jahiz.Hayawan.JK000001-ara1");
    assert_eq!(row.author_from_uri, "Jahiz");
    assert_eq!(row.date, "0255");
    let author_yml = corpus
        .book_folder("0255Jahiz.Hayawan")
        .parent()
        .unwrap()
        .join("0255Jahiz.yml");
    let repaired = fs::read_to_string(author_yml).unwrap();
    assert!(!repaired.contains("stray text"));
    assert!(repaired.contains("0255Jahiz"));
}

#[test]
fn test_declared_primary_wins() {
    let corpus = Corpus::new();
    let declared = format!("{}90#VERS#ISSUES###: PRIMARY_VERSION\n", length(5));
    corpus.version("0255Jahiz.Hayawan.JK000001-ara1", &declared, Some(""));
    corpus.version("0255Jahiz.Hayawan.Shamela0002-ara1", &length(900_000), Some(".mARkdown"));

    let agg = corpus.run(&corpus.config(), &Resources::default());

    assert_eq!(row(&agg, "0255Jahiz.Hayawan.JK000001-ara1").status, Status::Primary);
    assert_eq!(row(&agg, "0255Jahiz.Hayawan.Shamela0002-ara1").status, Status::Secondary);
    assert!(agg.report.ambiguous.is_empty());
}

#[test]
fn test_bad_uri_is_skipped_and_duplicates_reported() {
    let corpus = Corpus::new();
    corpus.version("0255Jahiz.Hayawan.JK000001-ara1", &length(5), Some(""));
    corpus.version("0255Jahiz.Bukhala.JK000001-ara1", &length(5), Some(""));
    let folder = corpus.book_folder("0255Jahiz.Hayawan");
    corpus.write(&folder.join("0255Jahiz.Hayawan.JK000009-xyz1.yml"), &length(5));

    let agg = corpus.run(&corpus.config(), &Resources::default());

    assert_eq!(agg.report.stats.skipped, 1);
    assert_eq!(agg.rows.len(), 2);
    assert_eq!(
        agg.report.duplicate_ids["JK000001"],
        vec![
            "0255Jahiz.Bukhala.JK000001-ara1.yml",
            "0255Jahiz.Hayawan.JK000001-ara1.yml"
        ]
    );
}

#[test]
fn test_sidecars_header_and_excluded_folders() {
    let corpus = Corpus::new();
    corpus.version("0255Jahiz.Hayawan.JK000001-ara1", &length(5), Some(".completed"));
    corpus.author(
        "0255Jahiz",
        "0255Jahiz.Hayawan",
        "10#AUTH#SHUHRA#AR: al-Ǧāḥiẓ\n20#AUTH#BORN#####: BASRA_111E305N_S\n",
    );
    corpus.write(
        &corpus.root().join("maintenance/0255Jahiz.Hayawan.JK000002-ara1.yml"),
        &length(5),
    );

    let mut resources = Resources::default();
    resources.gazetteer = Some(Gazetteer::parse("KUFA_443E320N_S\n"));
    let agg = corpus.run(&corpus.config(), &resources);

    assert_eq!(agg.report.stats.yml_files, 1);
    let r = row(&agg, "0255Jahiz.Hayawan.JK000001-ara1");
    assert_eq!(r.author_shuhra, "al-Ǧāḥiẓ");
    assert_eq!(r.author_ar, vec!["الجاحظ"]);
    assert_eq!(r.title_ar, vec!["الحيوان"]);
    assert!(r.tags.contains(&"COMPLETED".to_string()));
    assert!(r.tags.contains(&"born@BASRA_111E305N_S".to_string()));

    assert_eq!(agg.geo_issues.len(), 1);
    assert_eq!(agg.geo_issues[0].problem, GeoProblem::Error);
    assert_eq!(agg.geo_issues[0].author_yml, "0255Jahiz.yml");

    assert_eq!(agg.headers.len(), 1);
    assert_eq!(agg.yml_dump.len(), 1);
    assert!(agg.yml_dump[0].contains("10#AUTH#SHUHRA#AR: al-Ǧāḥiẓ"));
}

#[test]
fn test_flat_layout_finds_author_next_to_version() {
    let corpus = Corpus::new();
    corpus.write(
        &corpus.root().join("0255Jahiz.Hayawan.JK000001-ara1.yml"),
        &length(5),
    );
    corpus.write(&corpus.root().join("0255Jahiz.Hayawan.JK000001-ara1"), TEXT);
    corpus.write(
        &corpus.root().join("0255Jahiz.yml"),
        "10#AUTH#SHUHRA#AR: al-Ǧāḥiẓ\n",
    );
    let mut config = corpus.config();
    config.layout = Layout::Flat;

    let agg = corpus.run(&config, &Resources::default());

    assert_eq!(agg.authors.get("0255Jahiz").unwrap().shuhra, "al-Ǧāḥiẓ");
}

#[test]
fn test_transcriptions_resolved_per_manuscript() {
    let corpus = Corpus::new();
    let ms = corpus.root().join("manuscripts");
    corpus.write(&ms.join("BL.yml"), "10#LOC#NAME######: British Library\n");
    corpus.write(
        &ms.join("BL.Or4567.yml"),
        "10#MS#BOOK######: 0255Jahiz.Hayawan\n",
    );
    let sidecar = |n: u64| format!("{}{} BL.Or4567\n", length(n), MANUSCRIPT_KEY);
    corpus.version("0255Jahiz.Hayawan.MSBL001-ara1", &sidecar(10), Some(""));
    corpus.version("0255Jahiz.Hayawan.MSBL002-ara1", &sidecar(20), Some(""));

    let mut config = corpus.config();
    config.exclude.push("manuscripts".to_string());
    config.manuscripts_path = Some(ms);
    let agg = corpus.run(&config, &Resources::default());

    assert_eq!(agg.manuscripts.len(), 1);
    assert_eq!(agg.manuscripts.get("BL.Or4567").unwrap().book, "0255Jahiz.Hayawan");
    assert_eq!(agg.locations.get("BL").unwrap().name, "British Library");
    assert_eq!(agg.transcriptions.len(), 2);
    assert_eq!(
        agg.transcriptions["0255Jahiz.Hayawan.MSBL002-ara1"].status,
        Status::Primary
    );
    assert_eq!(
        agg.transcriptions["0255Jahiz.Hayawan.MSBL001-ara1"].status,
        Status::Secondary
    );
}
