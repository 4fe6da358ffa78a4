use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::counter::{CountMode, TextCounter};
use crate::placeholder::{self, FieldCategory};
use crate::record::Record;
use crate::status::Status;
use crate::uri::{Extension, Uri};
use crate::vfs::FileSystem;

pub const LENGTH_KEY: &str = "00#VERS#LENGTH###:";
pub const CHAR_LENGTH_KEY: &str = "00#VERS#CLENGTH##:";
pub const BASED_KEY: &str = "80#VERS#BASED####:";
pub const MANUSCRIPT_KEY: &str = "80#VERS#MANUSCRIPT:";
pub const ISSUES_KEY: &str = "90#VERS#ISSUES###:";

static ISSUE_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z_]{5,}").expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VersionRecord {
    pub uri: String,
    pub book_uri: String,
    pub author_uri: String,
    pub id: String,
    pub date: String,
    pub language: String,
    /// Leading letters of the version ID (`Shamela`, `JK`, ...)
    pub collection: String,
    pub extension: Extension,
    pub tok_length: u64,
    pub char_length: Option<u64>,
    pub declared_primary: bool,
    pub issue_tags: Vec<String>,
    pub based_on: Option<String>,
    pub manuscript: Option<String>,
    pub text_path: Option<PathBuf>,
    pub yml_path: PathBuf,
    pub status: Status,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lengths {
    pub tokens: u64,
    pub chars: Option<u64>,
}

/// A usable stored count: numeric and non-zero.
fn stored_count(sidecar: &Record, key: &str) -> Option<u64> {
    sidecar.get(key).trim().parse::<u64>().ok().filter(|n| *n > 0)
}

/// Lengths of a version, recounting from the text when the sidecar value is
/// missing, non-numeric or zero (or when `force` is set).
///
/// A recount is written into `sidecar`; the second value tells the caller
/// the sidecar changed and must be persisted.
pub fn measure_lengths(
    fs: &dyn FileSystem,
    counter: &dyn TextCounter,
    sidecar: &mut Record,
    text_path: Option<&Path>,
    incl_char_length: bool,
    force: bool,
) -> (Lengths, bool) {
    let tokens = stored_count(sidecar, LENGTH_KEY);
    let chars = incl_char_length
        .then(|| stored_count(sidecar, CHAR_LENGTH_KEY))
        .flatten();
    let stale = force || tokens.is_none() || (incl_char_length && chars.is_none());

    if stale {
        if let Some(path) = text_path {
            match fs.read_to_string(path) {
                Ok(text) => {
                    let tokens = counter.count(&text, CountMode::Token);
                    sidecar.set(LENGTH_KEY, tokens.to_string());
                    let chars = incl_char_length.then(|| counter.count(&text, CountMode::Char));
                    if let Some(c) = chars {
                        sidecar.set(CHAR_LENGTH_KEY, c.to_string());
                    }
                    log::debug!("{}: recounted {} tokens", path.display(), tokens);
                    return (Lengths { tokens, chars }, true);
                }
                Err(e) => log::warn!("{}: cannot recount: {}", path.display(), e),
            }
        }
    }

    let lengths = Lengths {
        tokens: tokens.unwrap_or(0),
        chars: incl_char_length.then(|| chars.unwrap_or(0)),
    };
    (lengths, false)
}

/// Build the version record. `text` is the most mature existing text file.
pub fn extract_version(
    uri: &Uri,
    sidecar: &Record,
    text: Option<(PathBuf, Extension)>,
    lengths: Lengths,
    yml_path: &Path,
    primary_tag: &str,
) -> VersionRecord {
    let issues = sidecar.get(ISSUES_KEY);
    let collection = uri
        .version
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    let (text_path, extension) = match text {
        Some((path, ext)) => (Some(path), ext),
        None => (None, Extension::None),
    };

    VersionRecord {
        uri: uri.version_uri().unwrap_or_default(),
        book_uri: uri.book_uri().unwrap_or_default(),
        author_uri: uri.author_uri().unwrap_or_default(),
        id: uri.version.clone(),
        date: uri.date.clone(),
        language: uri.language.clone(),
        collection,
        extension,
        tok_length: lengths.tokens,
        char_length: lengths.chars,
        declared_primary: issues.contains(primary_tag),
        issue_tags: ISSUE_TAG_RE
            .find_iter(issues)
            .map(|m| m.as_str().to_string())
            .collect(),
        based_on: placeholder::real_value(FieldCategory::Edition, sidecar.get(BASED_KEY))
            .map(str::to_string),
        manuscript: placeholder::real_value(FieldCategory::Manuscript, sidecar.get(MANUSCRIPT_KEY))
            .map(str::to_string),
        text_path,
        yml_path: yml_path.to_path_buf(),
        status: Status::Secondary,
    }
}
