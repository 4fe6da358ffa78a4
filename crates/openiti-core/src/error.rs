use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Structural failures while parsing or building a corpus URI.
///
/// These are always local to one file: the walker logs them and skips the file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    #[error("empty URI")]
    Empty,
    #[error("URI ({0}) has too many parts separated by dots")]
    TooManySegments(String),
    #[error("URI must start with a date of 4 digits ({0:?} has {len})", len = .0.len())]
    InvalidDate(String),
    #[error("author name ({0:?}) should not be empty or contain digits or non-ASCII characters")]
    InvalidAuthorName(String),
    #[error("title ({0:?}) should contain only ASCII letters and digits")]
    InvalidTitle(String),
    #[error("version ID ({0:?}) should contain only ASCII letters and digits")]
    InvalidVersionId(String),
    #[error("URI ({0}) misses a language code after '-'")]
    MissingLanguage(String),
    #[error("language code ({0:?}) should be an ISO 639-2 code of 3 characters")]
    InvalidLanguageCode(String),
    #[error("the {0} component of the URI was not defined")]
    MissingComponent(&'static str),
}

/// Failures of the sidecar record collaborator.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("sidecar not found: {0}")]
    NotFound(PathBuf),
    #[error("malformed sidecar {path} (line {line}): {content:?}")]
    Malformed {
        path: PathBuf,
        line: usize,
        content: String,
    },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum MetaError {
    #[error(transparent)]
    Uri(#[from] UriError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("File System error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON (de)serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML (de)serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MetaError>;
