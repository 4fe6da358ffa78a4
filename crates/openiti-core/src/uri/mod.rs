//! The corpus URI: `{date}{author}.{title}.{version}-{language}{edition_no}[.{extension}]`
//!
//! A URI is a strict prefix hierarchy: author URI ⊂ book URI ⊂ version URI.
//! Parsing validates every component that is present; building can emit any
//! prefix granularity together with the matching filesystem location.
//!
//! ```
//! use openiti_core::uri::{Uri, UriKind};
//!
//! let uri = Uri::parse("0255Jahiz.Hayawan.Sham19Y0023775-ara1.completed").unwrap();
//! assert_eq!(uri.build(UriKind::Author).unwrap(), "0255Jahiz");
//! assert_eq!(uri.build(UriKind::Book).unwrap(), "0255Jahiz.Hayawan");
//! assert_eq!(uri.to_string(), "0255Jahiz.Hayawan.Sham19Y0023775-ara1.completed");
//! ```

mod lang;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UriError;

pub use lang::is_language_code;

/// Annotation maturity of a text file, ordered from least to most mature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Extension {
    #[default]
    None,
    InProgress,
    Completed,
    Markdown,
}

impl Extension {
    /// Most mature first; the order in which sibling text files are probed.
    pub const BY_MATURITY: [Extension; 4] = [
        Extension::Markdown,
        Extension::Completed,
        Extension::InProgress,
        Extension::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Extension::None => "",
            Extension::InProgress => "inProgress",
            Extension::Completed => "completed",
            Extension::Markdown => "mARkdown",
        }
    }

    /// Unknown segments are treated as "no extension", never as an error.
    pub fn from_segment(segment: &str) -> Self {
        match segment {
            "inProgress" => Extension::InProgress,
            "completed" => Extension::Completed,
            "mARkdown" => Extension::Markdown,
            _ => Extension::None,
        }
    }

    /// File name suffix including the leading dot (empty for `None`).
    pub fn suffix(&self) -> String {
        match self {
            Extension::None => String::new(),
            other => format!(".{}", other.as_str()),
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Extension::None
    }
}

/// Directory arrangement of a corpus checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// `{base}/{bucket}AH/data/{author}/{book}/{file}`
    #[default]
    TwentyFiveYearRepos,
    /// `{base}/{author}/{book}/{file}`
    Release,
    /// `{base}/{file}`
    Flat,
}

/// Granularity requested from [`Uri::build`] and [`Uri::build_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UriKind {
    Date,
    Author,
    AuthorYml,
    Book,
    BookYml,
    Version,
    VersionYml,
    VersionFile,
}

impl UriKind {
    fn is_yml(&self) -> bool {
        matches!(self, UriKind::AuthorYml | UriKind::BookYml | UriKind::VersionYml)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Uri {
    pub date: String,
    pub author: String,
    pub title: String,
    pub version: String,
    pub language: String,
    pub edition_no: String,
    pub extension: Extension,
    /// Corpus root the URI was found under (parent of the `dddAH` folder).
    pub base_path: PathBuf,
}

impl Uri {
    pub fn new() -> Self {
        Self {
            base_path: PathBuf::from("."),
            ..Default::default()
        }
    }

    /// Parse a bare URI string or a path whose last component is a URI.
    pub fn parse(input: &str) -> Result<Self, UriError> {
        let parts: Vec<&str> = input.split(['/', '\\']).collect();
        let mut uri = Self::new();
        if parts.len() > 1 {
            let dirs = &parts[..parts.len() - 1];
            if let Some(pos) = dirs.iter().rposition(|d| is_repo_folder(d)) {
                uri.base_path = PathBuf::from(dirs[..pos].join("/"));
            }
        }
        let name = parts.last().copied().unwrap_or_default();
        uri.split(name)?;
        Ok(uri)
    }

    fn split(&mut self, uri_string: &str) -> Result<(), UriError> {
        if uri_string.is_empty() {
            return Err(UriError::Empty);
        }
        let segments: Vec<&str> = uri_string.split('.').collect();
        if segments.len() > 4 {
            return Err(UriError::TooManySegments(uri_string.to_string()));
        }

        let date_author = segments[0];
        let digits = date_author
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(date_author.len());
        let (date, author) = date_author.split_at(digits);
        if date.len() != 4 {
            return Err(UriError::InvalidDate(date.to_string()));
        }
        if author.is_empty() || !author.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(UriError::InvalidAuthorName(author.to_string()));
        }
        self.date = date.to_string();
        self.author = author.to_string();

        if let Some(title) = segments.get(1) {
            if title.is_empty() || !is_ascii_alnum(title) {
                return Err(UriError::InvalidTitle(title.to_string()));
            }
            self.title = title.to_string();
        }

        if let Some(version_lang) = segments.get(2) {
            let Some((version, lang)) = version_lang.rsplit_once('-') else {
                return Err(UriError::MissingLanguage(uri_string.to_string()));
            };
            if version.is_empty() || !is_ascii_alnum(version) {
                return Err(UriError::InvalidVersionId(version.to_string()));
            }
            let lang_end = lang
                .find(|c: char| c.is_ascii_digit())
                .unwrap_or(lang.len());
            let (language, edition_no) = lang.split_at(lang_end);
            if language.is_empty() {
                return Err(UriError::MissingLanguage(uri_string.to_string()));
            }
            if !edition_no.chars().all(|c| c.is_ascii_digit()) || !is_language_code(language) {
                return Err(UriError::InvalidLanguageCode(lang.to_string()));
            }
            self.version = version.to_string();
            self.language = language.to_string();
            self.edition_no = edition_no.to_string();
        }

        if let Some(ext) = segments.get(3) {
            self.extension = Extension::from_segment(ext);
        }
        Ok(())
    }

    /// The coarsest-to-finest classification of the components present.
    pub fn kind(&self) -> Option<UriKind> {
        if self.date.is_empty() || self.author.is_empty() {
            return None;
        }
        if self.title.is_empty() {
            return Some(UriKind::Author);
        }
        if !self.version.is_empty() && !self.language.is_empty() && !self.edition_no.is_empty() {
            return Some(UriKind::Version);
        }
        Some(UriKind::Book)
    }

    pub fn build(&self, kind: UriKind) -> Result<String, UriError> {
        let mut out = match kind {
            UriKind::Date => {
                if self.date.is_empty() {
                    return Err(UriError::MissingComponent("date"));
                }
                self.date.clone()
            }
            UriKind::Author | UriKind::AuthorYml => {
                if self.author.is_empty() {
                    return Err(UriError::MissingComponent("author"));
                }
                format!("{}{}", self.build(UriKind::Date)?, self.author)
            }
            UriKind::Book | UriKind::BookYml => {
                if self.title.is_empty() {
                    return Err(UriError::MissingComponent("title"));
                }
                format!("{}.{}", self.build(UriKind::Author)?, self.title)
            }
            UriKind::Version | UriKind::VersionYml | UriKind::VersionFile => {
                if self.version.is_empty() {
                    return Err(UriError::MissingComponent("version"));
                }
                if self.language.is_empty() {
                    return Err(UriError::MissingComponent("language"));
                }
                let mut s = format!(
                    "{}.{}-{}{}",
                    self.build(UriKind::Book)?,
                    self.version,
                    self.language,
                    self.edition_no
                );
                if kind == UriKind::VersionFile {
                    s.push_str(&self.extension.suffix());
                }
                s
            }
        };
        if kind.is_yml() {
            out.push_str(".yml");
        }
        Ok(out)
    }

    pub fn author_uri(&self) -> Result<String, UriError> {
        self.build(UriKind::Author)
    }

    pub fn book_uri(&self) -> Result<String, UriError> {
        self.build(UriKind::Book)
    }

    pub fn version_uri(&self) -> Result<String, UriError> {
        self.build(UriKind::Version)
    }

    /// Filesystem location of the requested granularity under `base_path`.
    pub fn build_path(&self, kind: UriKind, layout: Layout) -> Result<PathBuf, UriError> {
        let base = self.base_path.clone();
        let path = match layout {
            Layout::Flat => match kind {
                UriKind::Date | UriKind::Author | UriKind::Book => base,
                _ => base.join(self.build(kind)?),
            },
            Layout::Release => match kind {
                UriKind::Date => base,
                UriKind::Author => base.join(self.build(UriKind::Author)?),
                UriKind::AuthorYml => self
                    .build_path(UriKind::Author, layout)?
                    .join(self.build(kind)?),
                UriKind::Book => self
                    .build_path(UriKind::Author, layout)?
                    .join(self.build(UriKind::Book)?),
                _ => self.build_path(UriKind::Book, layout)?.join(self.build(kind)?),
            },
            Layout::TwentyFiveYearRepos => match kind {
                UriKind::Date => base.join(repo_folder(&self.date)?),
                UriKind::Author => self
                    .build_path(UriKind::Date, layout)?
                    .join("data")
                    .join(self.build(UriKind::Author)?),
                UriKind::AuthorYml => self
                    .build_path(UriKind::Author, layout)?
                    .join(self.build(kind)?),
                UriKind::Book => self
                    .build_path(UriKind::Author, layout)?
                    .join(self.build(UriKind::Book)?),
                _ => self.build_path(UriKind::Book, layout)?.join(self.build(kind)?),
            },
        };
        Ok(path)
    }

    /// Non-empty components in URI order.
    pub fn components(&self) -> Vec<&str> {
        [
            self.date.as_str(),
            self.author.as_str(),
            self.title.as_str(),
            self.version.as_str(),
            self.language.as_str(),
            self.edition_no.as_str(),
            self.extension.as_str(),
        ]
        .into_iter()
        .filter(|c| !c.is_empty())
        .collect()
    }

    pub fn repr(&self) -> String {
        format!(
            "uri(date:{}, author:{}, title:{}, version:{}, language:{}, edition_no:{}, extension:{})",
            self.date,
            self.author,
            self.title,
            self.version,
            self.language,
            self.edition_no,
            self.extension.as_str()
        )
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if !self.version.is_empty() && !self.language.is_empty() {
            UriKind::VersionFile
        } else if !self.title.is_empty() {
            UriKind::Book
        } else if !self.author.is_empty() {
            UriKind::Author
        } else if !self.date.is_empty() {
            UriKind::Date
        } else {
            return Ok(());
        };
        match self.build(kind) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl FromStr for Uri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::parse(s)
    }
}

/// 25-year bucket of a death date: the date itself when it is a multiple of
/// 25, otherwise the next multiple of 25. `None` when that overflows.
pub fn bucket(date: u32) -> Option<u32> {
    date.div_ceil(25).checked_mul(25)
}

/// Name of the repository folder holding a date, e.g. `"0255"` -> `"0275AH"`.
pub fn repo_folder(date: &str) -> Result<String, UriError> {
    let trimmed = date.trim_end_matches("AH");
    let value: u32 = trimmed
        .parse()
        .map_err(|_| UriError::InvalidDate(date.to_string()))?;
    let bucket = bucket(value).ok_or_else(|| UriError::InvalidDate(date.to_string()))?;
    Ok(format!("{:04}AH", bucket))
}

fn is_repo_folder(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() == 6 && name.ends_with("AH") && bytes[..4].iter().all(u8::is_ascii_digit)
}

fn is_ascii_alnum(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric())
}
