//! Sidecar records: flat `KEY: value` files next to every author, book and
//! version folder.
//!
//! Keys are fixed-width tags such as `00#VERS#LENGTH###:`; values may be
//! wrapped over several lines, continuation lines starting with whitespace.

use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::RecordError;
use crate::vfs::FileSystem;

pub const WRAP_WIDTH: usize = 72;
const CONTINUATION_INDENT: &str = "    ";

/// Separator line between records in the master record dump.
pub static RECORD_SEPARATOR: Lazy<String> = Lazy::new(|| format!("##RECORD{}\n", "#".repeat(64)));

static KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([\w#]+:)(.*)$").expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record {
    entries: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `key`, or the empty string when absent.
    pub fn get(&self, key: &str) -> &str {
        self.entries.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse the text of a sidecar file; `path` is only used in errors.
    pub fn parse(content: &str, path: &Path) -> Result<Self, RecordError> {
        let mut record = Record::new();
        let mut current: Option<String> = None;

        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            if line.starts_with([' ', '\t']) {
                let Some(key) = &current else {
                    return Err(malformed(path, idx, line));
                };
                if let Some(value) = record.entries.get_mut(key) {
                    join_continuation(value, line.trim());
                }
                continue;
            }
            let Some(caps) = KEY_RE.captures(line) else {
                return Err(malformed(path, idx, line));
            };
            let key = caps[1].to_string();
            record.entries.insert(key.clone(), caps[2].trim().to_string());
            current = Some(key);
        }
        Ok(record)
    }

    /// Serialize with sorted keys, long values wrapped.
    pub fn to_yml(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| {
                let entry = format!("{} {}", k, v);
                if entry.contains("#URI#") {
                    entry
                } else {
                    wrap(&entry, WRAP_WIDTH).join(&format!("\n{}", CONTINUATION_INDENT))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn malformed(path: &Path, idx: usize, line: &str) -> RecordError {
    RecordError::Malformed {
        path: path.to_path_buf(),
        line: idx + 1,
        content: line.to_string(),
    }
}

/// A break after a hyphen re-joins without a space.
fn join_continuation(value: &mut String, next: &str) {
    if !value.ends_with('-') && !value.is_empty() {
        value.push(' ');
    }
    value.push_str(next);
}

/// Greedy word wrap; words longer than `width` are broken.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let needed = if line_len == 0 { word.len() } else { line_len + 1 + word.len() };
            if needed <= width {
                if line_len > 0 {
                    line.push(' ');
                    line_len += 1;
                }
                line.extend(word.iter());
                line_len += word.len();
                break;
            }
            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
                continue;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
    }
    if line_len > 0 {
        lines.push(line);
    }
    lines
}

/// Read a sidecar through the file system abstraction.
pub fn read(fs: &dyn FileSystem, path: &Path) -> Result<Record, RecordError> {
    if !fs.is_file(path) {
        return Err(RecordError::NotFound(path.to_path_buf()));
    }
    let content = fs.read_to_string(path).map_err(|source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Record::parse(&content, path)
}

pub fn write(fs: &dyn FileSystem, path: &Path, record: &Record) -> Result<(), RecordError> {
    fs.write(path, &record.to_yml())
        .map_err(|source| RecordError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Best-effort repair of a malformed sidecar: lines that are not entries are
/// joined to the previous entry, or dropped before the first one. The file is
/// rewritten in canonical form.
pub fn repair(fs: &dyn FileSystem, path: &Path) -> Result<Record, RecordError> {
    let content = fs.read_to_string(path).map_err(|source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut record = Record::new();
    let mut current: Option<String> = None;
    let mut dropped = 0usize;

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(caps) = KEY_RE.captures(line) {
            let key = caps[1].to_string();
            record.entries.insert(key.clone(), caps[2].trim().to_string());
            current = Some(key);
        } else if let Some(value) = current.as_ref().and_then(|k| record.entries.get_mut(k)) {
            join_continuation(value, line.trim());
        } else {
            dropped += 1;
        }
    }
    if dropped > 0 {
        log::warn!("{}: dropped {} unrecognised line(s) while repairing", path.display(), dropped);
    }
    write(fs, path, &record)?;
    Ok(record)
}

/// Read a sidecar, repairing it once if it is malformed.
///
/// An absent file is reported as `NotFound`; callers treat it as an empty
/// record.
pub fn read_or_repair(fs: &dyn FileSystem, path: &Path) -> Result<Record, RecordError> {
    match read(fs, path) {
        Err(RecordError::Malformed { line, content, .. }) => {
            log::warn!(
                "{}: malformed sidecar (line {}: {:?}), attempting repair",
                path.display(),
                line,
                content
            );
            repair(fs, path)
        }
        other => other,
    }
}
