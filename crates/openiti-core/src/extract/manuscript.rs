//! Holding institutions (locations) and the manuscripts they hold.
//!
//! A location is named by a code such as `BL` or `Leiden2`; a manuscript by
//! `{location}.{shelfmark}`. Both have their sidecar in the manuscripts folder.

use serde::Serialize;

use crate::placeholder::{self, FieldCategory};
use crate::record::Record;

const LOC_NAME_KEY: &str = "10#LOC#NAME######:";
const LOC_CITY_KEY: &str = "10#LOC#CITY######:";
const LOC_COUNTRY_KEY: &str = "10#LOC#COUNTRY###:";

const MS_TITLE_KEY: &str = "10#MS#TITLE#####:";
const MS_DATE_KEY: &str = "10#MS#DATE######:";
const MS_BOOK_KEY: &str = "10#MS#BOOK######:";
const MS_SCRIBE_KEY: &str = "10#MS#SCRIBE####:";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationRecord {
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ManuscriptRecord {
    pub id: String,
    pub location: String,
    pub shelfmark: String,
    pub title: String,
    pub date: String,
    /// Book URI the manuscript witnesses
    pub book: String,
    pub scribe: String,
}

/// Split a manuscript ID into location code and shelfmark.
pub fn split_manuscript_id(id: &str) -> Option<(&str, &str)> {
    let (location, shelfmark) = id.split_once('.')?;
    let mut chars = location.chars();
    let valid_code = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric());
    (valid_code && !shelfmark.trim().is_empty()).then_some((location, shelfmark))
}

fn field(sidecar: &Record, category: FieldCategory, key: &str) -> String {
    placeholder::real_value(category, sidecar.get(key))
        .map(str::to_string)
        .unwrap_or_default()
}

pub fn extract_location(code: &str, sidecar: &Record) -> LocationRecord {
    LocationRecord {
        code: code.to_string(),
        name: field(sidecar, FieldCategory::Location, LOC_NAME_KEY),
        city: field(sidecar, FieldCategory::Location, LOC_CITY_KEY),
        country: field(sidecar, FieldCategory::Location, LOC_COUNTRY_KEY),
    }
}

/// `None` when `id` is not a well-formed manuscript ID.
pub fn extract_manuscript(id: &str, sidecar: &Record) -> Option<ManuscriptRecord> {
    let (location, shelfmark) = split_manuscript_id(id)?;
    Some(ManuscriptRecord {
        id: id.to_string(),
        location: location.to_string(),
        shelfmark: shelfmark.to_string(),
        title: field(sidecar, FieldCategory::Manuscript, MS_TITLE_KEY),
        date: field(sidecar, FieldCategory::Manuscript, MS_DATE_KEY),
        book: field(sidecar, FieldCategory::Manuscript, MS_BOOK_KEY),
        scribe: field(sidecar, FieldCategory::Manuscript, MS_SCRIBE_KEY),
    })
}
