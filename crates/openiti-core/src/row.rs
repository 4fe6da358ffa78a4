//! The master table: one row per version text.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::MetadataConfig;
use crate::extract::{dedup, insert_spaces, AuthorRecord, BookRecord, VersionRecord};
use crate::header::{HeaderCategory, HeaderMeta};
use crate::status::Status;

/// Joins multi-valued cells.
pub const SEPARATOR: &str = " :: ";

const COMBINED_COLUMNS: [&str; 14] = [
    "versionUri",
    "date",
    "author",
    "book",
    "title",
    "ed_info",
    "id",
    "status",
    "tok_length",
    "url",
    "tags",
    "author_from_uri",
    "author_shuhra",
    "author_full_name",
];

const SPLIT_COLUMNS: [&str; 16] = [
    "versionUri",
    "date",
    "author_ar",
    "author_lat",
    "book",
    "title_ar",
    "title_lat",
    "ed_info",
    "id",
    "status",
    "tok_length",
    "url",
    "tags",
    "author_from_uri",
    "author_lat_shuhra",
    "author_lat_full_name",
];

/// Column layout of the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Columns {
    pub split_ar_lat: bool,
    pub incl_char_length: bool,
}

impl Columns {
    pub fn from_config(config: &MetadataConfig) -> Self {
        Self {
            split_ar_lat: config.split_ar_lat,
            incl_char_length: config.incl_char_length,
        }
    }

    pub fn header(&self) -> Vec<&'static str> {
        let mut header: Vec<&'static str> = if self.split_ar_lat {
            SPLIT_COLUMNS.to_vec()
        } else {
            COMBINED_COLUMNS.to_vec()
        };
        if self.incl_char_length {
            header.push("char_length");
        }
        header
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataRow {
    pub version_uri: String,
    pub date: String,
    pub author_ar: Vec<String>,
    pub author_lat: Vec<String>,
    pub book: String,
    pub title_ar: Vec<String>,
    pub title_lat: Vec<String>,
    pub ed_info: Vec<String>,
    pub id: String,
    pub status: Status,
    pub tok_length: u64,
    pub char_length: Option<u64>,
    pub url: String,
    pub tags: Vec<String>,
    pub author_from_uri: String,
    pub author_shuhra: String,
    pub author_full_name: String,
}

/// Tabs and line breaks would break the TSV layout.
fn clean(value: &str) -> String {
    value.replace(['\t', '\r', '\n'], " ")
}

fn joined(values: &[String]) -> String {
    clean(&values.join(SEPARATOR))
}

/// `lat :: ar`, leaving out an empty side.
fn combined(lat: &[String], ar: &[String]) -> String {
    [joined(lat), joined(ar)]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

impl MetadataRow {
    pub fn cells(&self, columns: Columns) -> Vec<String> {
        let mut cells = vec![clean(&self.version_uri), clean(&self.date)];
        if columns.split_ar_lat {
            cells.push(joined(&self.author_ar));
            cells.push(joined(&self.author_lat));
            cells.push(clean(&self.book));
            cells.push(joined(&self.title_ar));
            cells.push(joined(&self.title_lat));
        } else {
            cells.push(combined(&self.author_lat, &self.author_ar));
            cells.push(clean(&self.book));
            cells.push(combined(&self.title_lat, &self.title_ar));
        }
        cells.extend([
            joined(&self.ed_info),
            clean(&self.id),
            self.status.as_str().to_string(),
            self.tok_length.to_string(),
            clean(&self.url),
            joined(&self.tags),
            clean(&self.author_from_uri),
            clean(&self.author_shuhra),
            clean(&self.author_full_name),
        ]);
        if columns.incl_char_length {
            cells.push(self.char_length.unwrap_or(0).to_string());
        }
        cells
    }

    pub fn to_tsv_line(&self, columns: Columns) -> String {
        self.cells(columns).join("\t")
    }

    /// Column name -> cell, as exported to JSON.
    pub fn to_map(&self, columns: Columns) -> BTreeMap<String, String> {
        columns
            .header()
            .into_iter()
            .map(str::to_string)
            .zip(self.cells(columns))
            .collect()
    }
}

/// Everything a row is composed from.
pub struct RowSources<'a> {
    pub version: &'a VersionRecord,
    pub author: &'a AuthorRecord,
    pub book: &'a BookRecord,
    pub header: &'a HeaderMeta,
    /// Source-library tags of the version ID
    pub source_tags: Option<&'a str>,
    pub url: String,
}

/// Merge sidecar, header and URI data into one row. Sidecar values win;
/// header values fill gaps; URI-derived values come last.
pub fn compose_row(sources: RowSources<'_>) -> MetadataRow {
    let RowSources {
        version,
        author,
        book,
        header,
        source_tags,
        url,
    } = sources;

    let mut author_ar = author.arabic_names();
    if author_ar.is_empty() {
        author_ar = dedup(header.get(HeaderCategory::AuthorName).iter().cloned());
    }

    let mut title_ar = book.title_ar.clone();
    if title_ar.is_empty() {
        title_ar = dedup(header.get(HeaderCategory::Title).iter().cloned());
    }
    let mut title_lat = book.title_lat.clone();
    if title_lat.is_empty() {
        let short_title = book.uri.split('.').nth(1).unwrap_or_default();
        title_lat.push(insert_spaces(short_title));
    }

    let mut ed_info: Vec<String> = [
        HeaderCategory::EditionEditor,
        HeaderCategory::EditionPlace,
        HeaderCategory::EditionDate,
        HeaderCategory::EditionPublisher,
    ]
    .iter()
    .flat_map(|c| header.get(*c).iter().cloned())
    .collect();
    ed_info.extend(version.based_on.iter().cloned());

    MetadataRow {
        version_uri: version.uri.clone(),
        date: version.date.clone(),
        author_ar,
        author_lat: author.latin_names(),
        book: version.book_uri.clone(),
        title_ar,
        title_lat,
        ed_info,
        id: version.id.clone(),
        status: version.status,
        tok_length: version.tok_length,
        char_length: version.char_length,
        url,
        tags: compose_tags(version, author, book, header, source_tags),
        author_from_uri: author.from_uri.clone(),
        author_shuhra: author.shuhra.clone(),
        author_full_name: author.full_name.clone(),
    }
}

fn compose_tags(
    version: &VersionRecord,
    author: &AuthorRecord,
    book: &BookRecord,
    header: &HeaderMeta,
    source_tags: Option<&str>,
) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    if !version.extension.is_none() {
        tags.push(version.extension.as_str().to_uppercase());
    }
    tags.extend(source_tags.map(str::to_string));
    tags.extend(book.genres.iter().cloned());
    tags.extend(version.issue_tags.iter().cloned());
    for genres in header.get(HeaderCategory::Genre) {
        for genre in genres.split(SEPARATOR) {
            let tag = format!("{}@{}", version.collection, genre.trim());
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }
    tags.extend(author.geo.iter().map(|g| g.to_string()));
    tags.retain(|t| !t.trim().is_empty());
    tags
}

/// Path or URL of a text file as shown in the `url` column.
pub fn text_url(text_path: &str, corpus_path: &str, output_files_path: Option<&str>) -> String {
    let text_path = text_path.replace('\\', "/");
    let Some(prefix) = output_files_path else {
        return text_path;
    };
    let corpus_path = corpus_path.replace('\\', "/");
    let url = match text_path.strip_prefix(corpus_path.trim_end_matches('/')) {
        Some(rest) => format!("{}{}", prefix.trim_end_matches('/'), rest),
        None => text_path,
    };
    if url.contains("githubusercontent") {
        url.replacen("data/", "master/data/", 1)
    } else {
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_author;
    use crate::geo::{GeoRef, GeoRole};
    use crate::record::Record;
    use crate::translit::SimpleArabic;
    use crate::uri::{Extension, Uri};

    fn sources_fixture() -> (VersionRecord, AuthorRecord, BookRecord, HeaderMeta) {
        let uri = Uri::parse("0255Jahiz.Hayawan.Shamela0001-ara1").unwrap();
        let mut author = extract_author(&uri, &Record::new(), &SimpleArabic);
        author.geo.push(GeoRef {
            role: GeoRole::Born,
            code: "BASRA_111E305N_S".to_string(),
        });
        let book = BookRecord {
            uri: "0255Jahiz.Hayawan".to_string(),
            genres: vec!["ADAB".to_string()],
            ..Default::default()
        };
        let version = VersionRecord {
            uri: "0255Jahiz.Hayawan.Shamela0001-ara1".to_string(),
            book_uri: "0255Jahiz.Hayawan".to_string(),
            author_uri: "0255Jahiz".to_string(),
            id: "Shamela0001".to_string(),
            date: "0255".to_string(),
            language: "ara".to_string(),
            collection: "Shamela".to_string(),
            extension: Extension::Completed,
            tok_length: 1200,
            issue_tags: vec!["UNCORRECTED_OCR".to_string()],
            based_on: Some("Cairo 1938".to_string()),
            ..Default::default()
        };
        let header = HeaderMeta::parse(
            "######OpenITI#\n#META# 010.AuthorNAME\t:: الجاحظ\n#META# 020.BookTITLE\t:: الحيوان\n#META# 021.BookSUBJ\t:: أدب\n#META# 040.EdEDITOR\t:: هارون\n#META#Header#End#\n",
        );
        (version, author, book, header)
    }

    #[test]
    fn test_header_falls_back_for_missing_sidecar_values() {
        let (version, author, book, header) = sources_fixture();
        let row = compose_row(RowSources {
            version: &version,
            author: &author,
            book: &book,
            header: &header,
            source_tags: Some("_SHAMELA :: HADITH"),
            url: "data/x".to_string(),
        });
        assert_eq!(row.author_ar, vec!["الجاحظ"]);
        assert_eq!(row.author_lat, vec!["Jahiz"]);
        assert_eq!(row.title_ar, vec!["الحيوان"]);
        assert_eq!(row.title_lat, vec!["Hayawan"]);
        assert_eq!(row.ed_info, vec!["هارون", "Cairo 1938"]);
        assert_eq!(
            row.tags,
            vec![
                "COMPLETED",
                "_SHAMELA :: HADITH",
                "ADAB",
                "UNCORRECTED_OCR",
                "Shamela@أدب",
                "born@BASRA_111E305N_S",
            ]
        );
    }

    #[test]
    fn test_cells_follow_header() {
        let (version, author, book, header) = sources_fixture();
        let row = compose_row(RowSources {
            version: &version,
            author: &author,
            book: &book,
            header: &header,
            source_tags: None,
            url: "data/x".to_string(),
        });
        for columns in [
            Columns::default(),
            Columns {
                split_ar_lat: true,
                incl_char_length: true,
            },
        ] {
            assert_eq!(row.cells(columns).len(), columns.header().len());
        }
        let map = row.to_map(Columns::default());
        assert_eq!(map["author"], "Jahiz :: الجاحظ");
        assert_eq!(map["title"], "Hayawan :: الحيوان");
        assert_eq!(map["status"], "sec");
        assert_eq!(map["tok_length"], "1200");
    }

    #[test]
    fn test_text_url() {
        assert_eq!(
            text_url("../corpus/0275AH/data/x.completed", "../corpus", None),
            "../corpus/0275AH/data/x.completed"
        );
        assert_eq!(
            text_url(
                "../corpus/0275AH/data/x.completed",
                "../corpus",
                Some("https://raw.githubusercontent.com/OpenITI")
            ),
            "https://raw.githubusercontent.com/OpenITI/0275AH/master/data/x.completed"
        );
    }
}
