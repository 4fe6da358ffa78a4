//! In-band text header (`#META# key :: value` lines before `#META#Header#End`).

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::placeholder::{self, FieldCategory};
use crate::vfs::FileSystem;

pub const HEADER_END: &str = "#META#Header#End";
const MAX_HEADER_LINES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum HeaderCategory {
    AuthorName,
    Title,
    Date,
    Genre,
    EditionEditor,
    EditionPublisher,
    EditionPlace,
    EditionDate,
}

/// Known header field names, as found in the different source libraries.
static HEADINGS: Lazy<HashMap<&'static str, HeaderCategory>> = Lazy::new(|| {
    use HeaderCategory::*;
    [
        ("Iso", Title),
        ("Lng", AuthorName),
        ("higrid", Date),
        ("HigriD", Date),
        ("auth", AuthorName),
        ("auth.x", AuthorName),
        ("bk", Title),
        ("cat", Genre),
        ("name", Genre),
        ("البلد", EditionPlace),
        ("الطبعة", EditionDate),
        ("الكتاب", Title),
        ("المؤلف", AuthorName),
        ("المحقق", EditionEditor),
        ("الناشر", EditionPublisher),
        ("تأليف", AuthorName),
        ("تحقيق", EditionEditor),
        ("تقديم وتعليق", EditionEditor),
        ("حققه", EditionEditor),
        ("خرج أحاديثه", EditionEditor),
        ("دار النشر", EditionPublisher),
        ("دراسة وتحقيق", EditionEditor),
        ("سنة الطبع", EditionDate),
        ("سنة النشر", EditionDate),
        ("شهرته", AuthorName),
        ("عام النشر", EditionDate),
        ("مكان النشر", EditionPlace),
        ("وضع حواشيه", EditionEditor),
        ("أشرف عليه وراجعه وقدم له", EditionEditor),
        ("أصدرها", EditionEditor),
        ("أعتنى به", EditionEditor),
        ("أعد أصله", EditionEditor),
        ("أعده", EditionEditor),
        ("أعده للنشر", EditionEditor),
        ("أعده ونشره", EditionEditor),
        ("ألحقها", EditionEditor),
        ("تقديم وإشراف ومراجعة", EditionEditor),
        ("010.AuthorAKA", AuthorName),
        ("010.AuthorNAME", AuthorName),
        ("001.AuthorNAME", AuthorName),
        ("011.AuthorDIED", Date),
        ("019.AuthorDIED", Date),
        ("006.AuthorDIED", Date),
        ("020.BookTITLE", Title),
        ("010.BookTITLE", Title),
        ("021.BookSUBJ", Genre),
        ("029.BookTITLEalt", Title),
        ("040.EdEDITOR", EditionEditor),
        ("043.EdPUBLISHER", EditionPublisher),
        ("013.EdPUBLISHER", EditionPublisher),
        ("044.EdPLACE", EditionPlace),
        ("045.EdYEAR", EditionDate),
        ("015.BookGENRE", Genre),
        ("title", Title),
        ("title_ar", Title),
        ("نام كتاب", Title),
        ("نويسنده", AuthorName),
        ("ناشر", EditionPublisher),
        ("تاريخ نشر", EditionDate),
        ("مكان چاپ", EditionPlace),
        ("محقق/ مصحح", EditionEditor),
        ("مصحح", EditionEditor),
        ("محقق", EditionEditor),
        ("تاريخ وفات مؤلف", Date),
        ("موضوع", Genre),
        ("Title", Title),
        ("Editor", EditionEditor),
        ("Publisher", EditionPublisher),
        ("Place of Publication", EditionPlace),
        ("Date of Publication", EditionDate),
        ("Author", AuthorName),
        ("author", AuthorName),
        ("source", EditionPlace),
        ("Date", Date),
    ]
    .into_iter()
    .collect()
});

static SPACES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("valid regex"));
static BREAKS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S ]+").expect("valid regex"));

#[derive(Debug, Clone, Default, Serialize)]
pub struct HeaderMeta {
    /// Values of known headings, grouped by category, first line only
    pub categories: BTreeMap<HeaderCategory, Vec<String>>,
    /// Every readable key/value of the header
    pub all: BTreeMap<String, String>,
    #[serde(skip)]
    pub unreadable: Vec<String>,
}

impl HeaderMeta {
    pub fn get(&self, category: HeaderCategory) -> &[String] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Parse the header lines at the top of a text.
    pub fn parse(text: &str) -> Self {
        let mut meta = HeaderMeta::default();
        for line in header_lines(text) {
            let body: String = line.chars().skip(7).collect();
            let (raw_key, raw_val) = match body.split_once("\t::") {
                Some(kv) => kv,
                None => match body.split_once(": ") {
                    Some(kv) => kv,
                    None => {
                        meta.unreadable.push(line.to_string());
                        continue;
                    }
                },
            };
            let val = normalize_value(raw_val);
            if val.is_empty() {
                continue;
            }
            let key = raw_key.replace("# ", "").trim().to_string();
            if let Some(category) = HEADINGS.get(key.as_str()) {
                let first_line = val.split('¶').next().unwrap_or_default().trim().to_string();
                meta.categories.entry(*category).or_default().push(first_line);
            }
            meta.all.insert(key, val);
        }
        if !meta.unreadable.is_empty() {
            log::debug!("{} header line(s) in unreadable format", meta.unreadable.len());
        }
        meta
    }
}

/// Metadata lines of the header, scanning at most the first 100 lines.
pub fn header_lines(text: &str) -> Vec<&str> {
    text.lines()
        .take(MAX_HEADER_LINES)
        .take_while(|line| !line.contains(HEADER_END))
        .filter(|line| line.contains("#META#") || line.contains("#NewRec#"))
        .collect()
}

fn normalize_value(raw: &str) -> String {
    let val = raw.trim();
    if placeholder::is_placeholder(FieldCategory::HeaderValue, val) {
        return String::new();
    }
    let val = BREAKS_RE.replace_all(val, "¶ ");
    let val = SPACES_RE.replace_all(&val, " ").trim().to_string();
    normalize_number(&val).unwrap_or(val)
}

/// `"007"` -> `"7"`; Arabic-Indic digits are accepted too.
fn normalize_number(val: &str) -> Option<String> {
    if val.is_empty() {
        return None;
    }
    let digits: String = val
        .chars()
        .map(|c| match c {
            '0'..='9' => Some(c),
            '\u{0660}'..='\u{0669}' => char::from_digit(c as u32 - 0x0660, 10),
            '\u{06F0}'..='\u{06F9}' => char::from_digit(c as u32 - 0x06F0, 10),
            _ => None,
        })
        .collect::<Option<String>>()?;
    let trimmed = digits.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() })
}

/// Read only the header of a text file.
pub fn read_header(fs: &dyn FileSystem, path: &Path) -> std::io::Result<HeaderMeta> {
    let text = fs.read_to_string(path)?;
    Ok(HeaderMeta::parse(&text))
}
