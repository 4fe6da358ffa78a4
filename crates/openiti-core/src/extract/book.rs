use serde::Serialize;

use crate::placeholder::{self, FieldCategory};
use crate::record::Record;
use crate::relations::{parse_relations, RelationEdge};
use crate::translit::Transliterator;
use crate::uri::Uri;

const TITLE_KEYS: [&str; 2] = ["10#BOOK#TITLEA#AR:", "10#BOOK#TITLEB#AR:"];
const GENRES_KEY: &str = "10#BOOK#GENRES###:";
const RELATED_KEY: &str = "40#BOOK#RELATED##:";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookRecord {
    pub uri: String,
    pub title_lat: Vec<String>,
    pub title_ar: Vec<String>,
    pub genres: Vec<String>,
    pub relations: Vec<RelationEdge>,
}

pub fn extract_book(uri: &Uri, sidecar: &Record, translit: &dyn Transliterator) -> BookRecord {
    let book_uri = uri.book_uri().unwrap_or_default();

    let title_lat: Vec<String> = TITLE_KEYS
        .iter()
        .filter_map(|k| placeholder::real_value(FieldCategory::Title, sidecar.get(k)))
        .map(str::to_string)
        .collect();
    let title_ar = title_lat.iter().map(|t| translit.to_arabic(t)).collect();

    let genres = placeholder::real_value(FieldCategory::Genre, sidecar.get(GENRES_KEY))
        .map(|g| {
            g.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    BookRecord {
        relations: parse_relations(&book_uri, sidecar.get(RELATED_KEY)),
        uri: book_uri,
        title_lat,
        title_ar,
        genres,
    }
}
