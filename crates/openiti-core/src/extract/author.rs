use std::collections::BTreeMap;

use serde::Serialize;

use super::{collapse_breaks, insert_spaces};
use crate::geo::{extract_geo, GeoRef};
use crate::placeholder::{self, FieldCategory};
use crate::record::Record;
use crate::translit::Transliterator;
use crate::uri::Uri;

/// Name components in the order they make up a full name.
const NAME_COMPONENTS: [&str; 5] = ["LAQAB", "KUNYA", "ISM", "NASAB", "NISBA"];
const SCRIPTS: [&str; 3] = ["AR", "EN", "FA"];

/// `("SHUHRA", "AR")` -> `10#AUTH#SHUHRA#AR:`; keys are padded to a fixed width.
fn name_key(component: &str, script: &str) -> String {
    format!("10#AUTH#{:#<7}{}:", format!("{}#", component), script)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthorRecord {
    pub uri: String,
    /// Camel-case split author component of the URI
    pub from_uri: String,
    pub shuhra: String,
    pub full_name: String,
    pub english_name: String,
    pub shuhra_ar: String,
    pub full_name_ar: String,
    /// script code -> name component -> value
    pub name_elements: BTreeMap<String, BTreeMap<String, String>>,
    pub geo: Vec<GeoRef>,
    /// File name of the author sidecar, as cited in authority-code reports
    pub yml_name: String,
}

impl AuthorRecord {
    /// Transliterated name variants, URI-derived first.
    pub fn latin_names(&self) -> Vec<String> {
        super::dedup(
            [&self.from_uri, &self.english_name, &self.shuhra, &self.full_name]
                .into_iter()
                .cloned(),
        )
    }

    pub fn arabic_names(&self) -> Vec<String> {
        super::dedup([self.shuhra_ar.clone(), self.full_name_ar.clone()])
    }
}

fn name_value(sidecar: &Record, key: &str) -> String {
    placeholder::real_value(FieldCategory::Name, sidecar.get(key))
        .map(collapse_breaks)
        .unwrap_or_default()
}

fn full_name(sidecar: &Record, script: &str) -> String {
    NAME_COMPONENTS
        .iter()
        .map(|c| name_value(sidecar, &name_key(c, script)))
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the author record of `uri` from its (possibly empty) sidecar.
pub fn extract_author(uri: &Uri, sidecar: &Record, translit: &dyn Transliterator) -> AuthorRecord {
    let author_uri = uri.author_uri().unwrap_or_default();
    let shuhra = name_value(sidecar, &name_key("SHUHRA", "AR"));
    let full = full_name(sidecar, "AR");

    let mut name_elements = BTreeMap::new();
    for script in SCRIPTS {
        let elements: BTreeMap<String, String> = std::iter::once("SHUHRA")
            .chain(NAME_COMPONENTS)
            .map(|c| (c.to_lowercase(), name_value(sidecar, &name_key(c, script))))
            .collect();
        if elements.values().all(String::is_empty) {
            continue;
        }
        if script == "EN" {
            name_elements.insert(script.to_string(), elements);
        } else {
            let converted = elements
                .iter()
                .map(|(k, v)| (k.clone(), translit.to_arabic(v)))
                .collect();
            name_elements.insert("LA".to_string(), elements);
            name_elements.insert(script.to_string(), converted);
        }
    }

    AuthorRecord {
        from_uri: insert_spaces(&uri.author),
        shuhra_ar: translit.to_arabic(&shuhra),
        full_name_ar: translit.to_arabic(&full),
        english_name: full_name(sidecar, "EN"),
        shuhra,
        full_name: full,
        name_elements,
        geo: extract_geo(sidecar),
        yml_name: format!("{}.yml", author_uri),
        uri: author_uri,
    }
}
