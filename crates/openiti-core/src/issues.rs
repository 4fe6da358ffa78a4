//! Annotation issues and the URIs they concern.

use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::uri::{Uri, UriKind};

const URI_PATTERN: &str = r"\d{4}[A-Z][a-zA-Z]+(?:\.[A-Z][a-zA-Z]+)?(?:\.\w+-[a-z]{3}\d+)?";

static URI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(URI_PATTERN).expect("valid regex"));
static OLD_URI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"OLD URI.+?({})", URI_PATTERN)).expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(default)]
    pub state: String,
}

impl Issue {
    /// The URI an issue is about: first one in the title, else one following
    /// "OLD URI" in the body, else the first in the body, else in a comment.
    pub fn uri(&self) -> Option<String> {
        if let Some(m) = URI_RE.find(&self.title) {
            return Some(m.as_str().to_string());
        }
        if let Some(caps) = OLD_URI_RE.captures(&self.body) {
            return Some(caps[1].to_string());
        }
        if let Some(m) = URI_RE.find(&self.body) {
            return Some(m.as_str().to_string());
        }
        self.comments
            .iter()
            .find_map(|c| URI_RE.find(c).map(|m| m.as_str().to_string()))
    }

    pub fn first_label(&self) -> &str {
        self.labels.first().map(String::as_str).unwrap_or("")
    }
}

pub trait IssueTracker {
    /// Issues of `repo`; with `labels`, only issues carrying one of them.
    fn fetch_issues(&self, repo: &str, labels: Option<&[String]>) -> Result<Vec<Issue>>;
}

/// Serves issues fetched beforehand (e.g. a JSON export of the tracker).
#[derive(Debug, Clone, Default)]
pub struct StaticIssues {
    issues: Vec<Issue>,
}

impl StaticIssues {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(content)?))
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

impl IssueTracker for StaticIssues {
    fn fetch_issues(&self, _repo: &str, labels: Option<&[String]>) -> Result<Vec<Issue>> {
        Ok(self
            .issues
            .iter()
            .filter(|issue| match labels {
                Some(wanted) => issue.labels.iter().any(|l| wanted.contains(l)),
                None => true,
            })
            .cloned()
            .collect())
    }
}

/// `[number, first_label]` as exported with each metadata row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRef(pub u64, pub String);

#[derive(Debug, Clone, Default)]
pub struct IssueIndex {
    by_uri: BTreeMap<String, Vec<IssueRef>>,
}

impl IssueIndex {
    pub fn build(issues: &[Issue]) -> Self {
        let mut by_uri: BTreeMap<String, Vec<IssueRef>> = BTreeMap::new();
        for issue in issues {
            match issue.uri() {
                Some(uri) => by_uri
                    .entry(uri)
                    .or_default()
                    .push(IssueRef(issue.number, issue.first_label().to_string())),
                None => log::debug!("issue #{}: no URI found", issue.number),
            }
        }
        Self { by_uri }
    }

    pub fn get(&self, uri: &str) -> &[IssueRef] {
        self.by_uri.get(uri).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_uri.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_uri.is_empty()
    }

    /// Author, book and version issues of a version URI.
    pub fn for_version(&self, version_uri: &str) -> [&[IssueRef]; 3] {
        let Ok(uri) = Uri::parse(version_uri) else {
            return [&[], &[], &[]];
        };
        let lookup = |kind| uri.build(kind).map(|u| self.get(&u)).unwrap_or(&[]);
        [
            lookup(UriKind::Author),
            lookup(UriKind::Book),
            lookup(UriKind::Version),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(number: u64, title: &str, body: &str, comments: &[&str]) -> Issue {
        Issue {
            number,
            labels: vec!["CORRECTION".to_string(), "URGENT".to_string()],
            title: title.to_string(),
            body: body.to_string(),
            comments: comments.iter().map(|c| c.to_string()).collect(),
            state: "open".to_string(),
        }
    }

    #[test]
    fn test_uri_discovery_order() {
        let i = issue(1, "Typos in 0255Jahiz.Hayawan", "see 0310Tabari.Tarikh", &[]);
        assert_eq!(i.uri().as_deref(), Some("0255Jahiz.Hayawan"));

        let i = issue(2, "Rename", "NEW URI 0310Tabari.Tarikh, OLD URI: 0310Tabari.TarikhRusul", &[]);
        assert_eq!(i.uri().as_deref(), Some("0310Tabari.TarikhRusul"));

        let i = issue(3, "Broken", "in 0255Jahiz.Hayawan.Sham19Y0023775-ara1 page 3", &[]);
        assert_eq!(i.uri().as_deref(), Some("0255Jahiz.Hayawan.Sham19Y0023775-ara1"));

        let i = issue(4, "Broken", "no uri", &["nothing", "it is 0255Jahiz"]);
        assert_eq!(i.uri().as_deref(), Some("0255Jahiz"));

        assert_eq!(issue(5, "x", "y", &["z"]).uri(), None);
    }

    #[test]
    fn test_index_for_version() {
        let issues = vec![
            issue(1, "0255Jahiz", "", &[]),
            issue(2, "0255Jahiz.Hayawan", "", &[]),
            issue(3, "0255Jahiz.Hayawan.Sham19Y0023775-ara1", "", &[]),
        ];
        let index = IssueIndex::build(&issues);
        let [author, book, version] = index.for_version("0255Jahiz.Hayawan.Sham19Y0023775-ara1");
        assert_eq!(author, [IssueRef(1, "CORRECTION".to_string())]);
        assert_eq!(book.len(), 1);
        assert_eq!(version[0].0, 3);
        assert_eq!(
            serde_json::to_string(&version[0]).unwrap(),
            r#"[3,"CORRECTION"]"#
        );
    }

    #[test]
    fn test_static_issues_label_filter() {
        let tracker = StaticIssues::from_json(
            r#"[{"number": 1, "labels": ["CORRECTION"]}, {"number": 2, "labels": ["OTHER"]}]"#,
        )
        .unwrap();
        let all = tracker.fetch_issues("OpenITI/Annotation", None).unwrap();
        assert_eq!(all.len(), 2);
        let wanted = vec!["CORRECTION".to_string()];
        let some = tracker
            .fetch_issues("OpenITI/Annotation", Some(&wanted))
            .unwrap();
        assert_eq!(some.len(), 1);
        assert_eq!(some[0].number, 1);
    }
}
