//! Book relations declared in book sidecars (`40#BOOK#RELATED##:`).
//!
//! Each relation is `TYPES@DEST` or `DEST (TYPES)`, relations separated by
//! `;`, TYPES a comma list of `MAIN.SUB` or `MAIN`.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::placeholder::{self, FieldCategory};

static PILCROW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" *¶ *").expect("valid regex"));
static SEMICOLON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" ?; ?").expect("valid regex"));
static BLANKS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \r\n¶]+").expect("valid regex"));
static PAREN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]+)").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RelationEdge {
    pub source: String,
    pub main_rel_type: String,
    pub sec_rel_type: String,
    pub dest: String,
}

/// Parse the raw field of the book `source`. Relations without a type are
/// logged and skipped.
pub fn parse_relations(source: &str, raw: &str) -> Vec<RelationEdge> {
    let Some(raw) = placeholder::real_value(FieldCategory::Relation, raw) else {
        return Vec::new();
    };
    let raw = PILCROW_RE.replace_all(raw, "");
    let mut edges = Vec::new();

    for rel in SEMICOLON_RE.split(&raw) {
        let rel = BLANKS_RE.replace_all(rel, " ");
        let rel = rel.trim();
        if rel.is_empty() {
            continue;
        }
        let (types, dest) = match rel.split_once('@') {
            Some((types, dest)) => (types.to_string(), dest.trim().to_string()),
            None => {
                let Some(caps) = PAREN_RE.captures(rel) else {
                    log::warn!("{}: no relationship type found in {:?}", source, rel);
                    continue;
                };
                let dest = rel.split('(').next().unwrap_or_default().trim();
                (caps[1].to_string(), dest.to_string())
            }
        };
        for rel_type in types.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (main, sub) = match rel_type.split_once('.') {
                Some((main, sub)) => (main.trim(), sub.trim()),
                None => (rel_type, ""),
            };
            edges.push(RelationEdge {
                source: source.to_string(),
                main_rel_type: main.to_string(),
                sec_rel_type: sub.to_string(),
                dest: dest.clone(),
            });
        }
    }
    edges
}

/// Explicit edge list; adjacency is derived, never stored twice.
#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    edges: Vec<RelationEdge>,
}

impl RelationGraph {
    /// Adds an edge unless an identical one is already present.
    pub fn add(&mut self, edge: RelationEdge) {
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    pub fn extend(&mut self, edges: impl IntoIterator<Item = RelationEdge>) {
        for edge in edges {
            self.add(edge);
        }
    }

    pub fn edges(&self) -> &[RelationEdge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Every edge indexed under both of its endpoints.
    pub fn adjacency(&self) -> BTreeMap<&str, Vec<&RelationEdge>> {
        let mut adjacency: BTreeMap<&str, Vec<&RelationEdge>> = BTreeMap::new();
        for edge in &self.edges {
            adjacency.entry(edge.source.as_str()).or_default().push(edge);
            if edge.dest != edge.source {
                adjacency.entry(edge.dest.as_str()).or_default().push(edge);
            }
        }
        adjacency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_both_notations() {
        let edges = parse_relations(
            "0255Jahiz.Hayawan",
            "COMM.SHARH@0505Ghazali.Sharh ; 0310Tabari.Tarikh (ABR, TRANS.PER)",
        );
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[0].main_rel_type, "COMM");
        assert_eq!(edges[0].sec_rel_type, "SHARH");
        assert_eq!(edges[0].dest, "0505Ghazali.Sharh");
        assert_eq!(edges[1].main_rel_type, "ABR");
        assert_eq!(edges[1].sec_rel_type, "");
        assert_eq!(edges[1].dest, "0310Tabari.Tarikh");
        assert_eq!(edges[2].main_rel_type, "TRANS");
        assert_eq!(edges[2].sec_rel_type, "PER");
    }

    #[test]
    fn test_template_and_untyped_relations_are_skipped() {
        assert!(parse_relations("a.B", "URI of the related book (type)").is_empty());
        assert!(parse_relations("a.B", "0310Tabari.Tarikh").is_empty());
    }

    #[test]
    fn test_adjacency_is_symmetric_and_dedup_is_exact() {
        let mut graph = RelationGraph::default();
        graph.extend(parse_relations("0255Jahiz.Hayawan", "COMM@0505Ghazali.Sharh"));
        graph.extend(parse_relations("0255Jahiz.Hayawan", "COMM@0505Ghazali.Sharh"));
        graph.extend(parse_relations("0255Jahiz.Hayawan", "comm@0505Ghazali.Sharh"));
        assert_eq!(graph.edges().len(), 2);

        let adjacency = graph.adjacency();
        assert_eq!(adjacency["0255Jahiz.Hayawan"].len(), 2);
        assert_eq!(adjacency["0505Ghazali.Sharh"].len(), 2);
        assert_eq!(adjacency["0255Jahiz.Hayawan"][0], adjacency["0505Ghazali.Sharh"][0]);
    }

    #[test]
    fn test_self_loop_is_kept_once() {
        let mut graph = RelationGraph::default();
        graph.extend(parse_relations("a.B", "X@a.B"));
        assert_eq!(graph.adjacency()["a.B"].len(), 1);
    }
}
