//! Plain-text triple import: `source<TAB>relation<TAB>target` per line.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::builder::BuildReport;
use super::store::{EdgeInsert, GraphKind, GraphStore};
use crate::types::{AppError, Edge, Node, Result};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub build: BuildReport,
    pub malformed_lines: usize,
}

fn split_triple(line_no: usize, line: &str) -> Result<(&str, &str, &str)> {
    let parts: Vec<&str> = line.split('\t').map(str::trim).collect();
    match parts.as_slice() {
        [source, relation, target, ..] if !source.is_empty() && !target.is_empty() => {
            Ok((*source, *relation, *target))
        }
        _ => Err(AppError::Parse {
            line: line_no,
            reason: format!("expected source<TAB>relation<TAB>target, got {} field(s)", parts.len()),
        }),
    }
}

pub fn parse_triples(text: &str, kind: GraphKind) -> (GraphStore, ImportReport) {
    let mut store = GraphStore::new(kind);
    let mut report = ImportReport::default();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let (source, relation, target) = match split_triple(line_no + 1, line) {
            Ok(triple) => triple,
            Err(e) => {
                report.malformed_lines += 1;
                tracing::warn!(error = %e, "Skipping malformed triple");
                continue;
            }
        };

        for endpoint in [source, target] {
            if store.add_node(Node::untyped(endpoint)) {
                report.build.nodes_added += 1;
            }
        }

        match store.add_edge_auto_key(Edge::new(source, target, relation)) {
            Ok(EdgeInsert::Added) => report.build.edges_added += 1,
            Ok(EdgeInsert::Duplicate) => report.build.duplicate_edges += 1,
            Err(e) => {
                report.build.skipped_relations += 1;
                tracing::warn!(line = line_no + 1, error = %e, "Skipping triple");
            }
        }
    }

    tracing::info!(
        nodes = report.build.nodes_added,
        edges = report.build.edges_added,
        malformed = report.malformed_lines,
        "Triples imported"
    );
    (store, report)
}

pub fn load_triples(path: &Path, kind: GraphKind) -> Result<(GraphStore, ImportReport)> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_triples(&text, kind))
}
