//! Builds a [`GraphStore`] from extraction output.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::store::{EdgeInsert, GraphKind, GraphStore};
use crate::types::{Edge, EntityRecord, GraphInput, Node, RelationRecord};

/// Statistics from graph construction.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildReport {
    pub nodes_added: usize,
    pub duplicate_nodes: usize,
    pub edges_added: usize,
    pub duplicate_edges: usize,
    pub skipped_relations: usize,
}

pub struct GraphBuilder {
    store: GraphStore,
    by_name: HashMap<String, String>,
    report: BuildReport,
}

impl GraphBuilder {
    pub fn new(kind: GraphKind) -> Self {
        Self {
            store: GraphStore::new(kind),
            by_name: HashMap::new(),
            report: BuildReport::default(),
        }
    }

    pub fn add_entity(&mut self, record: &EntityRecord) {
        let name = record.name.trim();
        let id = match record.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ if !name.is_empty() => name.to_string(),
            _ => {
                tracing::warn!("Skipping entity without id or name");
                return;
            }
        };

        let mut node = Node::new(id.clone(), name);
        if !record.entity_type.trim().is_empty() {
            node.node_type = record.entity_type.trim().to_string();
        }
        node.namespace = record.namespace.clone();
        node.attributes = record.attributes.clone();

        if self.store.add_node(node) {
            self.report.nodes_added += 1;
            if !name.is_empty() {
                self.by_name.entry(name.to_lowercase()).or_insert_with(|| id.clone());
            }
        } else {
            self.report.duplicate_nodes += 1;
            tracing::debug!(id = %id, "Duplicate entity id, keeping first");
        }
    }

    fn resolve_endpoint(&self, raw: Option<&str>) -> Option<String> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
        if self.store.contains_node(raw) {
            return Some(raw.to_string());
        }
        self.by_name.get(&raw.to_lowercase()).cloned()
    }

    pub fn add_relation(&mut self, record: &RelationRecord) {
        let source = self.resolve_endpoint(record.source.as_deref());
        let target = self.resolve_endpoint(record.target.as_deref());
        let (Some(source), Some(target)) = (source, target) else {
            self.report.skipped_relations += 1;
            tracing::warn!(
                source = ?record.source,
                target = ?record.target,
                "Skipping relation with missing or unresolvable endpoint"
            );
            return;
        };

        let relation = record.relation.clone().unwrap_or_default();
        let metaedge = record
            .metaedge
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| relation.clone());
        let mut edge = Edge::new(source, target, metaedge)
            .with_weight(record.weight.unwrap_or(1.0));
        if !relation.is_empty() {
            edge.relation = relation;
        }
        edge.attributes = record.attributes.clone();

        let inserted = match record.key {
            Some(key) => self.store.add_edge(edge.with_key(key)),
            None => self.store.add_edge_auto_key(edge),
        };
        match inserted {
            Ok(EdgeInsert::Added) => self.report.edges_added += 1,
            Ok(EdgeInsert::Duplicate) => self.report.duplicate_edges += 1,
            Err(e) => {
                self.report.skipped_relations += 1;
                tracing::warn!(error = %e, "Skipping relation");
            }
        }
    }

    pub fn add_input(&mut self, input: &GraphInput) {
        for entity in &input.entities {
            self.add_entity(entity);
        }
        for relation in &input.relations {
            self.add_relation(relation);
        }
    }

    pub fn build(self) -> (GraphStore, BuildReport) {
        tracing::info!(
            nodes = self.report.nodes_added,
            edges = self.report.edges_added,
            skipped = self.report.skipped_relations,
            "Graph built"
        );
        (self.store, self.report)
    }
}

/// One-shot build from a JSON-shaped input.
pub fn build_graph(input: &GraphInput, kind: GraphKind) -> (GraphStore, BuildReport) {
    let mut builder = GraphBuilder::new(kind);
    builder.add_input(input);
    builder.build()
}
