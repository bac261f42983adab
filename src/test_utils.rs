use serde_json::json;
use tempfile::TempDir;

use crate::config::AppConfig;
use crate::graph::{build_graph, GraphKind, GraphStore};
use crate::service::GraphRagService;
use crate::types::{Edge, EntityRecord, GraphInput, Node, RelationRecord};

/// Undirected simple path A–B–C–D–E with unit weights.
pub fn path_graph() -> GraphStore {
    let mut graph = GraphStore::new(GraphKind::UNDIRECTED);
    for id in ["A", "B", "C", "D", "E"] {
        graph.add_node(Node::new(id, id));
    }
    for (a, b) in [("A", "B"), ("B", "C"), ("C", "D"), ("D", "E")] {
        graph
            .add_edge(Edge::new(a, b, "r"))
            .expect("path edge");
    }
    graph
}

fn entity(id: &str, name: &str, entity_type: &str) -> EntityRecord {
    EntityRecord {
        id: Some(id.to_string()),
        name: name.to_string(),
        entity_type: entity_type.to_string(),
        ..Default::default()
    }
}

fn relation(source: &str, target: &str, metaedge: &str, verb: &str) -> RelationRecord {
    RelationRecord {
        source: Some(source.to_string()),
        target: Some(target.to_string()),
        metaedge: Some(metaedge.to_string()),
        relation: Some(verb.to_string()),
        ..Default::default()
    }
}

/// Small gene/disease/compound graph with Hetionet-style metaedges.
pub fn biomedical_input() -> GraphInput {
    let mut tp53 = entity("Gene::TP53", "TP53", "Gene");
    tp53.attributes
        .insert("description".to_string(), json!("tumor protein p53"));

    GraphInput {
        entities: vec![
            tp53,
            entity("Gene::MDM2", "MDM2", "Gene"),
            entity("Gene::BRCA1", "BRCA1", "Gene"),
            entity("Gene::ATM", "ATM", "Gene"),
            entity("Gene::EGFR", "EGFR", "Gene"),
            entity("Disease::breast_cancer", "breast cancer", "Disease"),
            entity("Disease::lung_cancer", "lung cancer", "Disease"),
            entity("Disease::glioma", "glioma", "Disease"),
            entity("Compound::tamoxifen", "tamoxifen", "Compound"),
            entity("Compound::gefitinib", "gefitinib", "Compound"),
            entity("Pathway::apoptosis", "apoptosis", "Pathway"),
            entity("SideEffect::nausea", "nausea", "Side Effect"),
        ],
        relations: vec![
            relation("Gene::TP53", "Gene::MDM2", "GiG", "interacts"),
            relation("Gene::TP53", "Gene::BRCA1", "GcG", "covaries"),
            relation("Gene::TP53", "Gene::ATM", "GcG", "covaries"),
            relation("Disease::breast_cancer", "Gene::BRCA1", "DaG", "associates"),
            relation("Disease::breast_cancer", "Gene::TP53", "DaG", "associates"),
            relation("Disease::glioma", "Gene::TP53", "DaG", "associates"),
            relation("Disease::lung_cancer", "Gene::EGFR", "DaG", "associates"),
            relation("Compound::tamoxifen", "Disease::breast_cancer", "CtD", "treats"),
            relation("Compound::gefitinib", "Disease::lung_cancer", "CtD", "treats"),
            relation("Disease::breast_cancer", "Disease::lung_cancer", "DrD", "resembles"),
            relation("Gene::TP53", "Pathway::apoptosis", "GpPW", "participates"),
            relation("Compound::tamoxifen", "SideEffect::nausea", "CcSE", "causes"),
        ],
    }
}

pub fn biomedical_graph() -> GraphStore {
    build_graph(&biomedical_input(), GraphKind::UNDIRECTED).0
}

/// Service loaded with the biomedical graph through a JSON file on disk.
pub struct TestContext {
    pub service: GraphRagService,
    pub _temp_dir: TempDir, // Kept so the graph file outlives the context
}

impl TestContext {
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("graph.json");
        let text = serde_json::to_string(&biomedical_input()).expect("Failed to encode graph");
        std::fs::write(&path, text).expect("Failed to write graph file");

        let config = AppConfig {
            graph: Some(path.clone()),
            log_level: "debug".to_string(),
            ..Default::default()
        };
        let service = GraphRagService::new(&config);
        service
            .load_path(&path, config.graph_kind())
            .await
            .expect("Failed to load graph");

        Self {
            service,
            _temp_dir: temp_dir,
        }
    }
}
