//! In-memory search backend over a Graph Store snapshot.
//!
//! Scores are token containment: the share of a record's tokens present in
//! the query text. PageRank and neighbor lists are computed once at build time.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};

use super::traits::SearchBackend;
use crate::graph::GraphStore;
use crate::retrieval::semantic::tokens;
use crate::retrieval::{page_rank, Deadline};
use crate::types::{EntityCandidate, HybridSearchRequest, RelationCandidate};
use crate::Result;

const SAMPLES_PER_TYPE: usize = 3;
const SNAPSHOT_DAMPING: f32 = 0.85;

#[derive(Debug, Clone)]
struct EntityDoc {
    name: String,
    entity_type: String,
    namespace: String,
    description: String,
    pagerank: f32,
    neighbors: Vec<String>,
    tokens: HashSet<String>,
}

#[derive(Debug, Clone)]
struct RelationDoc {
    from: String,
    to: String,
    metaedge: String,
    weight: f32,
    description: String,
    tokens: HashSet<String>,
}

pub struct MemoryBackend {
    entities: Vec<EntityDoc>,
    relations: Vec<RelationDoc>,
}

/// |record ∩ query| / |record|, 0 for an empty record.
fn containment(record: &HashSet<String>, query: &HashSet<String>) -> f32 {
    if record.is_empty() {
        return 0.0;
    }
    record.intersection(query).count() as f32 / record.len() as f32
}

fn matches_filter(value: &str, filter: &[String]) -> bool {
    filter.is_empty() || filter.iter().any(|f| f.eq_ignore_ascii_case(value))
}

fn description_of(attributes: &crate::types::Attributes) -> String {
    attributes
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

impl MemoryBackend {
    /// Snapshot of `graph`. Invalid edge weights only zero out PageRank.
    pub fn from_graph(graph: &GraphStore) -> Self {
        let projection = graph.projection();
        let ranks = match page_rank(&projection, &[], SNAPSHOT_DAMPING, &Deadline::none()) {
            Ok((ranks, _)) => ranks,
            Err(e) => {
                tracing::warn!(error = %e, "PageRank unavailable for search snapshot, using zero importance");
                vec![0.0; projection.len()]
            }
        };

        let entities = graph
            .nodes()
            .map(|node| {
                let pagerank = projection
                    .index
                    .get(&node.id)
                    .and_then(|&i| ranks.get(i).copied())
                    .unwrap_or(0.0);
                let neighbors = graph
                    .neighbor_ids(&node.id)
                    .into_iter()
                    .map(|id| graph.node(&id).map(|n| n.label().to_string()).unwrap_or(id))
                    .collect();
                EntityDoc {
                    name: node.label().to_string(),
                    entity_type: node.kind(),
                    namespace: node.namespace_key(),
                    description: description_of(&node.attributes),
                    pagerank,
                    neighbors,
                    tokens: tokens(node.label()),
                }
            })
            .collect();

        let label = |id: &str| graph.node(id).map(|n| n.label().to_string()).unwrap_or_else(|| id.to_string());
        let relations = graph
            .edges()
            .map(|edge| {
                let from = label(&edge.source);
                let to = label(&edge.target);
                let text = format!("{} {} {}", from, edge.relation, to);
                RelationDoc {
                    tokens: tokens(&text),
                    from,
                    to,
                    metaedge: edge.metaedge.clone(),
                    weight: edge.weight,
                    description: description_of(&edge.attributes),
                }
            })
            .collect();

        let backend = Self { entities, relations };
        tracing::debug!(
            entities = backend.entities.len(),
            relations = backend.relations.len(),
            "Memory backend built"
        );
        backend
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn candidate(doc: &EntityDoc, similarity: f32) -> EntityCandidate {
        let mut candidate = EntityCandidate::new(doc.name.clone(), similarity)
            .with_type(doc.entity_type.clone())
            .with_pagerank(doc.pagerank)
            .with_neighbors(doc.neighbors.iter().cloned());
        candidate.description = doc.description.clone();
        candidate
    }

    fn in_scope(doc: &EntityDoc, request: &HybridSearchRequest) -> bool {
        matches_filter(&doc.entity_type, &request.entity_types)
            && matches_filter(&doc.namespace, &request.namespaces)
    }
}

fn by_score_desc(a: f32, b: f32) -> std::cmp::Ordering {
    b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
}

#[async_trait]
impl SearchBackend for MemoryBackend {
    async fn search_entities(&self, request: &HybridSearchRequest) -> Result<Vec<EntityCandidate>> {
        let queries: Vec<HashSet<String>> = std::iter::once(request.text.as_str())
            .chain(request.keywords.iter().map(String::as_str))
            .map(tokens)
            .filter(|q| !q.is_empty())
            .collect();
        if queries.is_empty() || request.limit == 0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<EntityCandidate> = self
            .entities
            .iter()
            .filter(|doc| Self::in_scope(doc, request))
            .filter_map(|doc| {
                let score = queries
                    .iter()
                    .map(|q| containment(&doc.tokens, q))
                    .fold(0.0_f32, f32::max);
                (score > 0.0 && score >= request.similarity_threshold).then(|| Self::candidate(doc, score))
            })
            .collect();
        hits.sort_by(|a, b| by_score_desc(a.similarity, b.similarity).then_with(|| a.name.cmp(&b.name)));
        hits.truncate(request.limit);
        Ok(hits)
    }

    async fn entities_by_type(&self, request: &HybridSearchRequest) -> Result<Vec<EntityCandidate>> {
        if request.entity_types.is_empty() || request.limit == 0 {
            return Ok(Vec::new());
        }
        let mut hits: Vec<EntityCandidate> = self
            .entities
            .iter()
            .filter(|doc| Self::in_scope(doc, request))
            .map(|doc| Self::candidate(doc, 0.0))
            .collect();
        hits.sort_by(|a, b| by_score_desc(a.pagerank, b.pagerank).then_with(|| a.name.cmp(&b.name)));
        hits.truncate(request.limit);
        Ok(hits)
    }

    async fn search_relations(&self, request: &HybridSearchRequest) -> Result<Vec<RelationCandidate>> {
        let query = tokens(&request.text);
        if query.is_empty() || request.limit == 0 {
            return Ok(Vec::new());
        }
        let mut hits: Vec<RelationCandidate> = self
            .relations
            .iter()
            .filter_map(|doc| {
                let score = containment(&query, &doc.tokens);
                (score > 0.0 && score >= request.similarity_threshold).then(|| {
                    let mut candidate =
                        RelationCandidate::new(doc.from.clone(), doc.to.clone(), doc.metaedge.clone(), score);
                    candidate.weight = doc.weight;
                    candidate.description = doc.description.clone();
                    candidate
                })
            })
            .collect();
        hits.sort_by(|a, b| by_score_desc(a.score, b.score));
        hits.truncate(request.limit);
        Ok(hits)
    }

    async fn entity_type_samples(&self, namespaces: &[String]) -> Result<BTreeMap<String, Vec<String>>> {
        let mut samples: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for doc in self.entities.iter().filter(|d| matches_filter(&d.namespace, namespaces)) {
            let names = samples.entry(doc.entity_type.clone()).or_default();
            if names.len() < SAMPLES_PER_TYPE {
                names.push(doc.name.clone());
            }
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphKind;
    use crate::test_utils::biomedical_graph;
    use crate::types::{Edge, Node};

    fn request(text: &str) -> HybridSearchRequest {
        HybridSearchRequest {
            text: text.to_string(),
            similarity_threshold: 0.3,
            limit: 6,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_search_entities_by_text() {
        let backend = MemoryBackend::from_graph(&biomedical_graph());
        let hits = backend.search_entities(&request("breast cancer risk")).await.unwrap();
        assert_eq!(hits[0].name, "breast cancer");
        assert_eq!(hits[0].similarity, 1.0);
        assert_eq!(hits[0].entity_type, "Disease");
        assert!(!hits[0].neighbors.is_empty());
        assert!(hits.iter().all(|h| h.similarity >= 0.3));
    }

    #[tokio::test]
    async fn test_keywords_and_type_filter() {
        let backend = MemoryBackend::from_graph(&biomedical_graph());
        let mut req = request("unrelated words");
        req.keywords = vec!["TP53".to_string()];
        req.entity_types = vec!["gene".to_string()];
        let hits = backend.search_entities(&req).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "TP53");

        req.entity_types = vec!["Disease".to_string()];
        assert!(backend.search_entities(&req).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_entities_by_type_ranked_by_pagerank() {
        let backend = MemoryBackend::from_graph(&biomedical_graph());
        let mut req = request("");
        req.entity_types = vec!["Gene".to_string()];
        let hits = backend.entities_by_type(&req).await.unwrap();
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|h| h.entity_type == "Gene" && h.similarity == 0.0));
        assert!(hits.windows(2).all(|w| w[0].pagerank >= w[1].pagerank));
    }

    #[tokio::test]
    async fn test_search_relations() {
        let backend = MemoryBackend::from_graph(&biomedical_graph());
        let hits = backend.search_relations(&request("TP53 MDM2")).await.unwrap();
        assert!(!hits.is_empty());
        assert!(hits.iter().any(|r| r.metaedge == "GiG"));
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_type_samples_capped() {
        let backend = MemoryBackend::from_graph(&biomedical_graph());
        let samples = backend.entity_type_samples(&[]).await.unwrap();
        assert!(samples.contains_key("Gene"));
        assert!(samples.contains_key("Disease"));
        assert!(samples.values().all(|names| names.len() <= SAMPLES_PER_TYPE));

        let none = backend.entity_type_samples(&["nowhere".to_string()]).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_negative_weight_falls_back_to_zero_pagerank() {
        let mut graph = GraphStore::new(GraphKind::UNDIRECTED);
        for id in ["A", "B", "C"] {
            graph.add_node(Node::new(id, id));
        }
        graph.add_edge(Edge::new("A", "B", "r")).unwrap();
        graph.add_edge(Edge::new("B", "C", "r").with_weight(-0.5)).unwrap();

        let backend = MemoryBackend::from_graph(&graph);
        assert_eq!(backend.entity_count(), 3);
        let hits = backend.search_entities(&request("B")).await.unwrap();
        assert_eq!(hits[0].name, "B");
        assert_eq!(hits[0].pagerank, 0.0);
        assert_eq!(hits[0].neighbor_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_graph() {
        let backend = MemoryBackend::from_graph(&GraphStore::new(Default::default()));
        assert_eq!(backend.entity_count(), 0);
        assert!(backend.search_entities(&request("anything")).await.unwrap().is_empty());
    }
}
