use serde::{Deserialize, Serialize};

use super::retrieval::QueryAnalysis;

/// Entity hit returned by the search backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityCandidate {
    pub name: String,
    #[serde(rename = "type", default)]
    pub entity_type: String,
    /// Lexical/semantic match score from the backend.
    pub similarity: f32,
    #[serde(default)]
    pub pagerank: f32,
    /// Cached neighbor names; its length is the hub-penalty proxy.
    #[serde(default)]
    pub neighbors: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// Set for candidates injected by the core-entity lock.
    #[serde(default)]
    pub synthetic: bool,
}

impl EntityCandidate {
    pub fn new(name: impl Into<String>, similarity: f32) -> Self {
        Self {
            name: name.into(),
            entity_type: String::new(),
            similarity,
            pagerank: 0.0,
            neighbors: Vec::new(),
            description: String::new(),
            synthetic: false,
        }
    }

    pub fn with_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = entity_type.into();
        self
    }

    pub fn with_pagerank(mut self, pagerank: f32) -> Self {
        self.pagerank = pagerank;
        self
    }

    pub fn with_neighbors<I, S>(mut self, neighbors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.neighbors = neighbors.into_iter().map(Into::into).collect();
        self
    }

    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }
}

/// Relation hit returned by the search backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelationCandidate {
    pub from: String,
    pub to: String,
    pub metaedge: String,
    pub score: f32,
    #[serde(default = "default_weight")]
    pub weight: f32,
    #[serde(default)]
    pub description: String,
}

fn default_weight() -> f32 {
    1.0
}

impl RelationCandidate {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        metaedge: impl Into<String>,
        score: f32,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            metaedge: metaedge.into(),
            score,
            weight: default_weight(),
            description: String::new(),
        }
    }
}

/// Hybrid keyword+vector search call against the document store.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HybridSearchRequest {
    pub text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub entity_types: Vec<String>,
    #[serde(default)]
    pub namespaces: Vec<String>,
    pub similarity_threshold: f32,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredEntity {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub score: f32,
    pub similarity: f32,
    pub pagerank: f32,
    pub schema_boost: f32,
    pub hub_penalty: f32,
    pub locked: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    pub entities: Vec<ScoredEntity>,
    pub relations: Vec<RelationCandidate>,
    pub query_analysis: QueryAnalysis,
}
