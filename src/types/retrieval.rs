use serde::{Deserialize, Serialize};

use super::node::{Attributes, Edge, Node};
use crate::ranking::{FusionWeights, IntentKind};
use crate::retrieval::RetrievalAlgorithm;

/// Which strategy contributed a node to a Hybrid result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeSource {
    Bfs,
    Pagerank,
    Semantic,
    Hybrid,
}

impl NodeSource {
    /// Tier component of the Hybrid base score.
    pub fn tier_score(&self) -> f32 {
        match self {
            NodeSource::Hybrid => 2.0,
            NodeSource::Pagerank => 1.5,
            NodeSource::Semantic => 1.0,
            NodeSource::Bfs => 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub depth: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pagerank: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub similarity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub community: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<NodeSource>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub score: Option<f32>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl RetrievedNode {
    pub fn from_node(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            name: node.label().to_string(),
            node_type: node.kind(),
            depth: None,
            pagerank: None,
            similarity: None,
            community: None,
            source: None,
            score: None,
            attributes: node.attributes.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedEdge {
    pub source: String,
    pub target: String,
    pub metaedge: String,
    pub relation: String,
    pub weight: f32,
    #[serde(default)]
    pub key: u32,
}

impl From<&Edge> for RetrievedEdge {
    fn from(edge: &Edge) -> Self {
        Self {
            source: edge.source.clone(),
            target: edge.target.clone(),
            metaedge: edge.metaedge.clone(),
            relation: edge.relation.clone(),
            weight: edge.weight,
            key: edge.key,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommunityInfo {
    pub id: usize,
    pub nodes: Vec<String>,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityScore {
    pub node: String,
    pub score: f32,
}

/// Output of one retrieval strategy.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RetrievalOutput {
    pub nodes: Vec<RetrievedNode>,
    pub edges: Vec<RetrievedEdge>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub communities: Option<Vec<CommunityInfo>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub similarities: Option<Vec<SimilarityScore>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub paths: Option<Vec<Vec<String>>>,
    /// Set when a node/edge cap or the deadline cut the run short.
    #[serde(default)]
    pub truncated: bool,
}

impl RetrievalOutput {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub start_nodes: Option<Vec<String>>,
}

impl RetrievalRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            start_nodes: None,
        }
    }

    pub fn with_start_nodes<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.start_nodes = Some(nodes.into_iter().map(Into::into).collect());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryAnalysis {
    pub intent: IntentKind,
    pub matched_intents: Vec<IntentKind>,
    pub allow_list: Vec<String>,
    pub deny_list: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expected_type: Option<String>,
    pub hop_limit: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub core_entity: Option<String>,
    pub weights_used: FusionWeights,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub algorithm: Option<RetrievalAlgorithm>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub start_nodes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResponse {
    #[serde(flatten)]
    pub output: RetrievalOutput,
    pub query_analysis: QueryAnalysis,
}
