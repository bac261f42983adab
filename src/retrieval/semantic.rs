use std::collections::HashSet;

use super::{edges_among, StrategyInput};
use crate::types::{Node, Result, RetrievalOutput, RetrievedNode, SimilarityScore};

/// Scores a node against query text in [0, 1]. Swap in an embedding-backed
/// implementation to get true semantic retrieval.
pub trait TextSimilarity: Send + Sync {
    fn score(&self, query: &str, node: &Node) -> f32;
}

/// Lower-cased alphanumeric tokens.
pub fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Token-set Jaccard between the query and the node's display label.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenJaccard;

impl TextSimilarity for TokenJaccard {
    fn score(&self, query: &str, node: &Node) -> f32 {
        let query_tokens = tokens(query);
        let node_tokens = tokens(node.label());
        if query_tokens.is_empty() || node_tokens.is_empty() {
            return 0.0;
        }
        let intersection = query_tokens.intersection(&node_tokens).count();
        let union = query_tokens.union(&node_tokens).count();
        intersection as f32 / union as f32
    }
}

/// Nodes scoring strictly above `similarity_threshold`, best first, capped at `max_nodes`.
pub fn semantic(input: &StrategyInput<'_>, similarity: &dyn TextSimilarity) -> Result<RetrievalOutput> {
    let mut truncated = false;
    let mut scored: Vec<(&Node, f32)> = Vec::new();
    for node in input.graph.nodes() {
        if input.deadline.expired() {
            tracing::warn!(scored = scored.len(), "Semantic scoring deadline reached, returning partial result");
            truncated = true;
            break;
        }
        let score = similarity.score(input.query, node);
        if score.is_finite() && score > input.config.similarity_threshold {
            scored.push((node, score));
        }
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    if scored.len() > input.config.max_nodes {
        scored.truncate(input.config.max_nodes);
        truncated = true;
    }

    let nodes: Vec<RetrievedNode> = scored
        .iter()
        .map(|&(node, score)| {
            let mut retrieved = RetrievedNode::from_node(node);
            retrieved.similarity = Some(score);
            retrieved.score = Some(score);
            retrieved
        })
        .collect();
    let similarities: Vec<SimilarityScore> = scored
        .iter()
        .map(|&(node, score)| SimilarityScore {
            node: node.id.clone(),
            score,
        })
        .collect();

    let kept: HashSet<&str> = scored.iter().map(|(n, _)| n.id.as_str()).collect();
    let (edges, edges_truncated) = edges_among(
        input
            .graph
            .edges()
            .filter(|e| kept.contains(e.source.as_str()) && kept.contains(e.target.as_str())),
        input.config.max_edges,
    );

    Ok(RetrievalOutput {
        nodes,
        edges,
        similarities: Some(similarities),
        truncated: truncated || edges_truncated,
        ..Default::default()
    })
}
