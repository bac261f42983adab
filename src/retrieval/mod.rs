//! Retrieval algorithms over a [`GraphStore`].
//!
//! Every strategy is a pure read of the store, bounded by the node/depth/edge
//! caps in [`RetrievalConfig`] and by a wall-clock [`Deadline`]. A strategy cut
//! short returns what it has with `truncated` set.

pub mod community;
pub mod config;
pub mod deadline;
pub mod hybrid;
pub mod nhop;
pub mod ppr;
pub mod semantic;
pub mod traversal;

pub use community::{label_propagation, louvain, Partition};
pub use config::{CommunityMethod, RetrievalAlgorithm, RetrievalConfig};
pub use deadline::Deadline;
pub use nhop::MAX_PATHS_PER_START;
pub use ppr::page_rank;
pub use semantic::{TextSimilarity, TokenJaccard};
pub use traversal::TraversalOrder;

use std::collections::HashSet;
use std::sync::Arc;

use crate::graph::GraphStore;
use crate::types::{Edge, Result, RetrievalOutput, RetrievedEdge};

/// Everything a strategy reads. Start nodes are already de-duplicated and
/// restricted to ids present in the graph.
pub struct StrategyInput<'g> {
    pub graph: &'g GraphStore,
    pub query: &'g str,
    pub start_nodes: Vec<String>,
    pub config: &'g RetrievalConfig,
    pub deadline: Deadline,
}

impl<'g> StrategyInput<'g> {
    pub fn new<S: AsRef<str>>(
        graph: &'g GraphStore,
        query: &'g str,
        start_nodes: &[S],
        config: &'g RetrievalConfig,
        deadline: Deadline,
    ) -> Self {
        let mut seen = HashSet::new();
        let start_nodes = start_nodes
            .iter()
            .map(|s| s.as_ref())
            .filter(|id| graph.contains_node(id))
            .filter(|id| seen.insert(id.to_string()))
            .map(str::to_string)
            .collect();
        Self {
            graph,
            query,
            start_nodes,
            config,
            deadline,
        }
    }
}

/// Converts edges in order, stopping at `max_edges`. Returns whether any were cut.
pub(crate) fn edges_among<'a, I>(edges: I, max_edges: usize) -> (Vec<RetrievedEdge>, bool)
where
    I: IntoIterator<Item = &'a Edge>,
{
    let mut out = Vec::new();
    for edge in edges {
        if out.len() >= max_edges {
            return (out, true);
        }
        out.push(RetrievedEdge::from(edge));
    }
    (out, false)
}

/// Strategy dispatcher holding the pluggable text similarity.
#[derive(Clone)]
pub struct Retriever {
    similarity: Arc<dyn TextSimilarity>,
}

impl Default for Retriever {
    fn default() -> Self {
        Self::new(Arc::new(TokenJaccard))
    }
}

impl Retriever {
    pub fn new(similarity: Arc<dyn TextSimilarity>) -> Self {
        Self { similarity }
    }

    pub fn similarity(&self) -> &dyn TextSimilarity {
        self.similarity.as_ref()
    }

    /// Runs one strategy. A missing or empty graph yields an empty output;
    /// a strategy switched off in `config` is an error.
    pub fn run<S: AsRef<str>>(
        &self,
        algorithm: RetrievalAlgorithm,
        graph: Option<&GraphStore>,
        query: &str,
        start_nodes: &[S],
        config: &RetrievalConfig,
    ) -> Result<RetrievalOutput> {
        config.ensure_enabled(algorithm)?;
        let Some(graph) = graph.filter(|g| !g.is_empty()) else {
            return Ok(RetrievalOutput::default());
        };

        let input = StrategyInput::new(graph, query, start_nodes, config, config.deadline());
        tracing::debug!(
            %algorithm,
            start_nodes = input.start_nodes.len(),
            max_depth = config.max_depth,
            max_nodes = config.max_nodes,
            "Running retrieval strategy"
        );

        let output = match algorithm {
            RetrievalAlgorithm::Bfs => traversal::traverse(&input, TraversalOrder::Breadth),
            RetrievalAlgorithm::Dfs => traversal::traverse(&input, TraversalOrder::Depth),
            RetrievalAlgorithm::Pagerank => ppr::pagerank(&input),
            RetrievalAlgorithm::CommunityDetection => community::communities(&input),
            RetrievalAlgorithm::SemanticSimilarity => semantic::semantic(&input, self.similarity()),
            RetrievalAlgorithm::NHop => nhop::n_hop(&input),
            RetrievalAlgorithm::Hybrid => hybrid::hybrid(&input, self.similarity()),
        }?;

        tracing::info!(
            %algorithm,
            nodes = output.nodes.len(),
            edges = output.edges.len(),
            truncated = output.truncated,
            "Retrieval complete"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphKind;
    use crate::test_utils::path_graph;
    use crate::types::AppError;

    #[test]
    fn test_every_strategy_on_missing_or_empty_graph() {
        let retriever = Retriever::default();
        let config = RetrievalConfig::default();
        let empty = GraphStore::new(GraphKind::DIRECTED_MULTI);
        for algorithm in RetrievalAlgorithm::ALL {
            let none = retriever.run(algorithm, None, "q", &["A"], &config).unwrap();
            assert!(none.is_empty(), "{algorithm}");
            let out = retriever.run(algorithm, Some(&empty), "q", &["A"], &config).unwrap();
            assert!(out.is_empty(), "{algorithm}");
        }
    }

    #[test]
    fn test_every_strategy_respects_node_cap() {
        let retriever = Retriever::default();
        let graph = path_graph();
        let config = RetrievalConfig {
            max_nodes: 2,
            similarity_threshold: 0.0,
            ..Default::default()
        };
        for algorithm in RetrievalAlgorithm::ALL {
            let out = retriever
                .run(algorithm, Some(&graph), "node a b c", &["C"], &config)
                .unwrap();
            assert!(out.nodes.len() <= 2, "{algorithm}: {:?}", out.node_ids());
        }
    }

    #[test]
    fn test_disabled_strategy_is_rejected() {
        let retriever = Retriever::default();
        let graph = path_graph();
        let config = RetrievalConfig {
            enable_n_hop_search: false,
            ..Default::default()
        };
        let err = retriever
            .run(RetrievalAlgorithm::NHop, Some(&graph), "", &["A"], &config)
            .unwrap_err();
        assert!(matches!(err, AppError::StrategyDisabled(name) if name == "n_hop"));
    }

    #[test]
    fn test_start_nodes_deduplicated_and_filtered() {
        let graph = path_graph();
        let config = RetrievalConfig::default();
        let input = StrategyInput::new(&graph, "", &["B", "zz", "B", "A"], &config, Deadline::none());
        assert_eq!(input.start_nodes, vec!["B", "A"]);
    }
}
