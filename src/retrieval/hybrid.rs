use std::collections::{HashMap, HashSet};

use super::ppr::pagerank;
use super::semantic::{semantic, TextSimilarity};
use super::traversal::{traverse, TraversalOrder};
use super::StrategyInput;
use crate::types::{NodeSource, Result, RetrievalOutput, RetrievedEdge, RetrievedNode};

struct Tagged {
    node: RetrievedNode,
    source: NodeSource,
    first_seen: usize,
}

fn stage(name: &str, result: Result<RetrievalOutput>) -> RetrievalOutput {
    match result {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!(stage = name, error = %e, "Hybrid stage failed, continuing without it");
            RetrievalOutput::default()
        }
    }
}

/// Tier plus any attached pagerank and similarity values.
pub fn base_score(source: NodeSource, node: &RetrievedNode) -> f32 {
    source.tier_score() + node.pagerank.unwrap_or(0.0) + node.similarity.unwrap_or(0.0)
}

/// Runs BFS, PageRank and Semantic independently and fuses their outputs.
///
/// A failing stage contributes nothing; the semantic stage is skipped when
/// semantic search is switched off. Merge order is always BFS, PageRank,
/// Semantic so the result does not depend on scheduling.
pub fn hybrid(input: &StrategyInput<'_>, similarity: &dyn TextSimilarity) -> Result<RetrievalOutput> {
    let run_semantic = input.config.enable_semantic_search;
    let (bfs, (ranked, similar)) = rayon::join(
        || stage("bfs", traverse(input, TraversalOrder::Breadth)),
        || {
            rayon::join(
                || stage("pagerank", pagerank(input)),
                || {
                    if run_semantic {
                        stage("semantic", semantic(input, similarity))
                    } else {
                        RetrievalOutput::default()
                    }
                },
            )
        },
    );

    Ok(fuse(
        bfs,
        ranked,
        similar,
        input.config.max_nodes,
        input.config.max_edges,
    ))
}

/// Merges stage outputs in BFS, PageRank, Semantic order. A node reported by
/// more than one stage is tagged `Hybrid`.
pub(crate) fn fuse(
    bfs: RetrievalOutput,
    ranked: RetrievalOutput,
    similar: RetrievalOutput,
    max_nodes: usize,
    max_edges: usize,
) -> RetrievalOutput {
    let mut merged: HashMap<String, Tagged> = HashMap::new();
    let mut sequence = 0usize;
    for (output, source) in [
        (&bfs, NodeSource::Bfs),
        (&ranked, NodeSource::Pagerank),
        (&similar, NodeSource::Semantic),
    ] {
        for node in &output.nodes {
            match merged.get_mut(&node.id) {
                Some(existing) => {
                    if existing.source != source {
                        existing.source = NodeSource::Hybrid;
                    }
                    existing.node.depth = existing.node.depth.or(node.depth);
                    existing.node.pagerank = existing.node.pagerank.or(node.pagerank);
                    existing.node.similarity = existing.node.similarity.or(node.similarity);
                }
                None => {
                    merged.insert(
                        node.id.clone(),
                        Tagged {
                            node: node.clone(),
                            source,
                            first_seen: sequence,
                        },
                    );
                    sequence += 1;
                }
            }
        }
    }

    let mut tagged: Vec<Tagged> = merged.into_values().collect();
    for entry in &mut tagged {
        entry.node.source = Some(entry.source);
        entry.node.score = Some(base_score(entry.source, &entry.node));
    }
    tagged.sort_by(|a, b| {
        let sa = a.node.score.unwrap_or(0.0);
        let sb = b.node.score.unwrap_or(0.0);
        sb.partial_cmp(&sa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.first_seen.cmp(&b.first_seen))
    });
    let mut truncated = bfs.truncated || ranked.truncated || similar.truncated;
    if tagged.len() > max_nodes {
        tagged.truncate(max_nodes);
        truncated = true;
    }

    let nodes: Vec<RetrievedNode> = tagged.into_iter().map(|t| t.node).collect();
    let kept: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    let mut edges: Vec<RetrievedEdge> = Vec::new();
    let mut seen_pairs: HashSet<(String, String)> = HashSet::new();
    for edge in bfs.edges.iter().chain(&ranked.edges).chain(&similar.edges) {
        if !kept.contains(edge.source.as_str()) || !kept.contains(edge.target.as_str()) {
            continue;
        }
        if !seen_pairs.insert((edge.source.clone(), edge.target.clone())) {
            continue;
        }
        if edges.len() >= max_edges {
            truncated = true;
            break;
        }
        edges.push(edge.clone());
    }

    RetrievalOutput {
        nodes,
        edges,
        similarities: similar.similarities,
        truncated,
        ..Default::default()
    }
}
