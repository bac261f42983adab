use std::collections::HashSet;

use super::{edges_among, StrategyInput};
use crate::types::{Edge, Result, RetrievalOutput, RetrievedNode};

/// Hard cap on enumerated paths per start node.
pub const MAX_PATHS_PER_START: usize = 10;

struct Frame<'g> {
    path: Vec<&'g str>,
    via: Vec<&'g Edge>,
}

/// Simple paths of 1..=`max_depth` edges from each start node, enumerated
/// depth-first with an explicit stack.
///
/// Every prefix of length >= 1 counts as a path. Nodes are reported in
/// first-visit order, capped at `max_nodes`; paths through a dropped node
/// are dropped with it.
pub fn n_hop(input: &StrategyInput<'_>) -> Result<RetrievalOutput> {
    let graph = input.graph;
    let max_depth = input.config.max_depth;
    let mut truncated = false;
    let mut paths: Vec<Vec<String>> = Vec::new();
    let mut order: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut walked: Vec<&Edge> = Vec::new();
    let mut walked_ids: HashSet<(&str, &str, u32)> = HashSet::new();

    'starts: for start in &input.start_nodes {
        let Some(node) = graph.node(start) else {
            continue;
        };
        if seen.insert(node.id.as_str()) {
            order.push(node.id.as_str());
        }

        let mut found = 0usize;
        let mut stack = vec![Frame {
            path: vec![node.id.as_str()],
            via: Vec::new(),
        }];

        while let Some(frame) = stack.pop() {
            if input.deadline.expired() {
                tracing::warn!(paths = paths.len(), "N-hop deadline reached, returning partial result");
                truncated = true;
                break 'starts;
            }

            if !frame.via.is_empty() {
                paths.push(frame.path.iter().map(|s| s.to_string()).collect());
                for &id in &frame.path {
                    if seen.insert(id) {
                        order.push(id);
                    }
                }
                for &edge in &frame.via {
                    if walked_ids.insert((edge.source.as_str(), edge.target.as_str(), edge.key)) {
                        walked.push(edge);
                    }
                }
                found += 1;
                if found >= MAX_PATHS_PER_START {
                    truncated |= !stack.is_empty();
                    break;
                }
            }

            if frame.via.len() >= max_depth {
                continue;
            }
            let Some(&tail) = frame.path.last() else {
                continue;
            };
            for (neighbor, edge) in graph.neighbors(tail).into_iter().rev() {
                if frame.path.contains(&neighbor) {
                    continue;
                }
                let mut path = frame.path.clone();
                path.push(neighbor);
                let mut via = frame.via.clone();
                via.push(edge);
                stack.push(Frame { path, via });
            }
        }
    }

    if order.len() > input.config.max_nodes {
        order.truncate(input.config.max_nodes);
        truncated = true;
    }
    let kept: HashSet<&str> = order.iter().copied().collect();
    paths.retain(|path| path.iter().all(|id| kept.contains(id.as_str())));
    let nodes: Vec<RetrievedNode> = order
        .iter()
        .filter_map(|id| graph.node(id).map(RetrievedNode::from_node))
        .collect();
    let (edges, edges_truncated) = edges_among(
        walked
            .into_iter()
            .filter(|e| kept.contains(e.source.as_str()) && kept.contains(e.target.as_str())),
        input.config.max_edges,
    );

    Ok(RetrievalOutput {
        nodes,
        edges,
        paths: Some(paths),
        truncated: truncated || edges_truncated,
        ..Default::default()
    })
}
