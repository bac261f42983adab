use std::collections::{HashMap, HashSet, VecDeque};

use super::{edges_among, StrategyInput};
use crate::types::{Edge, Result, RetrievalOutput, RetrievedNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOrder {
    Breadth,
    Depth,
}

/// Visited set in discovery order plus the edges walked to reach or leave it.
struct Walk<'g> {
    order: Vec<(&'g str, usize)>,
    seen: HashSet<&'g str>,
    walked: Vec<&'g Edge>,
    walked_ids: HashSet<(&'g str, &'g str, u32)>,
    truncated: bool,
}

impl<'g> Walk<'g> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            seen: HashSet::new(),
            walked: Vec::new(),
            walked_ids: HashSet::new(),
            truncated: false,
        }
    }

    fn visit(&mut self, id: &'g str, depth: usize) {
        if self.seen.insert(id) {
            self.order.push((id, depth));
        }
    }

    fn record(&mut self, edge: &'g Edge) {
        if self
            .walked_ids
            .insert((edge.source.as_str(), edge.target.as_str(), edge.key))
        {
            self.walked.push(edge);
        }
    }
}

/// Bounded BFS or DFS from the start nodes.
///
/// A node at `max_depth` is reported but never expanded, and at most
/// `max_nodes` nodes are reported. Only edges whose endpoints were both
/// reported are returned, in traversal order, capped at `max_edges`.
pub fn traverse(input: &StrategyInput<'_>, order: TraversalOrder) -> Result<RetrievalOutput> {
    let walk = match order {
        TraversalOrder::Breadth => breadth_first(input),
        TraversalOrder::Depth => depth_first(input),
    };
    Ok(finish(input, walk))
}

fn breadth_first<'g>(input: &StrategyInput<'g>) -> Walk<'g> {
    let graph = input.graph;
    let max_depth = input.config.max_depth;
    let max_nodes = input.config.max_nodes;
    let mut walk = Walk::new();
    let mut queue: VecDeque<(&'g str, usize)> = VecDeque::new();

    for start in &input.start_nodes {
        let Some(node) = graph.node(start) else {
            continue;
        };
        if walk.seen.contains(node.id.as_str()) {
            continue;
        }
        if walk.order.len() >= max_nodes {
            walk.truncated = true;
            break;
        }
        walk.visit(&node.id, 0);
        queue.push_back((&node.id, 0));
    }

    while let Some((id, depth)) = queue.pop_front() {
        if input.deadline.expired() {
            tracing::warn!(visited = walk.order.len(), "BFS deadline reached, returning partial result");
            walk.truncated = true;
            break;
        }
        if depth >= max_depth {
            continue;
        }
        for (neighbor, edge) in graph.neighbors(id) {
            if !walk.seen.contains(neighbor) {
                if walk.order.len() >= max_nodes {
                    walk.truncated = true;
                    continue;
                }
                walk.visit(neighbor, depth + 1);
                queue.push_back((neighbor, depth + 1));
            }
            walk.record(edge);
        }
    }

    walk
}

fn depth_first<'g>(input: &StrategyInput<'g>) -> Walk<'g> {
    let graph = input.graph;
    let max_depth = input.config.max_depth;
    let max_nodes = input.config.max_nodes;
    let mut walk = Walk::new();
    let mut stack: Vec<(&'g str, usize, Option<&'g Edge>)> = Vec::new();

    for start in input.start_nodes.iter().rev() {
        if let Some(node) = graph.node(start) {
            stack.push((&node.id, 0, None));
        }
    }

    while let Some((id, depth, via)) = stack.pop() {
        if input.deadline.expired() {
            tracing::warn!(visited = walk.order.len(), "DFS deadline reached, returning partial result");
            walk.truncated = true;
            break;
        }
        if walk.seen.contains(id) {
            if let Some(edge) = via {
                walk.record(edge);
            }
            continue;
        }
        if walk.order.len() >= max_nodes {
            walk.truncated = true;
            continue;
        }
        walk.visit(id, depth);
        if let Some(edge) = via {
            walk.record(edge);
        }
        if depth >= max_depth {
            continue;
        }
        let neighbors = graph.neighbors(id);
        for (neighbor, edge) in neighbors.into_iter().rev() {
            stack.push((neighbor, depth + 1, Some(edge)));
        }
    }

    walk
}

fn finish(input: &StrategyInput<'_>, walk: Walk<'_>) -> RetrievalOutput {
    let depths: HashMap<&str, usize> = walk.order.iter().copied().collect();
    let nodes: Vec<RetrievedNode> = walk
        .order
        .iter()
        .filter_map(|(id, depth)| {
            input.graph.node(id).map(|node| {
                let mut retrieved = RetrievedNode::from_node(node);
                retrieved.depth = Some(*depth);
                retrieved
            })
        })
        .collect();

    let (edges, edges_truncated) = edges_among(
        walk.walked
            .into_iter()
            .filter(|e| depths.contains_key(e.source.as_str()) && depths.contains_key(e.target.as_str())),
        input.config.max_edges,
    );

    RetrievalOutput {
        nodes,
        edges,
        truncated: walk.truncated || edges_truncated,
        ..Default::default()
    }
}
