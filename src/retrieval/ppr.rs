use super::{edges_among, Deadline, StrategyInput};
use crate::graph::Projection;
use crate::types::{AppError, Result, RetrievalOutput, RetrievedNode};

pub const PAGERANK_TOLERANCE: f32 = 1e-6;
pub const PAGERANK_MAX_ITER: usize = 100;

/// Weighted (personalized) PageRank over a dense projection.
///
/// Undirected projections push mass along both orientations of every edge.
/// Nodes whose outgoing weight is zero are dangling; their mass is spread
/// over the personalization vector. An empty `seeds` slice means uniform
/// teleport, i.e. classic global PageRank. Returns `(scores, converged)`;
/// an expired deadline stops iterating and reports the current scores.
pub fn page_rank(
    projection: &Projection,
    seeds: &[usize],
    damping: f32,
    deadline: &Deadline,
) -> Result<(Vec<f32>, bool)> {
    let n = projection.len();
    if n == 0 {
        return Ok((Vec::new(), true));
    }

    let mut out: Vec<Vec<(usize, f32)>> = vec![Vec::new(); n];
    for &(s, t, w) in &projection.edges {
        if !w.is_finite() || w < 0.0 {
            return Err(AppError::Algorithm(format!(
                "PageRank needs finite non-negative weights, got {w} on {} -> {}",
                projection.ids[s], projection.ids[t]
            )));
        }
        out[s].push((t, w));
        if !projection.directed && s != t {
            out[t].push((s, w));
        }
    }
    let out_weight: Vec<f32> = out
        .iter()
        .map(|edges| edges.iter().map(|(_, w)| w).sum())
        .collect();

    let mut personalization = vec![0.0; n];
    let seeds: Vec<usize> = seeds.iter().copied().filter(|&s| s < n).collect();
    if seeds.is_empty() {
        personalization.fill(1.0 / n as f32);
    } else {
        let seed_weight = 1.0 / seeds.len() as f32;
        for s in seeds {
            personalization[s] += seed_weight;
        }
    }

    let dangling: Vec<usize> = (0..n).filter(|&i| out_weight[i] <= 0.0).collect();
    let mut scores = personalization.clone();

    for _ in 0..PAGERANK_MAX_ITER {
        if deadline.expired() {
            return Ok((scores, false));
        }
        let mut next = vec![0.0; n];

        let dangling_sum: f32 = dangling.iter().map(|&i| scores[i]).sum();

        for i in 0..n {
            if out_weight[i] <= 0.0 {
                continue;
            }
            let mass = scores[i] * damping / out_weight[i];
            for &(t, w) in &out[i] {
                next[t] += mass * w;
            }
        }

        for i in 0..n {
            next[i] += damping * dangling_sum * personalization[i];
            next[i] += (1.0 - damping) * personalization[i];
        }

        let diff: f32 = scores
            .iter()
            .zip(next.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();

        scores = next;

        if diff < PAGERANK_TOLERANCE {
            return Ok((scores, true));
        }
    }

    Ok((scores, true))
}

/// Global importance ranking: top `max_nodes` by score plus the edges among them.
pub fn pagerank(input: &StrategyInput<'_>) -> Result<RetrievalOutput> {
    let projection = input.graph.projection();
    let (scores, converged) = page_rank(&projection, &[], input.config.pagerank_alpha, &input.deadline)?;
    if !converged {
        tracing::warn!(nodes = projection.len(), "PageRank deadline reached, using partial scores");
    }

    let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(input.config.max_nodes);

    let nodes: Vec<RetrievedNode> = ranked
        .iter()
        .filter_map(|&(i, score)| {
            input.graph.node(&projection.ids[i]).map(|node| {
                let mut retrieved = RetrievedNode::from_node(node);
                retrieved.pagerank = Some(score);
                retrieved.score = Some(score);
                retrieved
            })
        })
        .collect();

    let kept: std::collections::HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
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
        truncated: !converged || edges_truncated,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphKind, GraphStore};
    use crate::retrieval::RetrievalConfig;
    use crate::test_utils::{biomedical_graph, path_graph};
    use crate::types::{Edge, Node};

    fn star() -> GraphStore {
        let mut g = GraphStore::new(GraphKind::UNDIRECTED);
        for id in ["hub", "a", "b", "c", "d"] {
            g.add_node(Node::new(id, id));
        }
        for leaf in ["a", "b", "c", "d"] {
            g.add_edge(Edge::new("hub", leaf, "GiG")).unwrap();
        }
        g
    }

    #[test]
    fn test_empty_projection() {
        let g = GraphStore::new(GraphKind::DIRECTED);
        let (scores, converged) = page_rank(&g.projection(), &[], 0.85, &Deadline::none()).unwrap();
        assert!(scores.is_empty());
        assert!(converged);
    }

    #[test]
    fn test_scores_sum_to_one() {
        let g = biomedical_graph();
        let (scores, _) = page_rank(&g.projection(), &[], 0.85, &Deadline::none()).unwrap();
        let total: f32 = scores.iter().sum();
        assert!((total - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_hub_ranks_first() {
        let g = star();
        let config = RetrievalConfig {
            max_nodes: 3,
            ..Default::default()
        };
        let input = StrategyInput::new(&g, "", &[] as &[&str], &config, Deadline::none());
        let output = pagerank(&input).unwrap();
        assert_eq!(output.nodes.len(), 3);
        assert_eq!(output.nodes[0].id, "hub");
        assert!(output.nodes[0].pagerank.unwrap() > output.nodes[1].pagerank.unwrap());
        assert_eq!(output.edges.len(), 2);
    }

    #[test]
    fn test_personalized_chain() {
        let mut g = GraphStore::new(GraphKind::DIRECTED);
        for id in ["A", "B", "C"] {
            g.add_node(Node::new(id, id));
        }
        g.add_edge(Edge::new("A", "B", "r")).unwrap();
        g.add_edge(Edge::new("B", "C", "r")).unwrap();
        let projection = g.projection();
        let (scores, _) = page_rank(&projection, &[0], 0.5, &Deadline::none()).unwrap();
        assert!(scores[0] > scores[1]);
        assert!(scores[1] > scores[2]);
    }

    #[test]
    fn test_weights_shift_mass() {
        let mut g = GraphStore::new(GraphKind::DIRECTED);
        for id in ["s", "heavy", "light"] {
            g.add_node(Node::new(id, id));
        }
        g.add_edge(Edge::new("s", "heavy", "r").with_weight(9.0)).unwrap();
        g.add_edge(Edge::new("s", "light", "r").with_weight(1.0)).unwrap();
        let (scores, _) = page_rank(&g.projection(), &[0], 0.85, &Deadline::none()).unwrap();
        assert!(scores[1] > scores[2] * 2.0);
    }

    #[test]
    fn test_negative_weight_is_an_algorithm_error() {
        let mut g = path_graph();
        g.add_edge(Edge::new("A", "E", "r").with_weight(-1.0)).unwrap();
        let result = page_rank(&g.projection(), &[], 0.85, &Deadline::none());
        assert!(matches!(result, Err(AppError::Algorithm(_))));
    }
}
