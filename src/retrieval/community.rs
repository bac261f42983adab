use std::collections::{BTreeMap, HashSet};

use super::{edges_among, CommunityMethod, Deadline, StrategyInput};
use crate::graph::Projection;
use crate::types::{AppError, CommunityInfo, Result, RetrievalOutput, RetrievedNode};

const MAX_ITER: usize = 20;

/// Partition of the projection's node indices. Communities are sorted by
/// their smallest member and members are ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub communities: Vec<Vec<usize>>,
    /// False when the deadline stopped refinement early.
    pub complete: bool,
}

fn undirected_adjacency(projection: &Projection) -> Result<(Vec<Vec<(usize, f32)>>, Vec<f32>, f32)> {
    let n = projection.len();
    let mut neighbors: Vec<Vec<(usize, f32)>> = vec![vec![]; n];
    let mut node_weights: Vec<f32> = vec![0.0; n];
    let mut total_weight: f32 = 0.0;

    for &(u, v, w) in &projection.edges {
        if !w.is_finite() || w < 0.0 {
            return Err(AppError::Algorithm(format!(
                "community detection needs finite non-negative weights, got {w} on {} -> {}",
                projection.ids[u], projection.ids[v]
            )));
        }
        neighbors[u].push((v, w));
        neighbors[v].push((u, w));
        node_weights[u] += w;
        node_weights[v] += w;
        total_weight += w;
    }

    Ok((neighbors, node_weights, total_weight))
}

fn group(assignment: &[usize], complete: bool) -> Partition {
    let mut by_label: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (node, &label) in assignment.iter().enumerate() {
        by_label.entry(label).or_default().push(node);
    }
    let mut communities: Vec<Vec<usize>> = by_label.into_values().collect();
    communities.sort_by_key(|members| members[0]);
    Partition {
        communities,
        complete,
    }
}

/// Louvain local-move phase for modularity with a resolution parameter.
///
/// `resolution` < 1 favors larger communities, > 1 smaller ones.
pub fn louvain(projection: &Projection, resolution: f32, deadline: &Deadline) -> Result<Partition> {
    let n = projection.len();
    if n == 0 {
        return Ok(Partition {
            communities: vec![],
            complete: true,
        });
    }

    let (neighbors, node_weights, total_weight) = undirected_adjacency(projection)?;
    if total_weight == 0.0 {
        return Ok(group(&(0..n).collect::<Vec<_>>(), true));
    }

    let mut community_assignment: Vec<usize> = (0..n).collect();
    let mut community_weights: Vec<f32> = node_weights.clone();

    let m2 = 2.0 * total_weight;

    let mut changed = true;
    let mut iterations = 0;

    while changed && iterations < MAX_ITER {
        if deadline.expired() {
            return Ok(group(&community_assignment, false));
        }
        changed = false;
        iterations += 1;

        for i in 0..n {
            let current_comm = community_assignment[i];
            let ki = node_weights[i];

            let mut gain_map: BTreeMap<usize, f32> = BTreeMap::new();
            for &(neighbor, weight) in &neighbors[i] {
                if neighbor == i {
                    continue;
                }
                *gain_map.entry(community_assignment[neighbor]).or_insert(0.0) += weight;
            }

            let ki_in_current = gain_map.get(&current_comm).copied().unwrap_or(0.0);
            let sum_tot_current = community_weights[current_comm] - ki;
            let gain_current = (ki_in_current / m2) - resolution * (sum_tot_current * ki) / (m2 * m2);

            let mut best_comm = current_comm;
            let mut max_delta: f32 = 0.0;

            for (&comm, &ki_in) in &gain_map {
                if comm == current_comm {
                    continue;
                }
                let sum_tot = community_weights[comm];
                let gain_new = (ki_in / m2) - resolution * (sum_tot * ki) / (m2 * m2);
                let delta = gain_new - gain_current;
                if delta > max_delta {
                    max_delta = delta;
                    best_comm = comm;
                }
            }

            if best_comm != current_comm && max_delta > 1e-10 {
                community_assignment[i] = best_comm;
                community_weights[current_comm] -= ki;
                community_weights[best_comm] += ki;
                changed = true;
            }
        }
    }

    Ok(group(&community_assignment, true))
}

/// Synchronous-order label propagation. Each node adopts the label with the
/// highest summed edge weight among its neighbors; ties keep the current
/// label if it is among the best, else take the smallest.
pub fn label_propagation(projection: &Projection, deadline: &Deadline) -> Result<Partition> {
    let n = projection.len();
    let (neighbors, _, _) = undirected_adjacency(projection)?;
    let mut labels: Vec<usize> = (0..n).collect();

    for _ in 0..MAX_ITER {
        if deadline.expired() {
            return Ok(group(&labels, false));
        }
        let mut changed = false;
        for i in 0..n {
            let mut tally: BTreeMap<usize, f32> = BTreeMap::new();
            for &(neighbor, weight) in &neighbors[i] {
                if neighbor != i {
                    *tally.entry(labels[neighbor]).or_insert(0.0) += weight;
                }
            }
            let Some(best) = tally.values().copied().reduce(f32::max) else {
                continue;
            };
            let current = labels[i];
            if tally.get(&current).is_some_and(|&w| w >= best) {
                continue;
            }
            if let Some((&label, _)) = tally.iter().find(|(_, &w)| w >= best) {
                labels[i] = label;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    Ok(group(&labels, true))
}

/// Communities that contain a start node, each capped at
/// `max_nodes / kept_communities` members, with intra-community edges only.
pub fn communities(input: &StrategyInput<'_>) -> Result<RetrievalOutput> {
    if input.start_nodes.is_empty() {
        return Ok(RetrievalOutput {
            communities: Some(Vec::new()),
            ..Default::default()
        });
    }

    let projection = input.graph.projection();
    let partition = match input.config.community_detection_method {
        CommunityMethod::Louvain => louvain(&projection, input.config.community_resolution, &input.deadline)?,
        CommunityMethod::LabelPropagation => label_propagation(&projection, &input.deadline)?,
    };
    if !partition.complete {
        tracing::warn!(
            method = %input.config.community_detection_method,
            "Community detection deadline reached, using partial partition"
        );
    }

    let start_index: Vec<usize> = input
        .start_nodes
        .iter()
        .filter_map(|id| projection.index.get(id).copied())
        .collect();

    let kept: Vec<&Vec<usize>> = partition
        .communities
        .iter()
        .filter(|members| start_index.iter().any(|s| members.contains(s)))
        .collect();
    if kept.is_empty() {
        return Ok(RetrievalOutput {
            communities: Some(Vec::new()),
            truncated: !partition.complete,
            ..Default::default()
        });
    }

    let cap = input.config.max_nodes / kept.len();
    let mut truncated = !partition.complete;
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut infos = Vec::new();

    for (community_id, members) in kept.into_iter().enumerate() {
        let mut ordered: Vec<usize> = start_index
            .iter()
            .copied()
            .filter(|s| members.contains(s))
            .collect();
        ordered.extend(members.iter().copied().filter(|m| !start_index.contains(m)));
        if ordered.len() > cap {
            truncated = true;
            ordered.truncate(cap);
        }

        let ids: Vec<String> = ordered.iter().map(|&i| projection.ids[i].clone()).collect();
        for id in &ids {
            if let Some(node) = input.graph.node(id) {
                let mut retrieved = RetrievedNode::from_node(node);
                retrieved.community = Some(community_id);
                nodes.push(retrieved);
            }
        }

        let member_set: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let remaining = input.config.max_edges.saturating_sub(edges.len());
        let (intra, cut) = edges_among(
            input
                .graph
                .edges()
                .filter(|e| member_set.contains(e.source.as_str()) && member_set.contains(e.target.as_str())),
            remaining,
        );
        truncated |= cut;
        edges.extend(intra);

        infos.push(CommunityInfo {
            id: community_id,
            size: ids.len(),
            nodes: ids,
        });
    }

    Ok(RetrievalOutput {
        nodes,
        edges,
        communities: Some(infos),
        truncated,
        ..Default::default()
    })
}
