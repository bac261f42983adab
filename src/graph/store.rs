//! In-memory labeled graph store.
//!
//! Backed by a petgraph `StableDiGraph` so node removal during entity
//! resolution never invalidates the indices of surviving nodes. Undirected
//! stores keep each edge once in its inserted orientation and read it both
//! ways. Simple stores hold at most one edge per (endpoints, direction);
//! multi stores tell parallel edges apart by `Edge::key`.

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction as PetDirection;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::types::{AppError, Edge, Node, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphKind {
    pub directed: bool,
    pub multi: bool,
}

impl GraphKind {
    pub const UNDIRECTED: GraphKind = GraphKind { directed: false, multi: false };
    pub const UNDIRECTED_MULTI: GraphKind = GraphKind { directed: false, multi: true };
    pub const DIRECTED: GraphKind = GraphKind { directed: true, multi: false };
    pub const DIRECTED_MULTI: GraphKind = GraphKind { directed: true, multi: true };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeInsert {
    Added,
    Duplicate,
}

/// Outcome of re-pointing one node's edges onto another.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectStats {
    pub redirected: usize,
    pub duplicates_dropped: usize,
    pub self_loops_dropped: usize,
    pub skipped: usize,
}

impl RedirectStats {
    pub fn absorb(&mut self, other: RedirectStats) {
        self.redirected += other.redirected;
        self.duplicates_dropped += other.duplicates_dropped;
        self.self_loops_dropped += other.self_loops_dropped;
        self.skipped += other.skipped;
    }
}

/// Dense index view of the store used by the whole-graph algorithms.
#[derive(Debug, Clone)]
pub struct Projection {
    pub ids: Vec<String>,
    pub index: HashMap<String, usize>,
    pub edges: Vec<(usize, usize, f32)>,
    pub directed: bool,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub directed: bool,
    pub multi: bool,
    pub density: f64,
    pub node_types: BTreeMap<String, usize>,
    pub edge_types: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    kind: GraphKind,
    graph: StableDiGraph<Node, Edge>,
    index: HashMap<String, NodeIndex>,
}

impl GraphStore {
    pub fn new(kind: GraphKind) -> Self {
        Self {
            kind,
            graph: StableDiGraph::default(),
            index: HashMap::new(),
        }
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn is_directed(&self) -> bool {
        self.kind.directed
    }

    pub fn is_multi(&self) -> bool {
        self.kind.multi
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).and_then(|&idx| self.graph.node_weight(idx))
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let idx = *self.index.get(id)?;
        self.graph.node_weight_mut(idx)
    }

    /// Inserts a node; returns false when the id is already taken.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.index.contains_key(&node.id) {
            return false;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        true
    }

    /// Removes a node together with all of its incident edges.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let idx = self.index.remove(id)?;
        self.graph.remove_node(idx)
    }

    /// Nodes in store order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph
            .node_indices()
            .filter_map(move |idx| self.graph.node_weight(idx))
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes().map(|n| n.id.clone()).collect()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph
            .edge_indices()
            .filter_map(move |idx| self.graph.edge_weight(idx))
    }

    fn node_index(&self, id: &str) -> Result<NodeIndex> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| AppError::NodeNotFound(id.to_string()))
    }

    fn find_edge(&self, source: &str, target: &str, key: u32) -> Option<EdgeIndex> {
        let s = *self.index.get(source)?;
        let t = *self.index.get(target)?;
        let matches = |from: NodeIndex, to: NodeIndex| {
            self.graph
                .edges_directed(from, PetDirection::Outgoing)
                .find(|e| e.target() == to && e.weight().key == key)
                .map(|e| e.id())
        };
        matches(s, t).or_else(|| if self.kind.directed { None } else { matches(t, s) })
    }

    pub fn contains_edge(&self, source: &str, target: &str, key: u32) -> bool {
        self.find_edge(source, target, key).is_some()
    }

    /// Inserts an edge unless one with the same (endpoints, key) already exists.
    /// Simple stores ignore the incoming key and always use 0.
    pub fn add_edge(&mut self, mut edge: Edge) -> Result<EdgeInsert> {
        if !self.kind.multi {
            edge.key = 0;
        }
        if !edge.weight.is_finite() {
            return Err(AppError::InvalidEdge(format!(
                "{} -> {}: non-finite weight",
                edge.source, edge.target
            )));
        }
        let s = self.node_index(&edge.source)?;
        let t = self.node_index(&edge.target)?;
        if self.find_edge(&edge.source, &edge.target, edge.key).is_some() {
            return Ok(EdgeInsert::Duplicate);
        }
        self.graph.add_edge(s, t, edge);
        Ok(EdgeInsert::Added)
    }

    /// Multi stores: inserts with the lowest key not yet used between the endpoints.
    /// Simple stores behave like `add_edge`.
    pub fn add_edge_auto_key(&mut self, mut edge: Edge) -> Result<EdgeInsert> {
        if self.kind.multi {
            let mut key = 0;
            while self.contains_edge(&edge.source, &edge.target, key) {
                key += 1;
            }
            edge.key = key;
        }
        self.add_edge(edge)
    }

    fn sorted_edges(&self, idx: NodeIndex, dir: PetDirection) -> Vec<EdgeIndex> {
        let mut edges: Vec<EdgeIndex> = self.graph.edges_directed(idx, dir).map(|e| e.id()).collect();
        edges.sort();
        edges
    }

    /// Neighbors reachable from `id` with the edge used to reach them, in edge insertion order.
    /// Directed stores follow outgoing edges only.
    pub fn neighbors(&self, id: &str) -> Vec<(&str, &Edge)> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut edges = self.sorted_edges(idx, PetDirection::Outgoing);
        if !self.kind.directed {
            edges.extend(self.sorted_edges(idx, PetDirection::Incoming));
            edges.sort();
            edges.dedup();
        }
        edges
            .into_iter()
            .filter_map(|e| self.graph.edge_weight(e))
            .map(|edge| {
                let other = if edge.source == id { edge.target.as_str() } else { edge.source.as_str() };
                (other, edge)
            })
            .collect()
    }

    /// Distinct neighbor ids in first-seen order.
    pub fn neighbor_ids(&self, id: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.neighbors(id)
            .into_iter()
            .filter(|(n, _)| seen.insert(*n))
            .map(|(n, _)| n.to_string())
            .collect()
    }

    /// Edges between two nodes; undirected stores match either orientation.
    pub fn edges_between(&self, a: &str, b: &str) -> Vec<&Edge> {
        let (Some(&ia), Some(&ib)) = (self.index.get(a), self.index.get(b)) else {
            return Vec::new();
        };
        let mut found: Vec<EdgeIndex> = self
            .graph
            .edges_directed(ia, PetDirection::Outgoing)
            .filter(|e| e.target() == ib)
            .map(|e| e.id())
            .collect();
        if !self.kind.directed && ia != ib {
            found.extend(
                self.graph
                    .edges_directed(ib, PetDirection::Outgoing)
                    .filter(|e| e.target() == ia)
                    .map(|e| e.id()),
            );
        }
        found.sort();
        found.into_iter().filter_map(|e| self.graph.edge_weight(e)).collect()
    }

    /// Incident edge count (in + out).
    pub fn degree(&self, id: &str) -> usize {
        let Some(&idx) = self.index.get(id) else {
            return 0;
        };
        self.graph.edges_directed(idx, PetDirection::Outgoing).count()
            + self.graph.edges_directed(idx, PetDirection::Incoming).count()
    }

    /// Every edge touching `id`, each once.
    pub fn incident_edges(&self, id: &str) -> Vec<&Edge> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut edges = self.sorted_edges(idx, PetDirection::Incoming);
        edges.extend(self.sorted_edges(idx, PetDirection::Outgoing));
        edges.sort();
        edges.dedup();
        edges.into_iter().filter_map(|e| self.graph.edge_weight(e)).collect()
    }

    /// Multi stores only: the edge's (endpoints, key) slot holds an edge with a
    /// different metaedge or relation.
    fn key_taken_by_other_relation(&self, edge: &Edge) -> bool {
        if !self.kind.multi {
            return false;
        }
        self.find_edge(&edge.source, &edge.target, edge.key)
            .and_then(|idx| self.graph.edge_weight(idx))
            .is_some_and(|existing| existing.metaedge != edge.metaedge || existing.relation != edge.relation)
    }

    /// Re-points every edge of `member` onto `representative`, then deletes `member`.
    ///
    /// Direction, weight and attributes are preserved, and so is the key unless a
    /// multi store already holds a different relation under it; such an edge
    /// moves to the next free key. An edge whose (endpoints, key) already exists
    /// at the representative with the same relation is dropped, as is an edge
    /// that would collapse into a self-loop between the two nodes.
    /// Directed stores walk predecessor and successor edges separately.
    pub fn redirect_edges(&mut self, member: &str, representative: &str) -> Result<RedirectStats> {
        if member == representative {
            return Ok(RedirectStats::default());
        }
        let m = self.node_index(member)?;
        self.node_index(representative)?;

        let mut batches: Vec<Vec<EdgeIndex>> = Vec::new();
        if self.kind.directed {
            batches.push(self.sorted_edges(m, PetDirection::Incoming));
            batches.push(self.sorted_edges(m, PetDirection::Outgoing));
        } else {
            let mut all = self.sorted_edges(m, PetDirection::Incoming);
            all.extend(self.sorted_edges(m, PetDirection::Outgoing));
            all.sort();
            batches.push(all);
        }

        let mut stats = RedirectStats::default();
        let mut handled: HashSet<EdgeIndex> = HashSet::new();
        for batch in batches {
            for edge_idx in batch {
                if !handled.insert(edge_idx) {
                    continue;
                }
                let Some(original) = self.graph.edge_weight(edge_idx).cloned() else {
                    continue;
                };
                let mut moved = original.clone();
                if moved.source == member {
                    moved.source = representative.to_string();
                }
                if moved.target == member {
                    moved.target = representative.to_string();
                }
                if moved.is_self_loop() && !original.is_self_loop() {
                    stats.self_loops_dropped += 1;
                    continue;
                }
                let inserted = if self.key_taken_by_other_relation(&moved) {
                    self.add_edge_auto_key(moved)
                } else {
                    self.add_edge(moved)
                };
                match inserted {
                    Ok(EdgeInsert::Added) => stats.redirected += 1,
                    Ok(EdgeInsert::Duplicate) => stats.duplicates_dropped += 1,
                    Err(e) => {
                        stats.skipped += 1;
                        tracing::warn!(
                            member,
                            representative,
                            source = %original.source,
                            target = %original.target,
                            error = %e,
                            "Skipping edge during redirection"
                        );
                    }
                }
            }
        }

        self.remove_node(member);
        Ok(stats)
    }

    pub fn projection(&self) -> Projection {
        let ids = self.node_ids();
        let index: HashMap<String, usize> =
            ids.iter().enumerate().map(|(i, id)| (id.clone(), i)).collect();
        let edges = self
            .edges()
            .filter_map(|e| match (index.get(&e.source), index.get(&e.target)) {
                (Some(&s), Some(&t)) => Some((s, t, e.weight)),
                _ => None,
            })
            .collect();
        Projection {
            ids,
            index,
            edges,
            directed: self.kind.directed,
        }
    }

    pub fn stats(&self) -> GraphStats {
        let n = self.node_count();
        let m = self.edge_count();
        let density = if n > 1 {
            let pairs = (n * (n - 1)) as f64;
            if self.kind.directed {
                m as f64 / pairs
            } else {
                2.0 * m as f64 / pairs
            }
        } else {
            0.0
        };

        let mut node_types = BTreeMap::new();
        for node in self.nodes() {
            *node_types.entry(node.kind()).or_insert(0) += 1;
        }
        let mut edge_types = BTreeMap::new();
        for edge in self.edges() {
            *edge_types.entry(edge.metaedge.clone()).or_insert(0) += 1;
        }

        GraphStats {
            node_count: n,
            edge_count: m,
            directed: self.kind.directed,
            multi: self.kind.multi,
            density,
            node_types,
            edge_types,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(kind: GraphKind) -> GraphStore {
        let mut g = GraphStore::new(kind);
        for id in ["a", "b", "c"] {
            assert!(g.add_node(Node::new(id, id)));
        }
        g
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut g = store(GraphKind::UNDIRECTED);
        assert!(!g.add_node(Node::new("a", "other")));
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.node("a").unwrap().name, "a");
    }

    #[test]
    fn test_simple_store_collapses_parallel_edges() {
        let mut g = store(GraphKind::UNDIRECTED);
        assert_eq!(g.add_edge(Edge::new("a", "b", "GiG")).unwrap(), EdgeInsert::Added);
        assert_eq!(g.add_edge(Edge::new("b", "a", "GiG").with_key(3)).unwrap(), EdgeInsert::Duplicate);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_multi_store_auto_keys() {
        let mut g = store(GraphKind::DIRECTED_MULTI);
        g.add_edge_auto_key(Edge::new("a", "b", "GiG")).unwrap();
        g.add_edge_auto_key(Edge::new("a", "b", "GcG")).unwrap();
        g.add_edge_auto_key(Edge::new("b", "a", "GcG")).unwrap();
        let keys: Vec<u32> = g.edges_between("a", "b").iter().map(|e| e.key).collect();
        assert_eq!(keys, vec![0, 1]);
        assert!(g.contains_edge("b", "a", 0));
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn test_missing_endpoint_is_error() {
        let mut g = store(GraphKind::DIRECTED);
        let err = g.add_edge(Edge::new("a", "zzz", "GiG")).unwrap_err();
        assert!(matches!(err, AppError::NodeNotFound(id) if id == "zzz"));
    }

    #[test]
    fn test_directed_neighbors_follow_outgoing() {
        let mut g = store(GraphKind::DIRECTED);
        g.add_edge(Edge::new("a", "b", "Gr>G")).unwrap();
        g.add_edge(Edge::new("c", "a", "Gr>G")).unwrap();
        assert_eq!(g.neighbor_ids("a"), vec!["b".to_string()]);
        assert_eq!(g.degree("a"), 2);

        let mut u = store(GraphKind::UNDIRECTED);
        u.add_edge(Edge::new("a", "b", "GiG")).unwrap();
        u.add_edge(Edge::new("c", "a", "GiG")).unwrap();
        assert_eq!(u.neighbor_ids("a"), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_redirect_drops_duplicates_and_self_loops() {
        let mut g = store(GraphKind::UNDIRECTED);
        g.add_node(Node::new("d", "d"));
        g.add_edge(Edge::new("a", "c", "GiG")).unwrap();
        g.add_edge(Edge::new("b", "c", "GiG")).unwrap();
        g.add_edge(Edge::new("b", "d", "GiG")).unwrap();
        g.add_edge(Edge::new("a", "b", "GiG")).unwrap();

        let stats = g.redirect_edges("b", "a").unwrap();
        assert_eq!(stats.redirected, 1);
        assert_eq!(stats.duplicates_dropped, 1);
        assert_eq!(stats.self_loops_dropped, 1);
        assert!(!g.contains_node("b"));
        assert!(g.contains_edge("a", "d", 0));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_redirect_directed_multi_keeps_keys_and_direction() {
        let mut g = store(GraphKind::DIRECTED_MULTI);
        g.add_edge(Edge::new("b", "c", "GiG").with_key(0)).unwrap();
        g.add_edge(Edge::new("b", "c", "GcG").with_key(1).with_weight(0.5)).unwrap();
        g.add_edge(Edge::new("c", "b", "Gr>G").with_key(0)).unwrap();
        g.add_edge(Edge::new("a", "c", "GiG").with_key(0)).unwrap();

        let stats = g.redirect_edges("b", "a").unwrap();
        assert_eq!(stats.redirected, 2);
        assert_eq!(stats.duplicates_dropped, 1);

        let out: Vec<(String, u32)> = g
            .edges_between("a", "c")
            .iter()
            .map(|e| (e.metaedge.clone(), e.key))
            .collect();
        assert_eq!(out, vec![("GiG".to_string(), 0), ("GcG".to_string(), 1)]);
        assert_eq!(g.edges_between("c", "a")[0].metaedge, "Gr>G");
        assert!((g.edges_between("a", "c")[1].weight - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_redirect_multi_rekeys_distinct_relation_on_key_clash() {
        let mut g = store(GraphKind::DIRECTED_MULTI);
        g.add_edge(Edge::new("a", "c", "GiG").with_key(0)).unwrap();
        g.add_edge(Edge::new("b", "c", "GcG").with_key(0)).unwrap();

        let stats = g.redirect_edges("b", "a").unwrap();
        assert_eq!(stats.redirected, 1);
        assert_eq!(stats.duplicates_dropped, 0);

        let out: Vec<(String, u32)> = g
            .edges_between("a", "c")
            .iter()
            .map(|e| (e.metaedge.clone(), e.key))
            .collect();
        assert_eq!(out, vec![("GiG".to_string(), 0), ("GcG".to_string(), 1)]);
    }

    #[test]
    fn test_stats_density() {
        let mut g = store(GraphKind::UNDIRECTED);
        g.add_edge(Edge::new("a", "b", "GiG")).unwrap();
        let stats = g.stats();
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.edge_types.get("GiG"), Some(&1));
        assert!((stats.density - 1.0 / 3.0).abs() < 1e-9);
    }
}
