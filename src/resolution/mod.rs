//! Entity resolution: fuzzy deduplication of graph nodes.
//!
//! - `normalize`: canonical label form
//! - `similarity`: charset-Jaccard + LCS label score
//! - `blocking`: (type, namespace) buckets and the never-merge pair list
//! - `merge`: attribute reconciliation

pub mod blocking;
pub mod merge;
pub mod normalize;
pub mod similarity;

pub use blocking::{BlockedPairs, BucketKey};
pub use merge::merge_attributes;
pub use normalize::normalize_label;
pub use similarity::{label_similarity, lcs_length, normalized_similarity};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::graph::{GraphStore, RedirectStats};
use crate::retrieval::Deadline;
use crate::types::{AppError, Result};

pub const DEFAULT_THRESHOLD: f32 = 0.8;
pub const DEFAULT_MAX_PASSES: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolutionGroup {
    pub representative: String,
    /// All ids folded into the representative, the representative included, first-seen order.
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionAudit {
    pub resolved_groups: usize,
    pub total_resolved_entities: usize,
    pub representatives: Vec<String>,
    pub resolution_mapping: BTreeMap<String, Vec<String>>,
    pub blocked_pairs: Vec<(String, String)>,
    pub threshold: f32,
    pub dry_run: bool,
    pub passes: usize,
    pub edges: RedirectStats,
    pub skipped_items: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub aborted: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl ResolutionAudit {
    fn new(threshold: f32, dry_run: bool) -> Self {
        Self {
            resolved_groups: 0,
            total_resolved_entities: 0,
            representatives: Vec::new(),
            resolution_mapping: BTreeMap::new(),
            blocked_pairs: Vec::new(),
            threshold,
            dry_run,
            passes: 0,
            edges: RedirectStats::default(),
            skipped_items: 0,
            aborted: None,
            completed_at: Utc::now(),
        }
    }

    fn aborted(threshold: f32, dry_run: bool, reason: String) -> Self {
        Self {
            aborted: Some(reason),
            ..Self::new(threshold, dry_run)
        }
    }

    fn record_groups(&mut self, groups: &[ResolutionGroup]) {
        self.resolved_groups = groups.len();
        self.total_resolved_entities = groups.iter().map(|g| g.members.len()).sum();
        self.representatives = groups.iter().map(|g| g.representative.clone()).collect();
        self.resolution_mapping = groups
            .iter()
            .map(|g| (g.representative.clone(), g.members.clone()))
            .collect();
    }

    /// Groups in representative order, rebuilt from the mapping.
    pub fn groups(&self) -> Vec<ResolutionGroup> {
        self.representatives
            .iter()
            .filter_map(|rep| {
                self.resolution_mapping.get(rep).map(|members| ResolutionGroup {
                    representative: rep.clone(),
                    members: members.clone(),
                })
            })
            .collect()
    }

    /// Group that contains `id`, if it was merged.
    pub fn group_of(&self, id: &str) -> Option<&str> {
        self.resolution_mapping
            .iter()
            .find(|(_, members)| members.iter().any(|m| m == id))
            .map(|(rep, _)| rep.as_str())
    }
}

struct Candidate {
    id: String,
    normalized: String,
    explicit: bool,
    degree: usize,
}

/// Per-run state: the normalized labels absorbed into each surviving node.
struct Clusters {
    labels: HashMap<String, Vec<String>>,
}

impl Clusters {
    fn new() -> Self {
        Self {
            labels: HashMap::new(),
        }
    }

    fn labels_of<'a>(&'a self, candidate: &'a Candidate) -> &'a [String] {
        self.labels
            .get(&candidate.id)
            .map(|v| v.as_slice())
            .unwrap_or(std::slice::from_ref(&candidate.normalized))
    }

    fn absorb(&mut self, representative: &Candidate, member: &Candidate) {
        let member_labels = self
            .labels
            .remove(&member.id)
            .unwrap_or_else(|| vec![member.normalized.clone()]);
        let entry = self
            .labels
            .entry(representative.id.clone())
            .or_insert_with(|| vec![representative.normalized.clone()]);
        for label in member_labels {
            if !entry.contains(&label) {
                entry.push(label);
            }
        }
    }
}

pub struct EntityResolver {
    blocked: BlockedPairs,
    max_passes: usize,
    budget: Option<Duration>,
}

impl Default for EntityResolver {
    fn default() -> Self {
        Self::new(BlockedPairs::default())
    }
}

impl EntityResolver {
    pub fn new(blocked: BlockedPairs) -> Self {
        Self {
            blocked,
            max_passes: DEFAULT_MAX_PASSES,
            budget: None,
        }
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    /// Wall-clock budget for the pairwise comparison phase of a run.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn blocked_pairs(&self) -> &BlockedPairs {
        &self.blocked
    }

    /// Deduplicates near-identical nodes.
    ///
    /// Never fails: when the run aborts, the untouched input graph is
    /// returned with `audit.aborted` set. A dry run only plans one pass and
    /// leaves the graph as it was.
    pub fn resolve(
        &self,
        graph: GraphStore,
        threshold: f32,
        dry_run: bool,
    ) -> (GraphStore, ResolutionAudit) {
        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            threshold,
            dry_run,
            "Entity resolution started"
        );

        if dry_run {
            let audit = match self.plan(&graph, threshold) {
                Ok(audit) => audit,
                Err(e) => {
                    tracing::error!(error = %e, "Entity resolution preview failed");
                    ResolutionAudit::aborted(threshold, true, e.to_string())
                }
            };
            return (graph, audit);
        }

        let mut working = graph.clone();
        match self.run(&mut working, threshold) {
            Ok(audit) => {
                tracing::info!(
                    groups = audit.resolved_groups,
                    merged = audit.total_resolved_entities,
                    passes = audit.passes,
                    nodes = working.node_count(),
                    edges = working.edge_count(),
                    "Entity resolution complete"
                );
                (working, audit)
            }
            Err(e) => {
                tracing::error!(error = %e, "Entity resolution aborted, keeping original graph");
                (graph, ResolutionAudit::aborted(threshold, false, e.to_string()))
            }
        }
    }

    fn validate_threshold(threshold: f32) -> Result<()> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(AppError::invalid_value(
                "threshold",
                threshold,
                "must be a number in [0, 1]",
            ));
        }
        Ok(())
    }

    fn plan(&self, graph: &GraphStore, threshold: f32) -> Result<ResolutionAudit> {
        Self::validate_threshold(threshold)?;
        let deadline = self.deadline();
        let mut audit = ResolutionAudit::new(threshold, true);
        let groups = self.group_pass(graph, threshold, &Clusters::new(), &deadline, &mut audit);
        audit.passes = 1;
        audit.record_groups(&groups);
        audit.completed_at = Utc::now();
        Ok(audit)
    }

    fn run(&self, graph: &mut GraphStore, threshold: f32) -> Result<ResolutionAudit> {
        Self::validate_threshold(threshold)?;
        let deadline = self.deadline();
        let mut audit = ResolutionAudit::new(threshold, false);
        let mut clusters = Clusters::new();
        let mut merged: Vec<ResolutionGroup> = Vec::new();

        for pass in 1..=self.max_passes {
            let groups = self.group_pass(graph, threshold, &clusters, &deadline, &mut audit);
            if groups.is_empty() {
                break;
            }
            audit.passes = pass;
            tracing::debug!(pass, groups = groups.len(), "Merging resolution groups");
            for group in &groups {
                self.apply_group(graph, group, &mut clusters, &mut merged, &mut audit)?;
            }
            if deadline.expired() {
                tracing::warn!(pass, "Entity resolution deadline reached, stopping early");
                break;
            }
        }

        audit.record_groups(&merged);
        audit.completed_at = Utc::now();
        Ok(audit)
    }

    fn deadline(&self) -> Deadline {
        self.budget.map(Deadline::after).unwrap_or_default()
    }

    fn candidates(graph: &GraphStore) -> Vec<(BucketKey, Vec<Candidate>)> {
        let mut order: Vec<(BucketKey, Vec<Candidate>)> = Vec::new();
        let mut slots: HashMap<BucketKey, usize> = HashMap::new();
        for node in graph.nodes() {
            let key = BucketKey::of(node);
            let slot = *slots.entry(key.clone()).or_insert_with(|| {
                order.push((key, Vec::new()));
                order.len() - 1
            });
            order[slot].1.push(Candidate {
                id: node.id.clone(),
                normalized: normalize_label(node.label()),
                explicit: node.has_explicit_identity(),
                degree: graph.degree(&node.id),
            });
        }
        order
    }

    fn blocked_between(&self, clusters: &Clusters, a: &Candidate, b: &Candidate) -> bool {
        if self.blocked.is_empty() {
            return false;
        }
        let labels_a = clusters.labels_of(a);
        let labels_b = clusters.labels_of(b);
        labels_a
            .iter()
            .any(|la| labels_b.iter().any(|lb| self.blocked.is_blocked_normalized(la, lb)))
    }

    /// One grouping sweep: first-seen seeds absorb later similar nodes of the same bucket.
    fn group_pass(
        &self,
        graph: &GraphStore,
        threshold: f32,
        clusters: &Clusters,
        deadline: &Deadline,
        audit: &mut ResolutionAudit,
    ) -> Vec<ResolutionGroup> {
        let mut groups = Vec::new();

        'buckets: for (bucket, candidates) in Self::candidates(graph) {
            let mut processed = vec![false; candidates.len()];
            for i in 0..candidates.len() {
                if processed[i] {
                    continue;
                }
                processed[i] = true;
                let seed = &candidates[i];
                if seed.normalized.is_empty() {
                    continue;
                }

                let mut members: Vec<usize> = vec![i];
                for j in (i + 1)..candidates.len() {
                    if processed[j] {
                        continue;
                    }
                    if deadline.expired() {
                        tracing::warn!(
                            kind = %bucket.kind,
                            namespace = %bucket.namespace,
                            "Resolution deadline reached during comparison, keeping partial groups"
                        );
                        if members.len() > 1 {
                            groups.push(Self::make_group(&candidates, &members));
                        }
                        break 'buckets;
                    }
                    let other = &candidates[j];
                    if let Some(&blocker) = members
                        .iter()
                        .find(|&&m| self.blocked_between(clusters, &candidates[m], other))
                    {
                        let pair = (candidates[blocker].id.clone(), other.id.clone());
                        tracing::debug!(a = %pair.0, b = %pair.1, "Blocked pair skipped");
                        if !audit.blocked_pairs.contains(&pair) {
                            audit.blocked_pairs.push(pair);
                        }
                        continue;
                    }
                    if normalized_similarity(&seed.normalized, &other.normalized) >= threshold {
                        members.push(j);
                        processed[j] = true;
                    }
                }

                if members.len() > 1 {
                    groups.push(Self::make_group(&candidates, &members));
                }
            }
        }

        groups
    }

    /// Prefers explicit identity, then higher degree; ties go to the earliest member.
    fn make_group(candidates: &[Candidate], members: &[usize]) -> ResolutionGroup {
        let mut best = members[0];
        for &m in &members[1..] {
            let challenger = (candidates[m].explicit, candidates[m].degree);
            let current = (candidates[best].explicit, candidates[best].degree);
            if challenger > current {
                best = m;
            }
        }
        ResolutionGroup {
            representative: candidates[best].id.clone(),
            members: members.iter().map(|&m| candidates[m].id.clone()).collect(),
        }
    }

    fn apply_group(
        &self,
        graph: &mut GraphStore,
        group: &ResolutionGroup,
        clusters: &mut Clusters,
        merged: &mut Vec<ResolutionGroup>,
        audit: &mut ResolutionAudit,
    ) -> Result<()> {
        let rep_id = group.representative.as_str();
        let rep_candidate = match graph.node(rep_id) {
            Some(node) => Self::label_only(node),
            None => return Err(AppError::NodeNotFound(rep_id.to_string())),
        };

        let mut prior_rep = take_group(merged, rep_id);
        let mut collected: Vec<String> = Vec::new();

        for member_id in &group.members {
            if member_id == rep_id {
                let own = prior_rep.take().unwrap_or_else(|| vec![rep_id.to_string()]);
                extend_unique(&mut collected, own);
                continue;
            }
            let Some(member) = graph.node(member_id) else {
                audit.skipped_items += 1;
                tracing::warn!(member = %member_id, "Group member vanished before merge, skipping");
                continue;
            };
            let member_attrs = member.attributes.clone();
            let member_candidate = Self::label_only(member);

            let rep_node = graph
                .node_mut(rep_id)
                .ok_or_else(|| AppError::NodeNotFound(rep_id.to_string()))?;
            merge_attributes(&mut rep_node.attributes, &member_attrs);

            match graph.redirect_edges(member_id, rep_id) {
                Ok(stats) => audit.edges.absorb(stats),
                Err(e) => {
                    audit.skipped_items += 1;
                    tracing::warn!(member = %member_id, error = %e, "Edge redirection failed, skipping member");
                    continue;
                }
            }
            clusters.absorb(&rep_candidate, &member_candidate);

            let absorbed = take_group(merged, member_id).unwrap_or_else(|| vec![member_id.clone()]);
            extend_unique(&mut collected, absorbed);
        }

        if let Some(own) = prior_rep {
            extend_unique(&mut collected, own);
        }
        if collected.len() > 1 {
            merged.push(ResolutionGroup {
                representative: rep_id.to_string(),
                members: collected,
            });
        }
        Ok(())
    }

    fn label_only(node: &crate::types::Node) -> Candidate {
        Candidate {
            id: node.id.clone(),
            normalized: normalize_label(node.label()),
            explicit: false,
            degree: 0,
        }
    }
}

fn take_group(merged: &mut Vec<ResolutionGroup>, representative: &str) -> Option<Vec<String>> {
    merged
        .iter()
        .position(|g| g.representative == representative)
        .map(|slot| merged.remove(slot).members)
}

fn extend_unique(into: &mut Vec<String>, ids: Vec<String>) {
    for id in ids {
        if !into.contains(&id) {
            into.push(id);
        }
    }
}
