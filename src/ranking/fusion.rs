//! Fusion ranking of backend entity candidates.
//!
//! score = alpha·similarity + beta·pagerank + gamma·schema_boost
//!         − hub_penalty·ln(1 + neighbor_count), plus 1.0 for the locked core entity.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::lock::{mentions_disease, CoreEntityLock};
use crate::resolution::normalize_label;
use crate::types::{EntityCandidate, ScoredEntity};

pub const DEFAULT_ALPHA: f32 = 0.45;
pub const DEFAULT_BETA: f32 = 0.35;
pub const DEFAULT_GAMMA: f32 = 0.20;
pub const DEFAULT_HUB_PENALTY: f32 = 0.10;

pub const LOCK_BONUS: f32 = 1.0;
pub const NAME_IN_QUERY_BOOST: f32 = 0.2;
pub const DISEASE_GENE_BOOST: f32 = 0.15;
pub const PATHWAY_BOOST: f32 = 0.1;

pub const PATHWAY_KEYWORDS: &[&str] = &["pathway", "process", "signaling", "signalling", "cascade", "metabolic"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
    pub hub_penalty: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
            gamma: DEFAULT_GAMMA,
            hub_penalty: DEFAULT_HUB_PENALTY,
        }
    }
}

/// Query-side flags computed once per ranking call.
struct QuerySignals {
    normalized: String,
    disease: bool,
    pathway: bool,
}

impl QuerySignals {
    fn new(query: &str) -> Self {
        let lowered = query.to_lowercase();
        Self {
            normalized: normalize_label(query),
            disease: mentions_disease(query),
            pathway: PATHWAY_KEYWORDS.iter().any(|k| lowered.contains(k)),
        }
    }
}

fn schema_boost(signals: &QuerySignals, lock: &CoreEntityLock, candidate: &EntityCandidate) -> f32 {
    let mut boost = 0.0;
    let name = normalize_label(&candidate.name);
    if !name.is_empty() && signals.normalized.contains(name.as_str()) {
        boost += NAME_IN_QUERY_BOOST;
    }
    if signals.disease && lock.is_gene_like(&candidate.name) {
        boost += DISEASE_GENE_BOOST;
    }
    if signals.pathway {
        boost += PATHWAY_BOOST;
    }
    boost
}

/// Scores and orders candidates, keeping the best `top_n`.
///
/// Candidates with an empty name or a non-finite signal are dropped with a
/// warning. When `core` is set and misses the cut, it replaces the
/// lowest-ranked entry.
pub fn rank_entities(
    candidates: &[EntityCandidate],
    query: &str,
    weights: &FusionWeights,
    lock: &CoreEntityLock,
    core: Option<&str>,
    top_n: usize,
) -> Vec<ScoredEntity> {
    if top_n == 0 {
        return Vec::new();
    }
    let signals = QuerySignals::new(query);

    let mut scored: Vec<ScoredEntity> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate.name.trim().is_empty()
            || !candidate.similarity.is_finite()
            || !candidate.pagerank.is_finite()
        {
            tracing::warn!(
                name = %candidate.name,
                similarity = candidate.similarity,
                pagerank = candidate.pagerank,
                "Skipping malformed entity candidate"
            );
            continue;
        }

        let boost = schema_boost(&signals, lock, candidate);
        let hub = weights.hub_penalty * (1.0 + candidate.neighbor_count() as f32).ln();
        let locked = core.is_some_and(|c| candidate.name.eq_ignore_ascii_case(c));
        let mut score = weights.alpha * candidate.similarity
            + weights.beta * candidate.pagerank
            + weights.gamma * boost
            - hub;
        if locked {
            score += LOCK_BONUS;
        }

        scored.push(ScoredEntity {
            name: candidate.name.clone(),
            entity_type: candidate.entity_type.clone(),
            score,
            similarity: candidate.similarity,
            pagerank: candidate.pagerank,
            schema_boost: boost,
            hub_penalty: hub,
            locked,
            description: candidate.description.clone(),
        });
    }

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let locked_entry = scored
        .iter()
        .position(|e| e.locked)
        .filter(|&pos| pos >= top_n)
        .map(|pos| scored.remove(pos));
    scored.truncate(top_n);
    if let Some(entry) = locked_entry {
        if scored.len() == top_n {
            if let Some(evicted) = scored.pop() {
                tracing::debug!(evicted = %evicted.name, core = %entry.name, "Core entity forced into results");
            }
        }
        scored.push(entry);
    }

    scored
}

/// Unions keyword- and type-matched candidates by case-insensitive name,
/// keeping the higher similarity and the richer metadata.
pub fn merge_candidates(
    by_keywords: Vec<EntityCandidate>,
    by_types: Vec<EntityCandidate>,
) -> Vec<EntityCandidate> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<EntityCandidate> = Vec::new();
    for candidate in by_keywords.into_iter().chain(by_types) {
        let key = candidate.name.to_lowercase();
        match slots.get(&key) {
            Some(&slot) => {
                let existing = &mut merged[slot];
                existing.similarity = existing.similarity.max(candidate.similarity);
                existing.pagerank = existing.pagerank.max(candidate.pagerank);
                if existing.neighbors.is_empty() {
                    existing.neighbors = candidate.neighbors;
                }
                if existing.entity_type.is_empty() {
                    existing.entity_type = candidate.entity_type;
                }
            }
            None => {
                slots.insert(key, merged.len());
                merged.push(candidate);
            }
        }
    }
    merged
}
