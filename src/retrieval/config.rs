use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Deadline;
use crate::ranking::FusionWeights;
use crate::types::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalAlgorithm {
    Bfs,
    Dfs,
    Pagerank,
    CommunityDetection,
    SemanticSimilarity,
    NHop,
    Hybrid,
}

impl RetrievalAlgorithm {
    pub const ALL: [RetrievalAlgorithm; 7] = [
        Self::Bfs,
        Self::Dfs,
        Self::Pagerank,
        Self::CommunityDetection,
        Self::SemanticSimilarity,
        Self::NHop,
        Self::Hybrid,
    ];
}

impl std::str::FromStr for RetrievalAlgorithm {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bfs" => Ok(Self::Bfs),
            "dfs" => Ok(Self::Dfs),
            "pagerank" => Ok(Self::Pagerank),
            "community_detection" => Ok(Self::CommunityDetection),
            "semantic_similarity" => Ok(Self::SemanticSimilarity),
            "n_hop" => Ok(Self::NHop),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(AppError::invalid_value(
                "retrieval_algorithm",
                s,
                "expected one of bfs, dfs, pagerank, community_detection, semantic_similarity, n_hop, hybrid",
            )),
        }
    }
}

impl std::fmt::Display for RetrievalAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bfs => write!(f, "bfs"),
            Self::Dfs => write!(f, "dfs"),
            Self::Pagerank => write!(f, "pagerank"),
            Self::CommunityDetection => write!(f, "community_detection"),
            Self::SemanticSimilarity => write!(f, "semantic_similarity"),
            Self::NHop => write!(f, "n_hop"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunityMethod {
    Louvain,
    LabelPropagation,
}

impl std::str::FromStr for CommunityMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "louvain" => Ok(Self::Louvain),
            "label_propagation" => Ok(Self::LabelPropagation),
            _ => Err(AppError::invalid_value(
                "community_detection_method",
                s,
                "expected one of louvain, label_propagation",
            )),
        }
    }
}

impl std::fmt::Display for CommunityMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Louvain => write!(f, "louvain"),
            Self::LabelPropagation => write!(f, "label_propagation"),
        }
    }
}

/// Query-level retrieval settings. Fields are crate-private; outside the crate
/// every change goes through [`RetrievalConfig::set`] and is validated there.
///
/// ```compile_fail
/// let mut config = kg_retrieval::retrieval::RetrievalConfig::default();
/// config.max_nodes = 0;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalConfig {
    pub(crate) retrieval_algorithm: RetrievalAlgorithm,
    pub(crate) community_detection_method: CommunityMethod,
    pub(crate) max_depth: usize,
    pub(crate) max_nodes: usize,
    pub(crate) max_edges: usize,
    pub(crate) similarity_threshold: f32,
    pub(crate) pagerank_alpha: f32,
    pub(crate) community_resolution: f32,
    pub(crate) enable_semantic_search: bool,
    pub(crate) enable_community_detection: bool,
    pub(crate) enable_n_hop_search: bool,
    /// Per-strategy wall-clock budget; 0 disables it.
    pub(crate) deadline_ms: u64,
    pub(crate) ent_topn: usize,
    pub(crate) rel_topn: usize,
    #[serde(flatten)]
    pub(crate) weights: FusionWeights,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            retrieval_algorithm: RetrievalAlgorithm::Hybrid,
            community_detection_method: CommunityMethod::Louvain,
            max_depth: 3,
            max_nodes: 20,
            max_edges: 40,
            similarity_threshold: 0.3,
            pagerank_alpha: 0.85,
            community_resolution: 1.0,
            enable_semantic_search: true,
            enable_community_detection: true,
            enable_n_hop_search: true,
            deadline_ms: 2000,
            ent_topn: 6,
            rel_topn: 6,
            weights: FusionWeights::default(),
        }
    }
}

impl RetrievalConfig {
    pub const KEYS: [&'static str; 18] = [
        "retrieval_algorithm",
        "community_detection_method",
        "max_depth",
        "max_nodes",
        "max_edges",
        "similarity_threshold",
        "pagerank_alpha",
        "community_resolution",
        "enable_semantic_search",
        "enable_community_detection",
        "enable_n_hop_search",
        "deadline_ms",
        "ent_topn",
        "rel_topn",
        "alpha",
        "beta",
        "gamma",
        "hub_penalty",
    ];

    /// Validated setter. On error the config is left unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut next = self.clone();
        match key {
            "retrieval_algorithm" => next.retrieval_algorithm = value.parse()?,
            "community_detection_method" => next.community_detection_method = value.parse()?,
            "max_depth" => next.max_depth = parse_value(key, value)?,
            "max_nodes" => next.max_nodes = parse_value(key, value)?,
            "max_edges" => next.max_edges = parse_value(key, value)?,
            "similarity_threshold" => next.similarity_threshold = parse_value(key, value)?,
            "pagerank_alpha" => next.pagerank_alpha = parse_value(key, value)?,
            "community_resolution" => next.community_resolution = parse_value(key, value)?,
            "enable_semantic_search" => next.enable_semantic_search = parse_bool(key, value)?,
            "enable_community_detection" => {
                next.enable_community_detection = parse_bool(key, value)?
            }
            "enable_n_hop_search" => next.enable_n_hop_search = parse_bool(key, value)?,
            "deadline_ms" => next.deadline_ms = parse_value(key, value)?,
            "ent_topn" => next.ent_topn = parse_value(key, value)?,
            "rel_topn" => next.rel_topn = parse_value(key, value)?,
            "alpha" => next.weights.alpha = parse_value(key, value)?,
            "beta" => next.weights.beta = parse_value(key, value)?,
            "gamma" => next.weights.gamma = parse_value(key, value)?,
            "hub_penalty" => next.weights.hub_penalty = parse_value(key, value)?,
            _ => return Err(AppError::UnknownConfigKey(key.to_string())),
        }
        next.validate()?;
        *self = next;
        tracing::debug!(key, value, "Retrieval config updated");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "retrieval_algorithm" => self.retrieval_algorithm.to_string(),
            "community_detection_method" => self.community_detection_method.to_string(),
            "max_depth" => self.max_depth.to_string(),
            "max_nodes" => self.max_nodes.to_string(),
            "max_edges" => self.max_edges.to_string(),
            "similarity_threshold" => self.similarity_threshold.to_string(),
            "pagerank_alpha" => self.pagerank_alpha.to_string(),
            "community_resolution" => self.community_resolution.to_string(),
            "enable_semantic_search" => self.enable_semantic_search.to_string(),
            "enable_community_detection" => self.enable_community_detection.to_string(),
            "enable_n_hop_search" => self.enable_n_hop_search.to_string(),
            "deadline_ms" => self.deadline_ms.to_string(),
            "ent_topn" => self.ent_topn.to_string(),
            "rel_topn" => self.rel_topn.to_string(),
            "alpha" => self.weights.alpha.to_string(),
            "beta" => self.weights.beta.to_string(),
            "gamma" => self.weights.gamma.to_string(),
            "hub_penalty" => self.weights.hub_penalty.to_string(),
            _ => return Err(AppError::UnknownConfigKey(key.to_string())),
        };
        Ok(value)
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        Self::KEYS
            .iter()
            .filter_map(|key| self.get(key).ok().map(|v| (key.to_string(), v)))
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(AppError::invalid_value("max_depth", self.max_depth, "must be at least 1"));
        }
        if self.max_nodes == 0 {
            return Err(AppError::invalid_value("max_nodes", self.max_nodes, "must be at least 1"));
        }
        unit_interval("similarity_threshold", self.similarity_threshold)?;
        if !self.pagerank_alpha.is_finite() || self.pagerank_alpha <= 0.0 || self.pagerank_alpha >= 1.0 {
            return Err(AppError::invalid_value(
                "pagerank_alpha",
                self.pagerank_alpha,
                "must be strictly between 0 and 1",
            ));
        }
        if !self.community_resolution.is_finite() || self.community_resolution <= 0.0 {
            return Err(AppError::invalid_value(
                "community_resolution",
                self.community_resolution,
                "must be positive",
            ));
        }
        for (key, value) in [
            ("alpha", self.weights.alpha),
            ("beta", self.weights.beta),
            ("gamma", self.weights.gamma),
            ("hub_penalty", self.weights.hub_penalty),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::invalid_value(key, value, "must be a non-negative number"));
            }
        }
        Ok(())
    }

    /// Rejects strategies switched off by a feature toggle.
    pub fn ensure_enabled(&self, algorithm: RetrievalAlgorithm) -> Result<()> {
        let enabled = match algorithm {
            RetrievalAlgorithm::SemanticSimilarity => self.enable_semantic_search,
            RetrievalAlgorithm::CommunityDetection => self.enable_community_detection,
            RetrievalAlgorithm::NHop => self.enable_n_hop_search,
            _ => true,
        };
        if enabled {
            Ok(())
        } else {
            Err(AppError::StrategyDisabled(algorithm.to_string()))
        }
    }

    pub fn deadline(&self) -> Deadline {
        Deadline::from_millis(self.deadline_ms)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::invalid_value(key, value, "not a valid number"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(AppError::invalid_value(key, value, "expected true or false")),
    }
}

fn unit_interval(key: &str, value: f32) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AppError::invalid_value(key, value, "must be in [0, 1]"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RetrievalConfig::default();
        assert_eq!(config.retrieval_algorithm, RetrievalAlgorithm::Hybrid);
        assert_eq!(config.community_detection_method, CommunityMethod::Louvain);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.max_nodes, 20);
        assert_eq!(config.max_edges, 40);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_algorithm_names_round_trip() {
        for algorithm in RetrievalAlgorithm::ALL {
            let parsed: RetrievalAlgorithm = algorithm.to_string().parse().unwrap();
            assert_eq!(parsed, algorithm);
        }
        assert!("page_rank".parse::<RetrievalAlgorithm>().is_err());
    }

    #[test]
    fn test_set_rejects_unknown_key() {
        let mut config = RetrievalConfig::default();
        let err = config.set("max_width", "3").unwrap_err();
        assert!(matches!(err, AppError::UnknownConfigKey(k) if k == "max_width"));
    }

    #[test]
    fn test_set_rejects_bad_enum_and_keeps_old_value() {
        let mut config = RetrievalConfig::default();
        let err = config.set("retrieval_algorithm", "dijkstra").unwrap_err();
        assert!(matches!(err, AppError::InvalidConfigValue { ref key, .. } if key == "retrieval_algorithm"));
        assert_eq!(config.retrieval_algorithm, RetrievalAlgorithm::Hybrid);

        assert!(config.set("community_detection_method", "girvan_newman").is_err());
        assert_eq!(config.community_detection_method, CommunityMethod::Louvain);
    }

    #[test]
    fn test_set_validates_ranges() {
        let mut config = RetrievalConfig::default();
        assert!(config.set("max_depth", "0").is_err());
        assert!(config.set("similarity_threshold", "1.5").is_err());
        assert!(config.set("pagerank_alpha", "1").is_err());
        assert!(config.set("community_resolution", "-2").is_err());
        assert!(config.set("alpha", "NaN").is_err());
        assert!(config.set("max_nodes", "ten").is_err());
        assert_eq!(config, RetrievalConfig::default());

        config.set("retrieval_algorithm", "n_hop").unwrap();
        config.set("max_depth", "2").unwrap();
        config.set("enable_semantic_search", "false").unwrap();
        config.set("beta", "0.5").unwrap();
        assert_eq!(config.retrieval_algorithm, RetrievalAlgorithm::NHop);
        assert_eq!(config.max_depth, 2);
        assert!(!config.enable_semantic_search);
        assert_eq!(config.weights.beta, 0.5);
    }

    #[test]
    fn test_snapshot_covers_every_key() {
        let snapshot = RetrievalConfig::default().snapshot();
        assert_eq!(snapshot.len(), RetrievalConfig::KEYS.len());
        assert_eq!(snapshot["retrieval_algorithm"], "hybrid");
        assert_eq!(snapshot["alpha"], "0.45");
        assert_eq!(snapshot["enable_n_hop_search"], "true");
    }

    #[test]
    fn test_toggles_gate_strategies() {
        let mut config = RetrievalConfig::default();
        config.set("enable_community_detection", "false").unwrap();
        assert!(matches!(
            config.ensure_enabled(RetrievalAlgorithm::CommunityDetection),
            Err(AppError::StrategyDisabled(_))
        ));
        assert!(config.ensure_enabled(RetrievalAlgorithm::Bfs).is_ok());
    }
}
