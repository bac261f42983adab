use std::path::PathBuf;

use crate::graph::GraphKind;
use crate::resolution::DEFAULT_THRESHOLD;

/// Process-level settings, read from flags or the environment.
#[derive(Debug, Clone, clap::Args)]
pub struct AppConfig {
    /// Graph file: JSON entity/relation records, or tab-separated triples
    #[arg(long, env = "GRAPH_PATH")]
    pub graph: Option<PathBuf>,

    #[arg(long, env = "GRAPH_DIRECTED")]
    pub directed: bool,

    /// Allow parallel edges between the same endpoints
    #[arg(long, env = "GRAPH_MULTI")]
    pub multi: bool,

    #[arg(long, env, default_value_t = DEFAULT_THRESHOLD)]
    pub resolution_threshold: f32,

    /// Per-strategy wall-clock budget in milliseconds. 0 = unbounded.
    #[arg(long, env = "DEADLINE_MS", default_value = "2000")]
    pub deadline_ms: u64,

    #[arg(long, env = "BACKEND_TIMEOUT_MS", default_value = "5000")]
    pub backend_timeout_ms: u64,

    /// Entries kept in the entity-type sample cache
    #[arg(long, env, default_value = "64")]
    pub cache_capacity: usize,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            graph: None,
            directed: false,
            multi: false,
            resolution_threshold: DEFAULT_THRESHOLD,
            deadline_ms: 2000,
            backend_timeout_ms: 5000,
            cache_capacity: 64,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn graph_kind(&self) -> GraphKind {
        GraphKind {
            directed: self.directed,
            multi: self.multi,
        }
    }
}
