use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Graph not loaded")]
    GraphNotLoaded,

    #[error("Unknown config key: {0}")]
    UnknownConfigKey(String),

    #[error("Invalid value {value:?} for config key {key}: {reason}")]
    InvalidConfigValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Retrieval strategy disabled: {0}")]
    StrategyDisabled(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid edge: {0}")]
    InvalidEdge(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("Search backend error: {0}")]
    Backend(String),

    #[error("Search backend exceeded its deadline of {0} ms")]
    BackendTimeout(u64),

    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn invalid_value(key: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        AppError::InvalidConfigValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}
