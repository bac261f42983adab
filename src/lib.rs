pub mod config;
pub mod graph;
pub mod ranking;
pub mod resolution;
pub mod retrieval;
pub mod service;
pub mod storage;
pub mod types;

#[cfg(test)]
pub mod test_utils;

pub use config::AppConfig;
pub use service::GraphRagService;
pub use types::error::{AppError, Result};
