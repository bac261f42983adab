//! Search backend trait definition
//!
//! The document store behind ranked search exposes one generic hybrid
//! keyword+vector call per record kind. Implemented by MemoryBackend.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::types::{EntityCandidate, HybridSearchRequest, RelationCandidate};
use crate::Result;

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Entities matching the request text or keywords, best first.
    /// Non-empty `entity_types`/`namespaces` restrict the pool.
    async fn search_entities(&self, request: &HybridSearchRequest) -> Result<Vec<EntityCandidate>>;

    /// Entities of the requested types ranked by importance; text is ignored.
    async fn entities_by_type(&self, request: &HybridSearchRequest) -> Result<Vec<EntityCandidate>>;

    /// Relations whose endpoints or label match the request text, best first.
    async fn search_relations(&self, request: &HybridSearchRequest) -> Result<Vec<RelationCandidate>>;

    /// A few example entity names per entity type, for the given namespaces
    /// (all namespaces when empty).
    async fn entity_type_samples(&self, namespaces: &[String]) -> Result<BTreeMap<String, Vec<String>>>;
}
