pub mod error;
pub mod node;
pub mod retrieval;
pub mod search;

pub use error::{AppError, Result};
pub use node::{
    Attributes, Edge, EntityRecord, GraphInput, Node, RelationRecord, SCOPE_SEPARATOR,
    UNKNOWN_TYPE,
};
pub use retrieval::{
    CommunityInfo, NodeSource, QueryAnalysis, RetrievalOutput, RetrievalRequest,
    RetrievalResponse, RetrievedEdge, RetrievedNode, SimilarityScore,
};
pub use search::{
    EntityCandidate, HybridSearchRequest, RankedResult, RelationCandidate, ScoredEntity,
};
