//! Query intent routing and fusion ranking.

pub mod fusion;
pub mod intent;
pub mod lock;
pub mod relations;

pub use fusion::{merge_candidates, rank_entities, FusionWeights};
pub use intent::{IntentKind, IntentRouter, IntentRule, QueryIntent, RESEMBLANCE_CODES};
pub use lock::{mentions_disease, CoreEntityLock};
pub use relations::filter_relations;
