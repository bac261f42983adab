//! Search backend contract and the bundled in-memory implementation.

pub mod cache;
pub mod memory;
pub mod traits;

pub use cache::{CacheStats, TypeSampleCache, TypeSamples};
pub use memory::MemoryBackend;
pub use traits::SearchBackend;
