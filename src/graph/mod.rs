//! Graph store, construction and import.
//!
//! - `store`: labeled graph with directed/multi capability flags
//! - `builder`: entity/relationship records to store
//! - `import`: tab-separated triple files

pub mod builder;
pub mod import;
pub mod store;

pub use builder::{build_graph, BuildReport, GraphBuilder};
pub use import::{load_triples, parse_triples, ImportReport};
pub use store::{EdgeInsert, GraphKind, GraphStats, GraphStore, Projection, RedirectStats};
