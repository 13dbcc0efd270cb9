//! Graph data model and providers.
//!
//! Defines the symbol/edge snapshots the engine reads, the provider
//! trait that supplies them, and an in-memory provider.

pub mod memory;
pub mod provider;
pub mod types;

pub use memory::{GraphSnapshot, GraphStats, MemoryGraph};
pub use provider::GraphProvider;
pub use types::{
    ApiCallMeta, CrossStackEdge, Dependency, EdgeKind, EdgeKindFilter, EdgePair, NodeKind, Symbol,
    SymbolDisplay, SymbolId, SymbolSummary,
};
