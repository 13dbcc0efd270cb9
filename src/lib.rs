//! # depgraph
//!
//! Transitive dependency analysis over a code symbol graph.
//!
//! The engine reads symbols and their relationships (calls, imports,
//! cross-stack API calls, shared schemas) from a [`GraphProvider`] and
//! answers structural questions about them.
//!
//! ## Key Features
//!
//! - **Bounded traversal**: callers or dependencies up to a depth ceiling, cycle-safe
//! - **Path search**: shortest path and all simple paths between two symbols
//! - **Call chains**: readable renderings such as `main() → [POST /api/users] → store()`
//! - **Importance**: composite centrality and semantic ranking of symbols
//! - **Cross-stack impact**: what a change affects across frontend/backend boundaries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use depgraph::{Analyzer, EdgeKind, MemoryGraph, NodeKind, Symbol, TraversalOptions};
//! use std::sync::Arc;
//!
//! # async fn run() -> depgraph::Result<()> {
//! let mut graph = MemoryGraph::new();
//! graph.add_symbol(Symbol::new(1, "main", NodeKind::Function, "src/main.ts"));
//! graph.add_symbol(Symbol::new(2, "login", NodeKind::Function, "src/auth.ts"));
//! graph.connect(1, 2, EdgeKind::Calls)?;
//!
//! let analyzer = Analyzer::new(Arc::new(graph));
//! let report = analyzer
//!     .transitive_dependencies(1, &TraversalOptions::new().with_max_depth(5))
//!     .await?;
//! // Returns: every reachable symbol with its path and depth
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod graph;

// Re-exports for convenience
pub use error::{AnalysisError, Result};

pub use analysis::{
    Analyzer, CacheStats, CrossStackRelationship, ImpactReport, ImportanceBreakdown,
    ImportanceQuery, PathResult, RankedSymbol, RelationDirection, TraversalDirection,
    TraversalReport, TraversalResult,
};
pub use config::{
    CancellationFlag, CrossStackAncestry, EngineConfig, ImpactOptions, ImportanceWeights,
    PathOptions, TraversalOptions, MAX_DEPTH_CEILING,
};
pub use graph::{
    CrossStackEdge, Dependency, EdgeKind, EdgeKindFilter, GraphProvider, MemoryGraph, NodeKind,
    Symbol, SymbolId,
};
