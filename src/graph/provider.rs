//! The data-provider seam between the engine and a graph store.

use async_trait::async_trait;
use std::collections::HashMap;

use super::types::{
    ApiCallMeta, CrossStackEdge, Dependency, EdgeKindFilter, EdgePair, SymbolDisplay, SymbolId,
};
use crate::error::Result;

/// Read access to a symbol graph.
///
/// Implementations return edges in a stable order; the engine's tie-breaking
/// (shortest path) and result ordering follow that order. Batched lookups
/// omit ids or pairs they cannot resolve instead of failing.
#[async_trait]
pub trait GraphProvider: Send + Sync {
    /// Edges pointing at `id` (who calls or depends on it).
    async fn direct_dependents(
        &self,
        id: SymbolId,
        filter: &EdgeKindFilter,
    ) -> Result<Vec<Dependency>>;

    /// Edges leaving `id` (what it calls or depends on).
    async fn direct_dependencies(
        &self,
        id: SymbolId,
        filter: &EdgeKindFilter,
    ) -> Result<Vec<Dependency>>;

    /// Cross-stack edges incident to `id`, in either direction.
    async fn cross_stack_edges(&self, id: SymbolId) -> Result<Vec<CrossStackEdge>>;

    async fn symbol_display_info(
        &self,
        ids: &[SymbolId],
    ) -> Result<HashMap<SymbolId, SymbolDisplay>>;

    async fn api_call_metadata(&self, pairs: &[EdgePair]) -> Result<HashMap<EdgePair, ApiCallMeta>>;

    async fn qualified_names(&self, pairs: &[EdgePair]) -> Result<HashMap<EdgePair, String>>;
}
