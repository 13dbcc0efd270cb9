//! Provider wrappers used by the unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{AnalysisError, Result};
use crate::graph::{
    ApiCallMeta, CrossStackEdge, Dependency, EdgeKindFilter, EdgePair, GraphProvider,
    SymbolDisplay, SymbolId,
};

/// Counts every provider call made through it.
pub struct CountingProvider<P> {
    inner: P,
    calls: AtomicUsize,
}

impl<P> CountingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<P: GraphProvider> GraphProvider for CountingProvider<P> {
    async fn direct_dependents(&self, id: SymbolId, filter: &EdgeKindFilter) -> Result<Vec<Dependency>> {
        self.tick();
        self.inner.direct_dependents(id, filter).await
    }

    async fn direct_dependencies(&self, id: SymbolId, filter: &EdgeKindFilter) -> Result<Vec<Dependency>> {
        self.tick();
        self.inner.direct_dependencies(id, filter).await
    }

    async fn cross_stack_edges(&self, id: SymbolId) -> Result<Vec<CrossStackEdge>> {
        self.tick();
        self.inner.cross_stack_edges(id).await
    }

    async fn symbol_display_info(&self, ids: &[SymbolId]) -> Result<HashMap<SymbolId, SymbolDisplay>> {
        self.tick();
        self.inner.symbol_display_info(ids).await
    }

    async fn api_call_metadata(&self, pairs: &[EdgePair]) -> Result<HashMap<EdgePair, ApiCallMeta>> {
        self.tick();
        self.inner.api_call_metadata(pairs).await
    }

    async fn qualified_names(&self, pairs: &[EdgePair]) -> Result<HashMap<EdgePair, String>> {
        self.tick();
        self.inner.qualified_names(pairs).await
    }
}

/// Fails edge fetches for chosen symbols, and optionally every batched lookup.
pub struct FailingProvider<P> {
    inner: P,
    broken: HashSet<SymbolId>,
    fail_lookups: bool,
}

impl<P> FailingProvider<P> {
    pub fn new(inner: P, broken: impl IntoIterator<Item = SymbolId>) -> Self {
        Self {
            inner,
            broken: broken.into_iter().collect(),
            fail_lookups: false,
        }
    }

    pub fn failing_lookups(mut self) -> Self {
        self.fail_lookups = true;
        self
    }

    fn check(&self, operation: &'static str, id: SymbolId) -> Result<()> {
        if self.broken.contains(&id) {
            return Err(AnalysisError::provider(operation, id, "connection reset"));
        }
        Ok(())
    }

    fn check_lookup(&self, operation: &'static str) -> Result<()> {
        if self.fail_lookups {
            return Err(AnalysisError::provider(operation, 0, "lookup timed out"));
        }
        Ok(())
    }
}

#[async_trait]
impl<P: GraphProvider> GraphProvider for FailingProvider<P> {
    async fn direct_dependents(&self, id: SymbolId, filter: &EdgeKindFilter) -> Result<Vec<Dependency>> {
        self.check("direct_dependents", id)?;
        self.inner.direct_dependents(id, filter).await
    }

    async fn direct_dependencies(&self, id: SymbolId, filter: &EdgeKindFilter) -> Result<Vec<Dependency>> {
        self.check("direct_dependencies", id)?;
        self.inner.direct_dependencies(id, filter).await
    }

    async fn cross_stack_edges(&self, id: SymbolId) -> Result<Vec<CrossStackEdge>> {
        self.check("cross_stack_edges", id)?;
        self.inner.cross_stack_edges(id).await
    }

    async fn symbol_display_info(&self, ids: &[SymbolId]) -> Result<HashMap<SymbolId, SymbolDisplay>> {
        self.check_lookup("symbol_display_info")?;
        self.inner.symbol_display_info(ids).await
    }

    async fn api_call_metadata(&self, pairs: &[EdgePair]) -> Result<HashMap<EdgePair, ApiCallMeta>> {
        self.check_lookup("api_call_metadata")?;
        self.inner.api_call_metadata(pairs).await
    }

    async fn qualified_names(&self, pairs: &[EdgePair]) -> Result<HashMap<EdgePair, String>> {
        self.check_lookup("qualified_names")?;
        self.inner.qualified_names(pairs).await
    }
}
