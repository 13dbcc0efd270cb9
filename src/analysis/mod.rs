//! Analysis operations over a [`GraphProvider`].
//!
//! All operations hang off [`Analyzer`], which owns the provider handle,
//! the engine configuration and the memoization caches. Share one analyzer
//! behind an `Arc` to let concurrent calls reuse cached work.

mod cache;
mod chain;
mod impact;
mod importance;
mod paths;
mod traversal;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheStats, Metric};
pub use chain::shorten_path;
pub use impact::{CrossStackRelationship, ImpactReport, RelationDirection};
pub use importance::{
    detect_language, is_database_operation, semantic_score, ImportanceBreakdown,
    ImportanceQuery, RankedSymbol, SourceLanguage,
};
pub use paths::PathResult;
pub use traversal::{TraversalDirection, TraversalReport, TraversalResult};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::config::EngineConfig;
use crate::graph::GraphProvider;
use cache::{ChainCache, MetricCache};

pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Entry point for every analysis operation.
pub struct Analyzer {
    pub(crate) provider: Arc<dyn GraphProvider>,
    pub(crate) config: EngineConfig,
    pub(crate) metrics: MetricCache,
    pub(crate) chains: ChainCache,
}

impl Analyzer {
    pub fn new(provider: Arc<dyn GraphProvider>) -> Self {
        Self::with_config(provider, EngineConfig::default())
    }

    pub fn with_config(provider: Arc<dyn GraphProvider>, config: EngineConfig) -> Self {
        Self {
            provider,
            metrics: MetricCache::new(config.cache.centrality),
            chains: ChainCache::new(config.cache.chains),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn provider(&self) -> &Arc<dyn GraphProvider> {
        &self.provider
    }

    /// Drop every memoized centrality value and rendered chain.
    pub fn clear_cache(&self) {
        self.metrics.clear();
        self.chains.clear();
        debug!("analysis caches cleared");
    }

    pub fn cache_stats(&self) -> CacheStats {
        cache::stats(&self.metrics, &self.chains)
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("config", &self.config)
            .field("cache", &self.cache_stats())
            .finish_non_exhaustive()
    }
}

pub(crate) fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
