//! Memoization caches owned by an `Analyzer`.
//!
//! Entries are only ever added or cleared explicitly; nothing expires.
//! Two tasks racing on the same key both compute and the last insert
//! wins, which costs a recomputation and nothing else.

use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::graph::SymbolId;

/// Centrality sub-metrics that depend on the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Betweenness,
    Degree,
    Eigenvector,
    Closeness,
}

/// A concurrent map with hit/miss counters.
#[derive(Debug)]
pub(crate) struct Memo<K, V> {
    entries: RwLock<HashMap<K, V>>,
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Eq + Hash, V: Clone> Memo<K, V> {
    pub fn new(enabled: bool) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            enabled,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        if !self.enabled {
            return None;
        }
        let found = self
            .entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned());
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub fn insert(&self, key: K, value: V) {
        if !self.enabled {
            return;
        }
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

pub(crate) type MetricCache = Memo<(Metric, SymbolId), f64>;
pub(crate) type ChainCache = Memo<Vec<SymbolId>, String>;

/// Snapshot of cache occupancy and effectiveness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub centrality_entries: usize,
    pub chain_entries: usize,
    pub hits: u64,
    pub misses: u64,
}

pub(crate) fn stats(metrics: &MetricCache, chains: &ChainCache) -> CacheStats {
    CacheStats {
        centrality_entries: metrics.len(),
        chain_entries: chains.len(),
        hits: metrics.hits() + chains.hits(),
        misses: metrics.misses() + chains.misses(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_and_misses_are_counted() {
        let memo: MetricCache = Memo::new(true);
        assert_eq!(memo.get(&(Metric::Degree, 1)), None);
        memo.insert((Metric::Degree, 1), 0.5);
        assert_eq!(memo.get(&(Metric::Degree, 1)), Some(0.5));
        assert_eq!(memo.get(&(Metric::Closeness, 1)), None);

        let chains: ChainCache = Memo::new(true);
        let s = stats(&memo, &chains);
        assert_eq!(s.centrality_entries, 1);
        assert_eq!(s.hits, 1);
        assert_eq!(s.misses, 2);
    }

    #[test]
    fn test_disabled_memo_stores_nothing() {
        let memo: ChainCache = Memo::new(false);
        memo.insert(vec![1, 2], "a → b".to_string());
        assert_eq!(memo.get(&vec![1, 2]), None);
        assert_eq!(memo.len(), 0);
    }

    #[test]
    fn test_clear_resets_everything() {
        let memo: MetricCache = Memo::new(true);
        memo.insert((Metric::Eigenvector, 3), 0.1);
        memo.get(&(Metric::Eigenvector, 3));
        memo.clear();
        assert_eq!(memo.len(), 0);
        assert_eq!(memo.hits(), 0);
    }
}
