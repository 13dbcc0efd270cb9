//! In-memory graph provider.
//!
//! Uses petgraph to hold symbols and dependencies and answers the
//! `GraphProvider` queries directly from it. Cross-stack edges live in
//! their own relation next to the graph, mirroring how a store keeps them.

use async_trait::async_trait;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use super::provider::GraphProvider;
use super::types::*;
use crate::error::{AnalysisError, Result};

/// A symbol graph held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    /// Symbols as nodes, dependencies as edges.
    graph: DiGraph<Symbol, Dependency>,
    /// Index: symbol id -> node index.
    id_index: HashMap<SymbolId, NodeIndex>,
    /// Index: symbol name -> ids (for name lookup by embedders).
    name_index: HashMap<String, Vec<SymbolId>>,
    /// The separate cross-stack relation.
    cross_stack: Vec<CrossStackEdge>,
    next_edge_id: i64,
}

/// Serializable form of a whole graph, used for JSON fixtures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub symbols: Vec<Symbol>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub cross_stack: Vec<CrossStackEdge>,
}

/// Statistics about the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    pub symbol_count: usize,
    pub dependency_count: usize,
    pub cross_stack_count: usize,
    pub unique_symbol_names: usize,
}

impl MemoryGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a snapshot. Fails if an edge names an unknown symbol.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self> {
        let mut graph = Self::new();
        for symbol in snapshot.symbols {
            graph.add_symbol(symbol);
        }
        for dependency in snapshot.dependencies {
            graph.add_dependency(dependency)?;
        }
        for edge in snapshot.cross_stack {
            graph.add_cross_stack_edge(edge)?;
        }
        Ok(graph)
    }

    /// Load a JSON snapshot from disk.
    pub fn load_json(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot: GraphSnapshot = serde_json::from_str(&raw)?;
        let graph = Self::from_snapshot(snapshot)?;
        info!(path = %path.display(), symbols = graph.graph.node_count(), "loaded graph snapshot");
        Ok(graph)
    }

    pub fn to_snapshot(&self) -> GraphSnapshot {
        let mut dependencies: Vec<Dependency> = self
            .graph
            .edge_references()
            .map(|e| e.weight().clone())
            .collect();
        dependencies.sort_by_key(|d| d.id);

        GraphSnapshot {
            symbols: self.graph.node_weights().cloned().collect(),
            dependencies,
            cross_stack: self.cross_stack.clone(),
        }
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(&self.to_snapshot())?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    // ─── Node Operations ────────────────────────────────────────

    /// Add a symbol. Re-adding an existing id replaces its data in place.
    pub fn add_symbol(&mut self, symbol: Symbol) -> NodeIndex {
        if let Some(&idx) = self.id_index.get(&symbol.id) {
            let old_name = self.graph[idx].name.clone();
            if old_name != symbol.name {
                if let Some(ids) = self.name_index.get_mut(&old_name) {
                    ids.retain(|&id| id != symbol.id);
                }
                self.name_index
                    .entry(symbol.name.clone())
                    .or_default()
                    .push(symbol.id);
            }
            self.graph[idx] = symbol;
            return idx;
        }

        let id = symbol.id;
        self.name_index
            .entry(symbol.name.clone())
            .or_default()
            .push(id);
        let idx = self.graph.add_node(symbol);
        self.id_index.insert(id, idx);
        idx
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.id_index.get(&id).map(|&idx| &self.graph[idx])
    }

    /// All symbols carrying exactly this name.
    pub fn symbols_named(&self, name: &str) -> Vec<&Symbol> {
        self.name_index
            .get(name)
            .map(|ids| ids.iter().filter_map(|&id| self.symbol(id)).collect())
            .unwrap_or_default()
    }

    // ─── Edge Operations ────────────────────────────────────────

    /// Add a dependency between two existing symbols.
    pub fn add_dependency(&mut self, dependency: Dependency) -> Result<()> {
        let from = self.index_of(dependency.from_id)?;
        let to = self.index_of(dependency.to_id)?;
        self.next_edge_id = self.next_edge_id.max(dependency.id + 1);
        self.graph.add_edge(from, to, dependency);
        Ok(())
    }

    /// Add a dependency with a generated id. Returns the edge id.
    pub fn connect(&mut self, from: SymbolId, to: SymbolId, kind: EdgeKind) -> Result<i64> {
        let id = self.next_edge_id;
        self.add_dependency(Dependency::new(id, from, to, kind))?;
        Ok(id)
    }

    pub fn add_cross_stack_edge(&mut self, edge: CrossStackEdge) -> Result<()> {
        self.index_of(edge.from_id)?;
        self.index_of(edge.to_id)?;
        self.cross_stack.push(edge);
        Ok(())
    }

    // ─── Query Operations ───────────────────────────────────────

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            symbol_count: self.graph.node_count(),
            dependency_count: self.graph.edge_count(),
            cross_stack_count: self.cross_stack.len(),
            unique_symbol_names: self.name_index.values().filter(|ids| !ids.is_empty()).count(),
        }
    }

    fn index_of(&self, id: SymbolId) -> Result<NodeIndex> {
        self.id_index
            .get(&id)
            .copied()
            .ok_or(AnalysisError::NotFound(id))
    }

    /// Edges touching `id` in one direction, in insertion order.
    fn edges(&self, id: SymbolId, direction: Direction, filter: &EdgeKindFilter) -> Vec<Dependency> {
        let Some(&idx) = self.id_index.get(&id) else {
            return Vec::new();
        };

        let mut edges: Vec<Dependency> = self
            .graph
            .edges_directed(idx, direction)
            .filter(|edge| filter.allows(edge.weight().kind))
            .map(|edge| {
                let mut dependency = edge.weight().clone();
                dependency.from_symbol = Some(self.graph[edge.source()].summary());
                dependency.to_symbol = Some(self.graph[edge.target()].summary());
                dependency
            })
            .collect();

        // petgraph walks adjacency lists newest-first
        edges.sort_by_key(|d| d.id);
        edges
    }
}

#[async_trait]
impl GraphProvider for MemoryGraph {
    async fn direct_dependents(
        &self,
        id: SymbolId,
        filter: &EdgeKindFilter,
    ) -> Result<Vec<Dependency>> {
        Ok(self.edges(id, Direction::Incoming, filter))
    }

    async fn direct_dependencies(
        &self,
        id: SymbolId,
        filter: &EdgeKindFilter,
    ) -> Result<Vec<Dependency>> {
        Ok(self.edges(id, Direction::Outgoing, filter))
    }

    async fn cross_stack_edges(&self, id: SymbolId) -> Result<Vec<CrossStackEdge>> {
        Ok(self
            .cross_stack
            .iter()
            .filter(|edge| edge.from_id == id || edge.to_id == id)
            .cloned()
            .collect())
    }

    async fn symbol_display_info(
        &self,
        ids: &[SymbolId],
    ) -> Result<HashMap<SymbolId, SymbolDisplay>> {
        debug!(count = ids.len(), "resolving display info");
        Ok(ids
            .iter()
            .filter_map(|&id| self.symbol(id).map(|symbol| (id, symbol.display())))
            .collect())
    }

    async fn api_call_metadata(&self, pairs: &[EdgePair]) -> Result<HashMap<EdgePair, ApiCallMeta>> {
        let mut found = HashMap::new();
        for pair in pairs {
            let meta = self.cross_stack.iter().find_map(|edge| {
                if edge.kind != EdgeKind::ApiCall || EdgePair::new(edge.from_id, edge.to_id) != *pair {
                    return None;
                }
                Some(ApiCallMeta {
                    http_method: edge.http_method.clone()?,
                    endpoint_path: edge.endpoint_path.clone()?,
                })
            });
            if let Some(meta) = meta {
                found.insert(*pair, meta);
            }
        }
        Ok(found)
    }

    async fn qualified_names(&self, pairs: &[EdgePair]) -> Result<HashMap<EdgePair, String>> {
        let mut found = HashMap::new();
        for pair in pairs {
            let name = self
                .edges(pair.from, Direction::Outgoing, &EdgeKindFilter::all())
                .into_iter()
                .filter(|d| d.pair() == *pair)
                .find_map(|d| d.qualified_target);
            if let Some(name) = name {
                found.insert(*pair, name);
            }
        }
        Ok(found)
    }
}
