//! Bounded, cycle-safe transitive closure over callers or dependencies.
//!
//! The walk is a depth-first recursion. Every branch point hands its
//! children a clone of the ancestor set, so sibling branches never see
//! each other's visits and diamond-shaped reconvergence is reported from
//! every parent. A node already on the current path is recorded as a
//! cycle and not expanded again.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::time::Instant;
use tracing::{debug, warn};

use super::{elapsed_ms, Analyzer, BoxFuture};
use crate::config::{CrossStackAncestry, TraversalOptions, TraversalSettings};
use crate::error::{AnalysisError, Result};
use crate::graph::{CrossStackEdge, Dependency, SymbolId};

/// Which way edges are followed from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalDirection {
    /// Follow incoming edges: who calls or depends on the root.
    Callers,
    /// Follow outgoing edges: what the root calls or depends on.
    Dependencies,
}

impl TraversalDirection {
    fn neighbor(self, edge: &Dependency) -> SymbolId {
        match self {
            TraversalDirection::Callers => edge.from_id,
            TraversalDirection::Dependencies => edge.to_id,
        }
    }

    fn points_away_from(self, edge: &CrossStackEdge, node: SymbolId) -> bool {
        match self {
            TraversalDirection::Callers => edge.to_id == node,
            TraversalDirection::Dependencies => edge.from_id == node,
        }
    }
}

/// One symbol reached by a traversal.
#[derive(Debug, Clone, Serialize)]
pub struct TraversalResult {
    pub symbol_id: SymbolId,
    /// Ancestors from the root down to, but excluding, `symbol_id`.
    pub path: Vec<SymbolId>,
    pub depth: usize,
    /// The edge that produced this hop.
    pub edge: Dependency,
    /// Product of edge confidences along the path.
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_chain: Option<String>,
}

impl TraversalResult {
    /// The path including the reached symbol.
    pub fn full_path(&self) -> Vec<SymbolId> {
        let mut path = self.path.clone();
        path.push(self.symbol_id);
        path
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TraversalReport {
    /// Not deduplicated: a symbol reached along two paths appears twice.
    pub results: Vec<TraversalResult>,
    pub max_depth_reached: usize,
    pub total_paths: usize,
    pub cycles_detected: usize,
    /// Member sets of the distinct cycles found, each sorted.
    pub cycles: Vec<Vec<SymbolId>>,
    pub execution_time_ms: f64,
}

struct WalkState {
    root: SymbolId,
    direction: TraversalDirection,
    settings: TraversalSettings,
    results: Vec<TraversalResult>,
    cycles: BTreeSet<Vec<SymbolId>>,
    root_error: Option<AnalysisError>,
    cancelled: bool,
}

impl WalkState {
    /// Confidence after taking `edge`, or `None` when the edge is filtered
    /// out or pruned.
    fn admit(&self, edge: &Dependency, confidence: f64) -> Option<f64> {
        if !self.settings.filter.allows(edge.kind) {
            return None;
        }
        let next = confidence * edge.effective_confidence();
        match self.settings.min_path_confidence {
            Some(threshold) if next < threshold => None,
            _ => Some(next),
        }
    }

    fn record(&mut self, node: SymbolId, path: &[SymbolId], depth: usize, edge: Dependency, confidence: f64) {
        self.results.push(TraversalResult {
            symbol_id: node,
            path: path.to_vec(),
            depth,
            edge,
            confidence,
            call_chain: None,
        });
    }

    fn record_cycle(&mut self, path: &[SymbolId], node: SymbolId) {
        let mut members: Vec<SymbolId> = path.to_vec();
        members.push(node);
        members.sort_unstable();
        members.dedup();
        self.cycles.insert(members);
    }

    /// Root fetch failures escalate, anything deeper is a dead end.
    fn fail(&mut self, node: SymbolId, depth: usize, operation: &'static str, error: AnalysisError) {
        if depth == 0 && node == self.root && self.root_error.is_none() {
            self.root_error = Some(error);
        } else {
            warn!(symbol = node, depth, operation, error = %error, "branch fetch failed, skipping");
        }
    }
}

impl Analyzer {
    /// Everything that (transitively) calls or depends on `root`.
    pub async fn transitive_callers(
        &self,
        root: SymbolId,
        options: &TraversalOptions,
    ) -> Result<TraversalReport> {
        self.traverse(root, TraversalDirection::Callers, options).await
    }

    /// Everything `root` (transitively) calls or depends on.
    pub async fn transitive_dependencies(
        &self,
        root: SymbolId,
        options: &TraversalOptions,
    ) -> Result<TraversalReport> {
        self.traverse(root, TraversalDirection::Dependencies, options).await
    }

    pub async fn traverse(
        &self,
        root: SymbolId,
        direction: TraversalDirection,
        options: &TraversalOptions,
    ) -> Result<TraversalReport> {
        let started = Instant::now();
        let mut state = WalkState {
            root,
            direction,
            settings: options.resolve(&self.config.traversal),
            results: Vec::new(),
            cycles: BTreeSet::new(),
            root_error: None,
            cancelled: false,
        };

        let mut ancestors = HashSet::new();
        self.visit(&mut state, root, 0, Vec::new(), 1.0, &mut ancestors)
            .await;

        if let Some(error) = state.root_error {
            return Err(error);
        }
        if state.cancelled {
            return Err(AnalysisError::Cancelled);
        }

        let mut results = state.results;
        if state.settings.emit_chains && !results.is_empty() {
            let paths: Vec<Vec<SymbolId>> = results.iter().map(TraversalResult::full_path).collect();
            let chains = self.format_call_chains(&paths).await;
            for (result, chain) in results.iter_mut().zip(chains) {
                result.call_chain = Some(chain);
            }
        }

        let report = TraversalReport {
            max_depth_reached: results.iter().map(|r| r.depth).max().unwrap_or(0),
            total_paths: results.len(),
            cycles_detected: state.cycles.len(),
            cycles: state.cycles.into_iter().collect(),
            results,
            execution_time_ms: elapsed_ms(started),
        };
        debug!(
            root,
            ?direction,
            results = report.total_paths,
            depth = report.max_depth_reached,
            cycles = report.cycles_detected,
            "traversal finished"
        );
        Ok(report)
    }

    fn visit<'a>(
        &'a self,
        state: &'a mut WalkState,
        node: SymbolId,
        depth: usize,
        path: Vec<SymbolId>,
        confidence: f64,
        ancestors: &'a mut HashSet<SymbolId>,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            if state.settings.is_cancelled() {
                state.cancelled = true;
                return;
            }
            if depth >= state.settings.max_depth {
                return;
            }
            if ancestors.contains(&node) {
                debug!(symbol = node, depth, "cycle detected");
                state.record_cycle(&path, node);
                return;
            }
            ancestors.insert(node);

            let direct = match state.direction {
                TraversalDirection::Callers => {
                    self.provider
                        .direct_dependents(node, &state.settings.filter)
                        .await
                }
                TraversalDirection::Dependencies => {
                    self.provider
                        .direct_dependencies(node, &state.settings.filter)
                        .await
                }
            };
            let edges = match direct {
                Ok(edges) => edges,
                Err(e) => {
                    state.fail(node, depth, "direct_edges", e);
                    return;
                }
            };

            let mut branch_path = path;
            branch_path.push(node);

            for edge in edges {
                let Some(next_confidence) = state.admit(&edge, confidence) else {
                    continue;
                };
                let neighbor = state.direction.neighbor(&edge);
                state.record(neighbor, &branch_path, depth + 1, edge, next_confidence);

                let mut branch = ancestors.clone();
                self.visit(
                    &mut *state,
                    neighbor,
                    depth + 1,
                    branch_path.clone(),
                    next_confidence,
                    &mut branch,
                )
                .await;
                if state.cancelled {
                    return;
                }
            }

            if !state.settings.include_cross_stack {
                return;
            }

            let cross = match self.provider.cross_stack_edges(node).await {
                Ok(edges) => edges,
                Err(e) => {
                    warn!(symbol = node, depth, error = %e, "cross-stack fetch failed, skipping");
                    return;
                }
            };

            for cross_edge in cross {
                if !state.direction.points_away_from(&cross_edge, node) {
                    continue;
                }
                let edge = cross_edge.as_dependency();
                let Some(next_confidence) = state.admit(&edge, confidence) else {
                    continue;
                };
                let neighbor = state.direction.neighbor(&edge);
                state.record(neighbor, &branch_path, depth + 1, edge, next_confidence);

                match state.settings.cross_stack_ancestry {
                    CrossStackAncestry::Fork => {
                        let mut branch = ancestors.clone();
                        self.visit(
                            &mut *state,
                            neighbor,
                            depth + 1,
                            branch_path.clone(),
                            next_confidence,
                            &mut branch,
                        )
                        .await;
                    }
                    CrossStackAncestry::Shared => {
                        self.visit(
                            &mut *state,
                            neighbor,
                            depth + 1,
                            branch_path.clone(),
                            next_confidence,
                            &mut *ancestors,
                        )
                        .await;
                    }
                }
                if state.cancelled {
                    return;
                }
            }
        })
    }
}
