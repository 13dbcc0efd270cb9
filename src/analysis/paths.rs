//! Shortest-path and all-paths search between two symbols.
//!
//! Both searches treat the graph as undirected: a node's neighbors are
//! what it depends on, then what depends on it, then (optionally) its
//! cross-stack peers. That order is the tie-break for equal-length paths.

use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

use super::{Analyzer, BoxFuture};
use crate::config::{effective_depth, PathOptions, DEFAULT_MAX_DEPTH};
use crate::error::{AnalysisError, Result};
use crate::graph::{EdgeKindFilter, SymbolId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathResult {
    pub path: Vec<SymbolId>,
    /// Number of hops, `path.len() - 1`.
    pub distance: usize,
}

/// Per-call state of an all-paths enumeration.
struct Enumeration<'o> {
    start: SymbolId,
    end: SymbolId,
    max_depth: usize,
    options: &'o PathOptions,
    neighbors: HashMap<SymbolId, Vec<SymbolId>>,
    found: Vec<Vec<SymbolId>>,
}

impl Analyzer {
    /// Fewest-hops path from `start` to `end`, or `None` when they are not connected.
    pub async fn shortest_path(
        &self,
        start: SymbolId,
        end: SymbolId,
        options: &PathOptions,
    ) -> Result<Option<PathResult>> {
        if start == end {
            return Ok(Some(PathResult {
                path: vec![start],
                distance: 0,
            }));
        }

        let mut distance: HashMap<SymbolId, usize> = HashMap::from([(start, 0)]);
        let mut previous: HashMap<SymbolId, SymbolId> = HashMap::new();
        let mut frontier = VecDeque::from([start]);

        while let Some(current) = frontier.pop_front() {
            if options.is_cancelled() {
                return Err(AnalysisError::Cancelled);
            }
            if current == end {
                let path = reconstruct(&previous, start, end);
                debug!(start, end, hops = path.len() - 1, "shortest path found");
                return Ok(Some(PathResult {
                    distance: path.len() - 1,
                    path,
                }));
            }

            let neighbors = match self.path_neighbors(current, options).await {
                Ok(neighbors) => neighbors,
                Err(e) if current == start => return Err(e),
                Err(e) => {
                    warn!(symbol = current, error = %e, "neighbor fetch failed, skipping");
                    continue;
                }
            };

            let next = distance[&current] + 1;
            for neighbor in neighbors {
                if distance.contains_key(&neighbor) {
                    continue;
                }
                distance.insert(neighbor, next);
                previous.insert(neighbor, current);
                frontier.push_back(neighbor);
            }
        }

        debug!(start, end, visited = distance.len(), "no path");
        Ok(None)
    }

    /// Every simple path from `start` to `end` of at most `max_depth` hops.
    ///
    /// The number of paths grows exponentially with depth on dense graphs and
    /// is not capped; keep `max_depth` small. It is clamped to the traversal
    /// ceiling and negative values take the default depth.
    pub async fn all_paths(
        &self,
        start: SymbolId,
        end: SymbolId,
        max_depth: i64,
        options: &PathOptions,
    ) -> Result<Vec<Vec<SymbolId>>> {
        let mut run = Enumeration {
            start,
            end,
            max_depth: effective_depth(Some(max_depth), DEFAULT_MAX_DEPTH),
            options,
            neighbors: HashMap::new(),
            found: Vec::new(),
        };

        let ancestors = HashSet::from([start]);
        self.enumerate(&mut run, vec![start], ancestors).await?;

        debug!(start, end, paths = run.found.len(), "all paths enumerated");
        Ok(run.found)
    }

    fn enumerate<'a, 'o: 'a>(
        &'a self,
        run: &'a mut Enumeration<'o>,
        path: Vec<SymbolId>,
        ancestors: HashSet<SymbolId>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if run.options.is_cancelled() {
                return Err(AnalysisError::Cancelled);
            }
            let Some(&node) = path.last() else {
                return Ok(());
            };
            if node == run.end {
                run.found.push(path);
                return Ok(());
            }
            if path.len() - 1 >= run.max_depth {
                return Ok(());
            }

            let neighbors = match run.neighbors.get(&node) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = match self.path_neighbors(node, run.options).await {
                        Ok(neighbors) => neighbors,
                        Err(e) if node == run.start => return Err(e),
                        Err(e) => {
                            warn!(symbol = node, error = %e, "neighbor fetch failed, skipping");
                            Vec::new()
                        }
                    };
                    run.neighbors.insert(node, fetched.clone());
                    fetched
                }
            };

            for neighbor in neighbors {
                if ancestors.contains(&neighbor) {
                    continue;
                }
                let mut branch = ancestors.clone();
                branch.insert(neighbor);
                let mut next = path.clone();
                next.push(neighbor);
                self.enumerate(&mut *run, next, branch).await?;
            }
            Ok(())
        })
    }

    /// Neighbors in tie-break order, each listed once.
    async fn path_neighbors(&self, node: SymbolId, options: &PathOptions) -> Result<Vec<SymbolId>> {
        let all = EdgeKindFilter::all();
        let mut seen = HashSet::new();
        let mut neighbors = Vec::new();

        for edge in self.provider.direct_dependencies(node, &all).await? {
            if seen.insert(edge.to_id) {
                neighbors.push(edge.to_id);
            }
        }
        for edge in self.provider.direct_dependents(node, &all).await? {
            if seen.insert(edge.from_id) {
                neighbors.push(edge.from_id);
            }
        }
        if options.include_cross_stack {
            for edge in self.provider.cross_stack_edges(node).await? {
                let other = if edge.from_id == node { edge.to_id } else { edge.from_id };
                if seen.insert(other) {
                    neighbors.push(other);
                }
            }
        }
        Ok(neighbors)
    }
}

fn reconstruct(previous: &HashMap<SymbolId, SymbolId>, start: SymbolId, end: SymbolId) -> Vec<SymbolId> {
    let mut path = vec![end];
    let mut current = end;
    while current != start {
        match previous.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
