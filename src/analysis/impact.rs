//! Cross-stack impact: what on the other side of an API boundary is
//! affected by a change to one symbol.

use serde::Serialize;
use std::time::Instant;
use tracing::debug;

use super::traversal::TraversalResult;
use super::{elapsed_ms, Analyzer};
use crate::config::{ImpactOptions, TraversalOptions};
use crate::error::Result;
use crate::graph::{CrossStackEdge, EdgeKind, SymbolId};

/// Direction of an edge as seen from the root symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationDirection {
    /// The root is the source.
    Outgoing,
    /// The root is the target.
    Incoming,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrossStackRelationship {
    pub edge_id: i64,
    pub kind: EdgeKind,
    pub direction: RelationDirection,
    /// The symbol on the other end of the edge.
    pub counterpart: SymbolId,
    pub from_language: Option<String>,
    pub to_language: Option<String>,
    pub http_method: Option<String>,
    pub endpoint_path: Option<String>,
    pub confidence: Option<f64>,
}

impl CrossStackRelationship {
    fn from_edge(root: SymbolId, edge: CrossStackEdge) -> Self {
        let (direction, counterpart) = if edge.from_id == root {
            (RelationDirection::Outgoing, edge.to_id)
        } else {
            (RelationDirection::Incoming, edge.from_id)
        };
        Self {
            edge_id: edge.id,
            kind: edge.kind,
            direction,
            counterpart,
            from_language: edge.from_language,
            to_language: edge.to_language,
            http_method: edge.http_method,
            endpoint_path: edge.endpoint_path,
            confidence: edge.confidence,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactReport {
    pub root: SymbolId,
    /// Callers reached over cross-stack edges.
    pub frontend_impact: Vec<TraversalResult>,
    /// Dependencies reached over cross-stack edges.
    pub backend_impact: Vec<TraversalResult>,
    pub cross_stack_relationships: Vec<CrossStackRelationship>,
    /// Sum of both impact lists; a symbol on both sides counts twice.
    pub total_impacted_symbols: usize,
    pub execution_time_ms: f64,
}

impl Analyzer {
    pub async fn cross_stack_impact(
        &self,
        root: SymbolId,
        options: &ImpactOptions,
    ) -> Result<ImpactReport> {
        let started = Instant::now();

        let (frontend_impact, backend_impact) = if options.include_transitive {
            let mut traversal = TraversalOptions::new()
                .include(EdgeKind::CROSS_STACK)
                .with_cross_stack(true);
            traversal.max_depth = options.max_depth;

            let frontend = self.transitive_callers(root, &traversal).await?;
            let backend = self.transitive_dependencies(root, &traversal).await?;
            (frontend.results, backend.results)
        } else {
            (Vec::new(), Vec::new())
        };

        let cross_stack_relationships: Vec<CrossStackRelationship> = self
            .provider
            .cross_stack_edges(root)
            .await?
            .into_iter()
            .map(|edge| CrossStackRelationship::from_edge(root, edge))
            .collect();

        let report = ImpactReport {
            root,
            total_impacted_symbols: frontend_impact.len() + backend_impact.len(),
            frontend_impact,
            backend_impact,
            cross_stack_relationships,
            execution_time_ms: elapsed_ms(started),
        };
        debug!(
            root,
            frontend = report.frontend_impact.len(),
            backend = report.backend_impact.len(),
            relationships = report.cross_stack_relationships.len(),
            "impact analysis finished"
        );
        Ok(report)
    }
}
