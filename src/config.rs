//! Engine configuration and per-call options.
//!
//! `EngineConfig` is loaded from TOML and carries the defaults; the
//! option types are what callers pass per request. Options are never
//! trusted as given: `resolve` clamps them into settings the engine uses.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::Result;
use crate::graph::{EdgeKind, EdgeKindFilter};

/// Absolute traversal depth ceiling, whatever the caller asks for.
pub const MAX_DEPTH_CEILING: usize = 20;
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Top-level engine configuration.
///
/// ```toml
/// [traversal]
/// default_max_depth = 8
/// include_cross_stack = true
///
/// [importance]
/// semantic = 0.35
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub traversal: TraversalConfig,
    pub importance: ImportanceWeights,
    pub cache: CacheConfig,
}

impl EngineConfig {
    /// Load from a TOML file, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(raw) => match Self::from_toml_str(&raw) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded engine config");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid engine config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read engine config, using defaults");
                Self::default()
            }
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.traversal.default_max_depth = config.traversal.default_max_depth.min(MAX_DEPTH_CEILING);
        config.traversal.min_path_confidence = sanitize_confidence(config.traversal.min_path_confidence);
        config.importance = config.importance.sanitized();
        Ok(config)
    }
}

/// Defaults applied to traversals that leave an option unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    pub default_max_depth: usize,
    pub include_cross_stack: bool,
    /// Cumulative path confidence below which edges are pruned. Off when unset.
    pub min_path_confidence: Option<f64>,
    pub cross_stack_ancestry: CrossStackAncestry,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            default_max_depth: DEFAULT_MAX_DEPTH,
            include_cross_stack: false,
            min_path_confidence: None,
            cross_stack_ancestry: CrossStackAncestry::Fork,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Memoize centrality sub-metrics per symbol.
    pub centrality: bool,
    /// Memoize rendered call chains per path.
    pub chains: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            centrality: true,
            chains: true,
        }
    }
}

/// How cross-stack children see the ancestor set of their parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossStackAncestry {
    /// Each cross-stack child gets its own copy, like ordinary edges.
    #[default]
    Fork,
    /// Cross-stack children mutate the parent's set, so later siblings
    /// see nodes visited below earlier cross-stack branches.
    Shared,
}

/// Weights of the five importance sub-metrics. They should sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportanceWeights {
    pub betweenness: f64,
    pub degree: f64,
    pub eigenvector: f64,
    pub closeness: f64,
    pub semantic: f64,
}

impl Default for ImportanceWeights {
    fn default() -> Self {
        Self {
            betweenness: 0.30,
            degree: 0.20,
            eigenvector: 0.15,
            closeness: 0.10,
            semantic: 0.25,
        }
    }
}

impl ImportanceWeights {
    /// Replace non-finite weights with their default and negative ones with 0.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let fix = |value: f64, fallback: f64| {
            if !value.is_finite() {
                fallback
            } else {
                value.max(0.0)
            }
        };
        Self {
            betweenness: fix(self.betweenness, defaults.betweenness),
            degree: fix(self.degree, defaults.degree),
            eigenvector: fix(self.eigenvector, defaults.eigenvector),
            closeness: fix(self.closeness, defaults.closeness),
            semantic: fix(self.semantic, defaults.semantic),
        }
    }

    pub fn total(&self) -> f64 {
        self.betweenness + self.degree + self.eigenvector + self.closeness + self.semantic
    }
}

/// Cooperative cancellation, checked by the engine at every recursive step.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-call traversal options. Unset fields take the engine defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalOptions {
    /// Requested depth; negative values fall back to the default.
    pub max_depth: Option<i64>,
    pub include_types: Vec<EdgeKind>,
    pub exclude_types: Vec<EdgeKind>,
    pub include_cross_stack: Option<bool>,
    pub emit_chains: bool,
    pub min_path_confidence: Option<f64>,
    pub cross_stack_ancestry: Option<CrossStackAncestry>,
    #[serde(skip)]
    pub cancel: Option<CancellationFlag>,
}

impl TraversalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, depth: i64) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn include(mut self, kinds: impl IntoIterator<Item = EdgeKind>) -> Self {
        self.include_types.extend(kinds);
        self
    }

    pub fn exclude(mut self, kinds: impl IntoIterator<Item = EdgeKind>) -> Self {
        self.exclude_types.extend(kinds);
        self
    }

    pub fn with_cross_stack(mut self, enabled: bool) -> Self {
        self.include_cross_stack = Some(enabled);
        self
    }

    pub fn with_chains(mut self) -> Self {
        self.emit_chains = true;
        self
    }

    pub fn with_min_path_confidence(mut self, threshold: f64) -> Self {
        self.min_path_confidence = Some(threshold);
        self
    }

    pub fn with_cross_stack_ancestry(mut self, ancestry: CrossStackAncestry) -> Self {
        self.cross_stack_ancestry = Some(ancestry);
        self
    }

    pub fn with_cancel(mut self, flag: CancellationFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn resolve(&self, defaults: &TraversalConfig) -> TraversalSettings {
        let filter = EdgeKindFilter {
            include: (!self.include_types.is_empty())
                .then(|| self.include_types.iter().copied().collect()),
            exclude: self.exclude_types.iter().copied().collect(),
        };
        TraversalSettings {
            max_depth: effective_depth(self.max_depth, defaults.default_max_depth),
            filter,
            include_cross_stack: self.include_cross_stack.unwrap_or(defaults.include_cross_stack),
            emit_chains: self.emit_chains,
            min_path_confidence: sanitize_confidence(
                self.min_path_confidence.or(defaults.min_path_confidence),
            ),
            cross_stack_ancestry: self
                .cross_stack_ancestry
                .unwrap_or(defaults.cross_stack_ancestry),
            cancel: self.cancel.clone(),
        }
    }
}

/// Validated traversal settings.
#[derive(Debug, Clone)]
pub struct TraversalSettings {
    pub max_depth: usize,
    pub filter: EdgeKindFilter,
    pub include_cross_stack: bool,
    pub emit_chains: bool,
    pub min_path_confidence: Option<f64>,
    pub cross_stack_ancestry: CrossStackAncestry,
    pub cancel: Option<CancellationFlag>,
}

impl TraversalSettings {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationFlag::is_cancelled)
    }
}

/// Options for shortest-path and all-paths search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathOptions {
    pub include_cross_stack: bool,
    #[serde(skip)]
    pub cancel: Option<CancellationFlag>,
}

impl PathOptions {
    pub fn with_cross_stack(mut self, enabled: bool) -> Self {
        self.include_cross_stack = enabled;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationFlag::is_cancelled)
    }
}

/// Options for the cross-stack impact report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactOptions {
    pub max_depth: Option<i64>,
    pub include_transitive: bool,
}

impl Default for ImpactOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            include_transitive: true,
        }
    }
}

/// Clamp a requested depth to the ceiling; negative or missing requests
/// take the default.
pub fn effective_depth(requested: Option<i64>, default: usize) -> usize {
    match requested {
        Some(depth) if depth >= 0 => usize::try_from(depth)
            .unwrap_or(MAX_DEPTH_CEILING)
            .min(MAX_DEPTH_CEILING),
        _ => default.min(MAX_DEPTH_CEILING),
    }
}

fn sanitize_confidence(threshold: Option<f64>) -> Option<f64> {
    threshold
        .filter(|t| t.is_finite() && *t > 0.0)
        .map(|t| t.min(1.0))
}
