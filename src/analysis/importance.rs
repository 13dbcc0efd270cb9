//! Symbol importance ranking.
//!
//! A composite of four cheap centrality approximations and a semantic
//! score derived from the symbol's name, kind and location. Symbols that
//! look like database writes get boosted, since they are where data
//! flows end.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;
use tracing::warn;

use super::cache::Metric;
use super::Analyzer;
use crate::config::ImportanceWeights;
use crate::error::{AnalysisError, Result};
use crate::graph::{EdgeKindFilter, NodeKind, Symbol, SymbolId};

const DB_OPERATION_BOOST: f64 = 2.5;
const DB_DEPTH_PENALTY: f64 = 0.02;

/// A symbol to score, optionally with its depth relative to a query root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceQuery {
    pub symbol: Symbol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
}

impl ImportanceQuery {
    pub fn at_depth(symbol: Symbol, depth: usize) -> Self {
        Self {
            symbol,
            depth: Some(depth),
        }
    }
}

impl From<Symbol> for ImportanceQuery {
    fn from(symbol: Symbol) -> Self {
        Self {
            symbol,
            depth: None,
        }
    }
}

/// The five sub-metrics, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ImportanceBreakdown {
    pub betweenness: f64,
    pub degree: f64,
    pub eigenvector: f64,
    pub closeness: f64,
    pub semantic: f64,
    pub database_operation: bool,
}

impl ImportanceBreakdown {
    pub fn composite(&self, weights: &ImportanceWeights, depth: Option<usize>) -> f64 {
        let mut score = weights.betweenness * self.betweenness
            + weights.degree * self.degree
            + weights.eigenvector * self.eigenvector
            + weights.closeness * self.closeness
            + weights.semantic * self.semantic;

        if self.database_operation {
            score *= DB_OPERATION_BOOST;
            score = (score - DB_DEPTH_PENALTY * depth.unwrap_or(0) as f64).max(0.0);
        }
        clamp_unit(score)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedSymbol {
    pub symbol: Symbol,
    pub score: f64,
}

impl Analyzer {
    /// Composite importance in [0, 1]. Falls back to the configured weights.
    pub async fn importance_score(
        &self,
        query: &ImportanceQuery,
        weights: Option<&ImportanceWeights>,
    ) -> f64 {
        let weights = weights.copied().unwrap_or(self.config.importance).sanitized();
        let breakdown = self.importance_breakdown(query).await;
        breakdown.composite(&weights, query.depth)
    }

    /// Score a symbol known only by id.
    pub async fn importance_for_id(
        &self,
        id: SymbolId,
        depth: Option<usize>,
        weights: Option<&ImportanceWeights>,
    ) -> Result<f64> {
        let mut display = self.provider.symbol_display_info(&[id]).await?;
        let info = display.remove(&id).ok_or(AnalysisError::NotFound(id))?;
        let mut symbol = Symbol::new(id, info.name, info.kind, info.file_path);
        symbol.class_hint = info.class_hint;

        let query = ImportanceQuery { symbol, depth };
        Ok(self.importance_score(&query, weights).await)
    }

    /// Score every symbol and sort descending. Equal scores keep input order.
    pub async fn rank_symbols(
        &self,
        queries: Vec<ImportanceQuery>,
        weights: Option<&ImportanceWeights>,
    ) -> Vec<RankedSymbol> {
        let mut ranked = Vec::with_capacity(queries.len());
        for query in queries {
            let score = self.importance_score(&query, weights).await;
            ranked.push(RankedSymbol {
                symbol: query.symbol,
                score,
            });
        }
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    pub async fn importance_breakdown(&self, query: &ImportanceQuery) -> ImportanceBreakdown {
        let id = query.symbol.id;
        ImportanceBreakdown {
            betweenness: self.centrality(Metric::Betweenness, id).await,
            degree: self.centrality(Metric::Degree, id).await,
            eigenvector: self.centrality(Metric::Eigenvector, id).await,
            closeness: self.centrality(Metric::Closeness, id).await,
            semantic: semantic_score(&query.symbol, query.depth),
            database_operation: is_database_operation(&query.symbol),
        }
    }

    /// Memoized sub-metric. Failed computations count as 0 and are not cached.
    async fn centrality(&self, metric: Metric, id: SymbolId) -> f64 {
        if let Some(value) = self.metrics.get(&(metric, id)) {
            return value;
        }
        match self.compute_centrality(metric, id).await {
            Ok(value) => {
                let value = clamp_unit(value);
                self.metrics.insert((metric, id), value);
                value
            }
            Err(e) => {
                warn!(symbol = id, ?metric, error = %e, "centrality fetch failed");
                0.0
            }
        }
    }

    async fn compute_centrality(&self, metric: Metric, id: SymbolId) -> Result<f64> {
        let all = EdgeKindFilter::all();
        match metric {
            Metric::Betweenness => {
                let (incoming, outgoing) = self.degrees(id).await?;
                Ok(((incoming * outgoing) as f64).sqrt() / 10.0)
            }
            Metric::Degree => {
                let (incoming, outgoing) = self.degrees(id).await?;
                Ok((incoming as f64 * 1.5 + outgoing as f64) / 20.0)
            }
            Metric::Eigenvector => {
                let mut callers = HashSet::new();
                let mut total = 0usize;
                for edge in self.provider.direct_dependents(id, &all).await? {
                    if callers.insert(edge.from_id) {
                        total += self.provider.direct_dependents(edge.from_id, &all).await?.len();
                    }
                }
                Ok(total as f64 / 50.0)
            }
            Metric::Closeness => {
                let first_hop: Vec<SymbolId> = self
                    .provider
                    .direct_dependencies(id, &all)
                    .await?
                    .into_iter()
                    .map(|edge| edge.to_id)
                    .collect();
                let mut reachable: HashSet<SymbolId> = first_hop.iter().copied().collect();
                let mut expanded = HashSet::new();
                for &next in &first_hop {
                    if !expanded.insert(next) {
                        continue;
                    }
                    for edge in self.provider.direct_dependencies(next, &all).await? {
                        reachable.insert(edge.to_id);
                    }
                }
                reachable.remove(&id);
                Ok(reachable.len() as f64 / 30.0)
            }
        }
    }

    async fn degrees(&self, id: SymbolId) -> Result<(usize, usize)> {
        let all = EdgeKindFilter::all();
        let incoming = self.provider.direct_dependents(id, &all).await?.len();
        let outgoing = self.provider.direct_dependencies(id, &all).await?.len();
        Ok((incoming, outgoing))
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// ─── Name heuristics ────────────────────────────────────────

static PERSISTENCE_VERB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[_.])_*(?i:create|insert|update|save|persist|delete|remove|destroy|upsert)").unwrap_or_else(|_| panic!("Invalid Regex")));

static PROCESSING_VERB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[_.])_*(?i:process|calculate|validate|transform|handle|execute|perform)").unwrap_or_else(|_| panic!("Invalid Regex")));

static SERVICE_LAYER_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)service|controller").unwrap_or_else(|_| panic!("Invalid Regex")));

static LOGGING_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^_*(?i:log|logger|logging|debug|trace)(?:[A-Z0-9_]|$)|[a-z0-9_](?:Log|Logger|Logging|_log|_logger)$").unwrap_or_else(|_| panic!("Invalid Regex")));

static OUTPUT_ACCESSOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^_*(?i:print|println|printf|echo|dump|console)(?:[A-Z0-9_]|$)|(?i:response|console)").unwrap_or_else(|_| panic!("Invalid Regex")));

/// Name/kind/location score in [0, 1], independent of the graph.
pub fn semantic_score(symbol: &Symbol, depth: Option<usize>) -> f64 {
    let mut score = match symbol.kind {
        NodeKind::Method | NodeKind::Function => 0.6,
        NodeKind::Class => 0.7,
        NodeKind::Interface => 0.5,
        NodeKind::Variable | NodeKind::Property => 0.3,
        _ => 0.5,
    };

    let name = symbol.name.as_str();
    if PERSISTENCE_VERB.is_match(name) {
        score += 0.4;
    }
    if PROCESSING_VERB.is_match(name) {
        score += 0.3;
    }
    if SERVICE_LAYER_PATH.is_match(&symbol.file_path) {
        score += 0.2;
    }
    if LOGGING_NAME.is_match(name) {
        score -= 0.5;
    }
    if OUTPUT_ACCESSOR.is_match(name) {
        score -= 0.3;
    }
    if let Some(depth) = depth {
        score += 0.2 * (1.0 - depth as f64 / 5.0).max(0.0);
    }

    clamp_unit(score)
}

// ─── Database operation classification ──────────────────────

/// Language of a symbol, as far as the database heuristics care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLanguage {
    Php,
    CSharp,
    TypeScript,
    JavaScript,
    GdScript,
    Java,
    Unknown,
}

impl SourceLanguage {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "php" => Some(Self::Php),
            "csharp" | "c#" | "cs" => Some(Self::CSharp),
            "typescript" | "ts" => Some(Self::TypeScript),
            "javascript" | "js" => Some(Self::JavaScript),
            "gdscript" | "gd" => Some(Self::GdScript),
            "java" => Some(Self::Java),
            _ => None,
        }
    }
}

static CSHARP_QUALIFIED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Za-z0-9_]*(?:\.[A-Z][A-Za-z0-9_]*)+$").unwrap_or_else(|_| panic!("Invalid Regex")));

static JAVA_QUALIFIED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*(?:\.[a-z][a-z0-9_]*)*\.[A-Z]").unwrap_or_else(|_| panic!("Invalid Regex")));

/// Language from the file extension, then the language tag, then the
/// shape of the qualified name.
pub fn detect_language(symbol: &Symbol) -> SourceLanguage {
    let extension = Path::new(&symbol.file_path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    let by_extension = match extension.as_deref() {
        Some("php") => Some(SourceLanguage::Php),
        Some("cs") => Some(SourceLanguage::CSharp),
        Some("ts" | "tsx" | "mts" | "cts") => Some(SourceLanguage::TypeScript),
        Some("js" | "jsx" | "mjs" | "cjs") => Some(SourceLanguage::JavaScript),
        Some("gd") => Some(SourceLanguage::GdScript),
        _ => None,
    };
    if let Some(language) = by_extension {
        return language;
    }
    if let Some(language) = symbol.language.as_deref().and_then(SourceLanguage::from_tag) {
        return language;
    }

    let Some(qualified) = symbol.qualified_name.as_deref() else {
        return SourceLanguage::Unknown;
    };
    if qualified.contains('\\') {
        SourceLanguage::Php
    } else if !qualified.contains("::") && CSHARP_QUALIFIED.is_match(qualified) {
        SourceLanguage::CSharp
    } else if JAVA_QUALIFIED.is_match(qualified) {
        SourceLanguage::Java
    } else if qualified.contains("@/") || qualified.contains("../") {
        SourceLanguage::TypeScript
    } else {
        SourceLanguage::Unknown
    }
}

static ELOQUENT_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"::(?:create|insert|update|save|delete|destroy|upsert|firstOrCreate|updateOrCreate|forceDelete)\b").unwrap_or_else(|_| panic!("Invalid Regex")));

static MODELS_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[/\\])[Mm]odels(?:[/\\]|$)").unwrap_or_else(|_| panic!("Invalid Regex")));

static EF_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:savechanges|executenonquery|executesqlraw|executesqlinterpolated|executeupdate|executedelete|bulkinsert|bulkupdate|bulkdelete|insertasync|updateasync|deleteasync|removerange|updaterange)(?:async)?$").unwrap_or_else(|_| panic!("Invalid Regex")));

static CSHARP_DATA_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)repositor|dbcontext|database|entit").unwrap_or_else(|_| panic!("Invalid Regex")));

static SCRIPT_ORM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)repository|prisma|orm").unwrap_or_else(|_| panic!("Invalid Regex")));

static SCRIPT_DATA_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)model|schema|entit|collection").unwrap_or_else(|_| panic!("Invalid Regex")));

static GDSCRIPT_PERSISTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:save|load)_?(?:resource|scene|config|data|game)|(?:resource|scene|config|data|game)_?(?:save|load)").unwrap_or_else(|_| panic!("Invalid Regex")));

static GENERIC_STORAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)repository|db|database|persist").unwrap_or_else(|_| panic!("Invalid Regex")));

/// Whether a symbol looks like it writes to persistent storage.
///
/// The name must start with a persistence verb; the language then decides
/// which corroborating evidence is required.
pub fn is_database_operation(symbol: &Symbol) -> bool {
    let name = symbol.name.as_str();
    if !PERSISTENCE_VERB.is_match(name) {
        return false;
    }
    let lower = name.to_ascii_lowercase();
    let path = symbol.file_path.as_str();
    let qualified = symbol.qualified_name.as_deref().unwrap_or("");

    match detect_language(symbol) {
        SourceLanguage::Php => {
            ELOQUENT_CALL.is_match(qualified)
                || MODELS_SEGMENT.is_match(path)
                || lower.contains("repository")
        }
        SourceLanguage::CSharp => {
            EF_METHOD.is_match(name)
                || CSHARP_DATA_PATH.is_match(path)
                || lower.contains("repository")
                || lower.contains("db")
        }
        SourceLanguage::TypeScript | SourceLanguage::JavaScript => {
            SCRIPT_ORM_NAME.is_match(name) || SCRIPT_DATA_PATH.is_match(path)
        }
        SourceLanguage::GdScript => GDSCRIPT_PERSISTENCE.is_match(name),
        SourceLanguage::Java | SourceLanguage::Unknown => GENERIC_STORAGE_NAME.is_match(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testing::CountingProvider;
    use crate::graph::{EdgeKind, MemoryGraph};
    use std::sync::Arc;

    fn method(id: SymbolId, name: &str, file: &str) -> Symbol {
        Symbol::new(id, name, NodeKind::Method, file)
    }

    /// 7 -> 2 -> 1, 3 -> 1, 1 -> 4 -> 6, 1 -> 5
    fn hub_graph() -> MemoryGraph {
        let mut graph = MemoryGraph::new();
        for id in 1..=7 {
            graph.add_symbol(Symbol::new(id, format!("n{id}"), NodeKind::Function, "src/n.ts"));
        }
        for (from, to) in [(2, 1), (3, 1), (1, 4), (1, 5), (4, 6), (7, 2)] {
            graph.connect(from, to, EdgeKind::Calls).unwrap();
        }
        graph
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_semantic_base_by_kind() {
        let plain = |kind| semantic_score(&Symbol::new(1, "thing", kind, "src/x.ts"), None);
        assert!(close(plain(NodeKind::Function), 0.6));
        assert!(close(plain(NodeKind::Class), 0.7));
        assert!(close(plain(NodeKind::Interface), 0.5));
        assert!(close(plain(NodeKind::Property), 0.3));
        assert!(close(plain(NodeKind::Enum), 0.5));
    }

    #[test]
    fn test_semantic_adjustments() {
        let file = "src/util.ts";
        assert!(close(semantic_score(&method(1, "saveOrder", file), None), 1.0));
        assert!(close(semantic_score(&method(1, "validateInput", file), None), 0.9));
        assert!(close(
            semantic_score(&method(1, "thing", "src/services/OrderService.ts"), None),
            0.8
        ));
        assert!(close(semantic_score(&method(1, "logError", file), None), 0.1));
        assert!(close(semantic_score(&method(1, "printSummary", file), None), 0.3));
        assert!(close(semantic_score(&method(1, "login", file), None), 0.6));
    }

    #[test]
    fn test_semantic_depth_bonus() {
        let symbol = Symbol::new(1, "thing", NodeKind::Interface, "src/x.ts");
        assert!(close(semantic_score(&symbol, Some(0)), 0.7));
        assert!(close(semantic_score(&symbol, Some(5)), 0.5));
        assert!(close(semantic_score(&symbol, Some(12)), 0.5));
    }

    #[test]
    fn test_semantic_is_clamped() {
        let logger = Symbol::new(1, "logger", NodeKind::Variable, "src/x.ts");
        assert_eq!(semantic_score(&logger, None), 0.0);
    }

    #[test]
    fn test_detect_language() {
        let with_qualified = |q: &str| method(1, "x", "unknown").with_qualified_name(q);
        assert_eq!(detect_language(&method(1, "x", "app/User.php")), SourceLanguage::Php);
        assert_eq!(detect_language(&method(1, "x", "web/api.tsx")), SourceLanguage::TypeScript);
        assert_eq!(detect_language(&method(1, "x", "scenes/player.gd")), SourceLanguage::GdScript);
        assert_eq!(
            detect_language(&with_qualified("App\\Models\\User::create")),
            SourceLanguage::Php
        );
        assert_eq!(
            detect_language(&with_qualified("MyApp.Data.UserRepository")),
            SourceLanguage::CSharp
        );
        assert_eq!(
            detect_language(&with_qualified("com.example.users.UserDao")),
            SourceLanguage::Java
        );
        assert_eq!(detect_language(&with_qualified("@/stores/user")), SourceLanguage::TypeScript);
        assert_eq!(detect_language(&with_qualified("Users::create")), SourceLanguage::Unknown);
        assert_eq!(
            detect_language(&method(1, "x", "lib.py").with_language("csharp")),
            SourceLanguage::CSharp
        );
    }

    #[test]
    fn test_database_operation_by_language() {
        assert!(is_database_operation(&method(1, "createUser", "app/Models/User.php")));
        assert!(is_database_operation(
            &method(1, "createUser", "app/Http/UserController.php")
                .with_qualified_name("App\\Models\\User::create")
        ));
        assert!(!is_database_operation(&method(1, "createUser", "app/Http/UserController.php")));
        assert!(is_database_operation(&method(1, "SaveChangesAsync", "src/Api/Orders.cs")));
        assert!(is_database_operation(&method(1, "UpdateOrder", "src/Data/Entities/Order.cs")));
        assert!(is_database_operation(&method(1, "saveUser", "src/models/user.ts")));
        assert!(is_database_operation(&method(1, "upsertPrismaUser", "src/api.js")));
        assert!(!is_database_operation(&method(1, "saveDraft", "src/ui/editor.ts")));
        assert!(is_database_operation(&method(1, "save_game", "scripts/state.gd")));
        assert!(!is_database_operation(&method(1, "save_draft", "scripts/state.gd")));
        assert!(is_database_operation(&method(1, "save_to_db", "tools/sync.py")));
        assert!(!is_database_operation(&method(1, "getUser", "app/Models/User.php")));
    }

    #[tokio::test]
    async fn test_centrality_metrics() {
        let analyzer = Analyzer::new(Arc::new(hub_graph()));
        let breakdown = analyzer
            .importance_breakdown(&ImportanceQuery::from(Symbol::new(1, "n1", NodeKind::Function, "src/n.ts")))
            .await;

        assert!(close(breakdown.betweenness, 0.2));
        assert!(close(breakdown.degree, 0.25));
        assert!(close(breakdown.eigenvector, 0.02));
        assert!(close(breakdown.closeness, 0.1));
        assert!(!breakdown.database_operation);
    }

    #[tokio::test]
    async fn test_closeness_expands_first_hops_reached_twice() {
        // 1 -> 2 -> 3 -> 4, 1 -> 3
        let mut graph = MemoryGraph::new();
        for id in 1..=4 {
            graph.add_symbol(Symbol::new(id, format!("n{id}"), NodeKind::Function, "src/n.ts"));
        }
        for (from, to) in [(1, 2), (1, 3), (2, 3), (3, 4)] {
            graph.connect(from, to, EdgeKind::Calls).unwrap();
        }
        let analyzer = Analyzer::new(Arc::new(graph));

        let breakdown = analyzer
            .importance_breakdown(&ImportanceQuery::from(Symbol::new(1, "n1", NodeKind::Function, "src/n.ts")))
            .await;
        assert!(close(breakdown.closeness, 0.1));
    }

    #[tokio::test]
    async fn test_score_in_unit_range_without_edges() {
        let analyzer = Analyzer::new(Arc::new(MemoryGraph::new()));
        let lonely = Symbol::new(9, "orphan", NodeKind::Other, "x");
        let score = analyzer.importance_score(&lonely.into(), None).await;
        assert!((0.0..=1.0).contains(&score));

        let heavy = ImportanceWeights {
            betweenness: 5.0,
            degree: 5.0,
            eigenvector: 5.0,
            closeness: 5.0,
            semantic: 5.0,
        };
        let boosted = method(10, "createUser", "app/Models/User.php");
        let score = analyzer.importance_score(&boosted.into(), Some(&heavy)).await;
        assert_eq!(score, 1.0);
    }

    #[tokio::test]
    async fn test_persistence_outranks_getter() {
        let analyzer = Analyzer::new(Arc::new(MemoryGraph::new()));
        let create = method(1, "createUser", "app/Models/User.php");
        let get = method(1, "getUser", "app/Models/User.php");

        let create_score = analyzer.importance_score(&create.into(), None).await;
        let get_score = analyzer.importance_score(&get.into(), None).await;
        assert!(close(create_score, 0.625));
        assert!(close(get_score, 0.15));
        assert!(create_score > get_score);
    }

    #[tokio::test]
    async fn test_database_depth_penalty() {
        let analyzer = Analyzer::new(Arc::new(MemoryGraph::new()));
        let create = method(1, "createUser", "app/Models/User.php");
        let shallow = analyzer
            .importance_score(&ImportanceQuery::at_depth(create.clone(), 0), None)
            .await;
        let deep = analyzer
            .importance_score(&ImportanceQuery::at_depth(create, 4), None)
            .await;
        assert!(shallow > deep);
    }

    #[tokio::test]
    async fn test_centrality_is_memoized() {
        let counting = Arc::new(CountingProvider::new(hub_graph()));
        let analyzer = Analyzer::new(counting.clone());
        let query = ImportanceQuery::from(Symbol::new(1, "n1", NodeKind::Function, "src/n.ts"));

        let first = analyzer.importance_score(&query, None).await;
        let calls = counting.calls();
        assert!(calls > 0);

        let second = analyzer.importance_score(&query, None).await;
        assert_eq!(first, second);
        assert_eq!(counting.calls(), calls);
        assert_eq!(analyzer.cache_stats().centrality_entries, 4);

        analyzer.clear_cache();
        assert_eq!(analyzer.cache_stats().centrality_entries, 0);
        analyzer.importance_score(&query, None).await;
        assert!(counting.calls() > calls);
    }

    #[tokio::test]
    async fn test_rank_is_stable_and_descending() {
        let analyzer = Analyzer::new(Arc::new(MemoryGraph::new()));
        let queries = vec![
            method(1, "alpha", "src/a.ts").into(),
            method(2, "createOrder", "src/models/order.ts").into(),
            method(3, "beta", "src/b.ts").into(),
            Symbol::new(4, "config", NodeKind::Variable, "src/c.ts").into(),
        ];

        let ranked = analyzer.rank_symbols(queries, None).await;
        let ids: Vec<SymbolId> = ranked.iter().map(|r| r.symbol.id).collect();
        assert_eq!(ids, vec![2, 1, 3, 4]);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_importance_for_unknown_id() {
        let analyzer = Analyzer::new(Arc::new(hub_graph()));
        let err = analyzer.importance_for_id(99, None, None).await.unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound(99)));

        let score = analyzer.importance_for_id(1, Some(1), None).await.unwrap();
        assert!((0.0..=1.0).contains(&score));
    }
}
