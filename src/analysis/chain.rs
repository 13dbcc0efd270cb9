//! Call chain rendering.
//!
//! Turns a path of symbol ids into a line such as
//! `UserController.store() → [POST /api/users] → createUser() (.../Models/User.php)`.
//! All lookups for a batch of paths are resolved in three provider calls.

use std::collections::{HashMap, HashSet};
use tracing::warn;

use super::Analyzer;
use crate::error::Result;
use crate::graph::{ApiCallMeta, EdgePair, NodeKind, SymbolDisplay, SymbolId};

const ARROW: &str = " → ";

/// Everything needed to label the positions of a batch of paths.
struct ChainLookup {
    display: HashMap<SymbolId, SymbolDisplay>,
    api_calls: HashMap<EdgePair, ApiCallMeta>,
    qualified: HashMap<EdgePair, String>,
}

impl Analyzer {
    /// Render one path. An empty path renders as `""` without touching the provider.
    pub async fn format_call_chain(&self, path: &[SymbolId]) -> String {
        if path.is_empty() {
            return String::new();
        }
        self.format_call_chains(&[path.to_vec()])
            .await
            .pop()
            .unwrap_or_default()
    }

    /// Render many paths with one batched resolution for all of them.
    pub async fn format_call_chains(&self, paths: &[Vec<SymbolId>]) -> Vec<String> {
        let mut rendered: Vec<Option<String>> = paths
            .iter()
            .map(|path| {
                if path.is_empty() {
                    Some(String::new())
                } else {
                    self.chains.get(path)
                }
            })
            .collect();

        let pending: Vec<&[SymbolId]> = paths
            .iter()
            .zip(&rendered)
            .filter(|(_, done)| done.is_none())
            .map(|(path, _)| path.as_slice())
            .collect();
        if pending.is_empty() {
            return rendered.into_iter().flatten().collect();
        }

        let lookup = match self.resolve_chain_lookup(&pending).await {
            Ok(lookup) => Some(lookup),
            Err(e) => {
                warn!(paths = pending.len(), error = %e, "call chain lookup failed, using raw ids");
                None
            }
        };

        for (path, slot) in paths.iter().zip(rendered.iter_mut()) {
            if slot.is_some() {
                continue;
            }
            let text = match &lookup {
                Some(lookup) => {
                    let text = render(path, lookup);
                    self.chains.insert(path.clone(), text.clone());
                    text
                }
                None => raw_chain(path),
            };
            *slot = Some(text);
        }

        rendered.into_iter().flatten().collect()
    }

    async fn resolve_chain_lookup(&self, paths: &[&[SymbolId]]) -> Result<ChainLookup> {
        let mut seen_ids = HashSet::new();
        let mut ids = Vec::new();
        let mut seen_pairs = HashSet::new();
        let mut pairs = Vec::new();

        for path in paths {
            for &id in path.iter() {
                if seen_ids.insert(id) {
                    ids.push(id);
                }
            }
            for window in path.windows(2) {
                let pair = EdgePair::new(window[0], window[1]);
                if seen_pairs.insert(pair) {
                    pairs.push(pair);
                }
            }
        }

        let display = self.provider.symbol_display_info(&ids).await?;
        let api_calls = self.provider.api_call_metadata(&pairs).await?;
        let qualified = self.provider.qualified_names(&pairs).await?;

        Ok(ChainLookup {
            display,
            api_calls,
            qualified,
        })
    }
}

fn render(path: &[SymbolId], lookup: &ChainLookup) -> String {
    let mut tokens = Vec::with_capacity(path.len() * 2);
    let mut previous_file: Option<&str> = None;

    for (position, &id) in path.iter().enumerate() {
        let incoming = (position > 0).then(|| EdgePair::new(path[position - 1], id));

        if let Some(meta) = incoming.and_then(|pair| lookup.api_calls.get(&pair)) {
            tokens.push(format!(
                "[{} {}]",
                meta.http_method.to_uppercase(),
                meta.endpoint_path
            ));
        }

        match lookup.display.get(&id) {
            Some(info) => {
                let qualified = incoming.and_then(|pair| lookup.qualified.get(&pair));
                tokens.push(label(info, qualified, previous_file));
                previous_file = Some(info.file_path.as_str());
            }
            None => {
                tokens.push(format!("Symbol({id})"));
                previous_file = None;
            }
        }
    }

    tokens.join(ARROW)
}

fn label(info: &SymbolDisplay, qualified: Option<&String>, previous_file: Option<&str>) -> String {
    let mut label = match (qualified, &info.class_hint) {
        (Some(name), _) => name.clone(),
        (None, Some(class)) if info.kind == NodeKind::Method && !class.is_empty() => {
            format!("{class}.{}", info.name)
        }
        _ => info.name.clone(),
    };

    if info.kind.is_callable() {
        label.push_str("()");
    }

    if previous_file.is_some_and(|file| file != info.file_path) {
        label.push_str(&format!(" ({})", shorten_path(&info.file_path)));
    }

    label
}

/// Keep the last two segments of paths with more than three non-empty segments.
pub fn shorten_path(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() > 3 {
        format!(".../{}/{}", segments[segments.len() - 2], segments[segments.len() - 1])
    } else {
        path.to_string()
    }
}

fn raw_chain(path: &[SymbolId]) -> String {
    let ids: Vec<String> = path.iter().map(|id| id.to_string()).collect();
    format!("Call chain [{}]", ids.join(ARROW))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testing::{CountingProvider, FailingProvider};
    use crate::graph::{CrossStackEdge, Dependency, EdgeKind, MemoryGraph, Symbol};
    use std::sync::Arc;

    fn three_file_graph() -> MemoryGraph {
        let mut graph = MemoryGraph::new();
        graph.add_symbol(
            Symbol::new(1, "store", NodeKind::Method, "app/Http/Controllers/UserController.php")
                .with_class_hint("UserController"),
        );
        graph.add_symbol(Symbol::new(
            2,
            "validate",
            NodeKind::Function,
            "app/Http/Controllers/UserController.php",
        ));
        graph.add_symbol(Symbol::new(3, "createUser", NodeKind::Method, "app/Domain/Models/User.php"));
        graph.connect(1, 2, EdgeKind::Calls).unwrap();
        graph.connect(2, 3, EdgeKind::Calls).unwrap();
        graph
    }

    #[test]
    fn test_shorten_path() {
        assert_eq!(shorten_path("src/a/b/c.ts"), ".../b/c.ts");
        assert_eq!(shorten_path("src/b/c.ts"), "src/b/c.ts");
        assert_eq!(shorten_path("/var/www/app/x.php"), ".../app/x.php");
        assert_eq!(shorten_path("C:\\proj\\src\\lib\\x.cs"), ".../lib/x.cs");
        // empty segments from a leading slash do not count
        assert_eq!(shorten_path("/src/lib/x.ts"), "/src/lib/x.ts");
    }

    #[tokio::test]
    async fn test_empty_path_makes_no_provider_calls() {
        let counting = Arc::new(CountingProvider::new(MemoryGraph::new()));
        let analyzer = Analyzer::new(counting.clone());
        assert_eq!(analyzer.format_call_chain(&[]).await, "");
        assert_eq!(counting.calls(), 0);
    }

    #[tokio::test]
    async fn test_single_function() {
        let mut graph = MemoryGraph::new();
        graph.add_symbol(Symbol::new(1, "foo", NodeKind::Function, "src/foo.ts"));
        let analyzer = Analyzer::new(Arc::new(graph));
        assert_eq!(analyzer.format_call_chain(&[1]).await, "foo()");
    }

    #[tokio::test]
    async fn test_unresolved_symbol() {
        let analyzer = Analyzer::new(Arc::new(MemoryGraph::new()));
        assert_eq!(analyzer.format_call_chain(&[42]).await, "Symbol(42)");
    }

    #[tokio::test]
    async fn test_file_change_is_annotated() {
        let analyzer = Analyzer::new(Arc::new(three_file_graph()));
        let chain = analyzer.format_call_chain(&[1, 2, 3]).await;
        assert_eq!(
            chain,
            "UserController.store() → validate() → createUser() (.../Models/User.php)"
        );
        assert!(chain.ends_with(" (.../Models/User.php)"));
    }

    #[tokio::test]
    async fn test_qualified_name_replaces_label() {
        let mut graph = MemoryGraph::new();
        graph.add_symbol(Symbol::new(1, "main", NodeKind::Function, "src/main.ts"));
        graph.add_symbol(Symbol::new(2, "save", NodeKind::Method, "src/main.ts").with_class_hint("Repo"));
        let mut dep = Dependency::new(1, 1, 2, EdgeKind::Calls);
        dep.qualified_target = Some("UserRepository.save".to_string());
        graph.add_dependency(dep).unwrap();

        let analyzer = Analyzer::new(Arc::new(graph));
        assert_eq!(
            analyzer.format_call_chain(&[1, 2]).await,
            "main() → UserRepository.save()"
        );
    }

    #[tokio::test]
    async fn test_api_call_token_between_labels() {
        let mut graph = MemoryGraph::new();
        graph.add_symbol(Symbol::new(1, "loadUsers", NodeKind::Function, "web/api.ts"));
        graph.add_symbol(
            Symbol::new(2, "index", NodeKind::Method, "app/UserController.php").with_class_hint("UserController"),
        );
        graph
            .add_cross_stack_edge(CrossStackEdge {
                id: 1,
                from_id: 1,
                to_id: 2,
                kind: EdgeKind::ApiCall,
                line: 3,
                confidence: None,
                http_method: Some("get".to_string()),
                endpoint_path: Some("/api/users".to_string()),
                from_language: Some("typescript".to_string()),
                to_language: Some("php".to_string()),
            })
            .unwrap();

        let analyzer = Analyzer::new(Arc::new(graph));
        assert_eq!(
            analyzer.format_call_chain(&[1, 2]).await,
            "loadUsers() → [GET /api/users] → UserController.index() (app/UserController.php)"
        );
    }

    #[tokio::test]
    async fn test_batch_uses_three_calls_and_caches() {
        let counting = Arc::new(CountingProvider::new(three_file_graph()));
        let analyzer = Analyzer::new(counting.clone());

        let chains = analyzer
            .format_call_chains(&[vec![1, 2], vec![1, 2, 3], vec![]])
            .await;
        assert_eq!(chains.len(), 3);
        assert_eq!(chains[2], "");
        assert_eq!(counting.calls(), 3);

        analyzer.format_call_chain(&[1, 2, 3]).await;
        assert_eq!(counting.calls(), 3);
        assert_eq!(analyzer.cache_stats().chain_entries, 2);
    }

    #[tokio::test]
    async fn test_lookup_failure_falls_back_to_ids() {
        let analyzer = Analyzer::new(Arc::new(
            FailingProvider::new(MemoryGraph::new(), []).failing_lookups(),
        ));
        assert_eq!(
            analyzer.format_call_chain(&[1, 2, 3]).await,
            "Call chain [1 → 2 → 3]"
        );
        assert_eq!(analyzer.cache_stats().chain_entries, 0);
    }
}
