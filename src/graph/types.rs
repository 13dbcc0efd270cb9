//! Core types for the dependency graph.
//!
//! Defines symbol kinds, edge kinds, and the read-only snapshots of
//! symbols and relationships handed to the engine by a provider.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Unique identifier of a symbol, as assigned by the graph store.
pub type SymbolId = i64;

/// The kind of a symbol in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A free function.
    Function,
    /// A function defined inside a class, struct or impl.
    Method,
    /// A class definition (PHP, C#, JS/TS, Java).
    Class,
    /// An interface definition.
    Interface,
    /// A local or module-level variable.
    Variable,
    /// A field or property on a type.
    Property,
    /// A struct definition.
    Struct,
    /// An enum definition.
    Enum,
    /// A trait definition.
    Trait,
    /// A constant or static value.
    Constant,
    /// A module or namespace.
    Module,
    /// A type alias.
    Type,
    /// Anything the indexer could not classify.
    #[serde(other)]
    Other,
}

impl NodeKind {
    /// Whether a label for this kind is rendered with a trailing `()`.
    pub fn is_callable(self) -> bool {
        matches!(self, NodeKind::Function | NodeKind::Method)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Function => write!(f, "function"),
            NodeKind::Method => write!(f, "method"),
            NodeKind::Class => write!(f, "class"),
            NodeKind::Interface => write!(f, "interface"),
            NodeKind::Variable => write!(f, "variable"),
            NodeKind::Property => write!(f, "property"),
            NodeKind::Struct => write!(f, "struct"),
            NodeKind::Enum => write!(f, "enum"),
            NodeKind::Trait => write!(f, "trait"),
            NodeKind::Constant => write!(f, "constant"),
            NodeKind::Module => write!(f, "module"),
            NodeKind::Type => write!(f, "type"),
            NodeKind::Other => write!(f, "other"),
        }
    }
}

/// The kind of an edge (relationship) in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Symbol calls another symbol.
    Calls,
    /// Symbol imports another symbol or module.
    Imports,
    /// Frontend code issues an HTTP call handled by a backend route.
    ApiCall,
    /// Two symbols serialize the same schema across stacks.
    SharesSchema,
    /// Generic frontend-to-backend link.
    FrontendBackend,
    /// Generic reference between symbols.
    References,
    /// Class extends another class.
    Inherits,
    /// Type implements an interface or trait.
    Implements,
    /// A container holds a symbol.
    Contains,
}

impl EdgeKind {
    /// Edge kinds that connect symbols across language stacks.
    pub const CROSS_STACK: [EdgeKind; 3] = [
        EdgeKind::ApiCall,
        EdgeKind::SharesSchema,
        EdgeKind::FrontendBackend,
    ];
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Calls => write!(f, "calls"),
            EdgeKind::Imports => write!(f, "imports"),
            EdgeKind::ApiCall => write!(f, "api_call"),
            EdgeKind::SharesSchema => write!(f, "shares_schema"),
            EdgeKind::FrontendBackend => write!(f, "frontend_backend"),
            EdgeKind::References => write!(f, "references"),
            EdgeKind::Inherits => write!(f, "inherits"),
            EdgeKind::Implements => write!(f, "implements"),
            EdgeKind::Contains => write!(f, "contains"),
        }
    }
}

/// A symbol as stored by the external graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    /// The bare name (e.g., "createUser", "UserService").
    pub name: String,
    pub kind: NodeKind,
    /// Enclosing class for methods, when the indexer resolved one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_hint: Option<String>,
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Symbol {
    pub fn new(
        id: SymbolId,
        name: impl Into<String>,
        kind: NodeKind,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            class_hint: None,
            file_path: file_path.into(),
            qualified_name: None,
            language: None,
        }
    }

    pub fn with_class_hint(mut self, class: impl Into<String>) -> Self {
        self.class_hint = Some(class.into());
        self
    }

    pub fn with_qualified_name(mut self, name: impl Into<String>) -> Self {
        self.qualified_name = Some(name.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn summary(&self) -> SymbolSummary {
        SymbolSummary {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            file_path: self.file_path.clone(),
        }
    }

    pub fn display(&self) -> SymbolDisplay {
        SymbolDisplay {
            name: self.name.clone(),
            kind: self.kind,
            class_hint: self.class_hint.clone(),
            file_path: self.file_path.clone(),
        }
    }
}

/// Lightweight description of an edge endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSummary {
    pub id: SymbolId,
    pub name: String,
    pub kind: NodeKind,
    pub file_path: String,
}

/// What the call-chain formatter needs to label one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDisplay {
    pub name: String,
    pub kind: NodeKind,
    pub class_hint: Option<String>,
    pub file_path: String,
}

/// A directed dependency between two symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: i64,
    pub from_id: SymbolId,
    pub to_id: SymbolId,
    pub kind: EdgeKind,
    #[serde(default)]
    pub line: u32,
    /// Reliability of the extracted edge in [0, 1]; absent means certain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_symbol: Option<SymbolSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_symbol: Option<SymbolSummary>,
}

impl Dependency {
    pub fn new(id: i64, from_id: SymbolId, to_id: SymbolId, kind: EdgeKind) -> Self {
        Self {
            id,
            from_id,
            to_id,
            kind,
            line: 0,
            confidence: None,
            qualified_target: None,
            from_symbol: None,
            to_symbol: None,
        }
    }

    /// Confidence with the absent-means-1.0 default applied, clamped to [0, 1].
    /// Non-finite values count as certain.
    pub fn effective_confidence(&self) -> f64 {
        match self.confidence {
            Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
            _ => 1.0,
        }
    }

    pub fn pair(&self) -> EdgePair {
        EdgePair::new(self.from_id, self.to_id)
    }
}

/// A dependency crossing language stacks, kept in its own relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossStackEdge {
    pub id: i64,
    pub from_id: SymbolId,
    pub to_id: SymbolId,
    pub kind: EdgeKind,
    #[serde(default)]
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_language: Option<String>,
}

impl CrossStackEdge {
    /// View this edge as a plain dependency, for traversal results.
    pub fn as_dependency(&self) -> Dependency {
        Dependency {
            id: self.id,
            from_id: self.from_id,
            to_id: self.to_id,
            kind: self.kind,
            line: self.line,
            confidence: self.confidence,
            qualified_target: None,
            from_symbol: None,
            to_symbol: None,
        }
    }
}

/// A consecutive (from, to) pair in a path, used as a batch lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgePair {
    pub from: SymbolId,
    pub to: SymbolId,
}

impl EdgePair {
    pub fn new(from: SymbolId, to: SymbolId) -> Self {
        Self { from, to }
    }
}

/// HTTP details of a cross-stack API call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCallMeta {
    pub http_method: String,
    pub endpoint_path: String,
}

/// Include/exclude sets over edge kinds.
///
/// An empty or absent include set admits every kind; exclusions always win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeKindFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<HashSet<EdgeKind>>,
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    pub exclude: HashSet<EdgeKind>,
}

impl EdgeKindFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only(kinds: impl IntoIterator<Item = EdgeKind>) -> Self {
        Self {
            include: Some(kinds.into_iter().collect()),
            exclude: HashSet::new(),
        }
    }

    pub fn allows(&self, kind: EdgeKind) -> bool {
        if self.exclude.contains(&kind) {
            return false;
        }
        match &self.include {
            Some(include) if !include.is_empty() => include.contains(&kind),
            _ => true,
        }
    }
}
