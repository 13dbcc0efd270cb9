//! Error types for the analysis engine.

use thiserror::Error;

use crate::graph::SymbolId;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The requested root, start or end symbol does not exist.
    #[error("symbol not found: {0}")]
    NotFound(SymbolId),

    /// A graph provider fetch failed.
    #[error("provider failure during {operation} for symbol {symbol}: {message}")]
    Provider {
        operation: &'static str,
        symbol: SymbolId,
        message: String,
    },

    #[error("analysis cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Build a provider failure from any displayable source error.
    pub fn provider(
        operation: &'static str,
        symbol: SymbolId,
        source: impl std::fmt::Display,
    ) -> Self {
        Self::Provider {
            operation,
            symbol,
            message: source.to_string(),
        }
    }
}
