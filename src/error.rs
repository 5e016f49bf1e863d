use thiserror::Error;

/// Result type for graph queries
pub type LineageResult<T> = std::result::Result<T, LineageError>;

/// Errors raised by the lineage graph core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineageError {
    /// A query reached a path that was never inserted
    #[error("missing node for path {path}")]
    MissingNode { path: String },
}

impl LineageError {
    pub fn missing_node(path: impl Into<String>) -> Self {
        Self::MissingNode { path: path.into() }
    }

    /// Path that triggered the error
    pub fn path(&self) -> &str {
        match self {
            Self::MissingNode { path } => path,
        }
    }
}
