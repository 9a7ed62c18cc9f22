use thiserror::Error;

use crate::visit::VisitKind;

/// Errors raised while walking a tree or committing a visit.
#[derive(Debug, Error)]
pub enum WalkError {
    /// Invalid call shape, e.g. a bare string as the traversal root.
    #[error("configuration error: {0}")]
    Config(String),

    /// `commit` on a visit that has no parent slot to write into.
    #[error("cannot modify a {0} visit in place: it has no parent slot")]
    Unmodifiable(VisitKind),

    /// A key rename targets a key already used by a different entry.
    #[error("cannot rename key to {key:?}: the key already exists")]
    KeyCollision { key: String },

    /// A key rename whose source key is no longer in the mapping.
    #[error("key not found: {key:?}")]
    MissingKey { key: String },
}

impl WalkError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Errors from loading or saving JSON documents.
#[derive(Debug, Error)]
pub enum DocError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("empty file")]
    Empty,
}
