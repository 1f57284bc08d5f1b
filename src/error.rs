use thiserror::Error;

/// Errors raised while parsing selectors or projecting a tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// Structural problem in a selector string (unbalanced braces, dangling dot chain)
    #[error("malformed selector at position {position}: {reason}")]
    MalformedSelector { position: usize, reason: String },

    /// Bracket text has the shape of an index but the number does not fit
    #[error("invalid array index in `{token}`")]
    InvalidIndex { token: String },

    /// A root bracket addressed an element past the end of the top-level array
    #[error("root index {index} is out of bounds for an array of length {len}")]
    RootOutOfBounds { index: i64, len: usize },
}

impl SelectError {
    pub(crate) fn malformed(position: usize, reason: impl Into<String>) -> Self {
        SelectError::MalformedSelector {
            position,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SelectError>;
