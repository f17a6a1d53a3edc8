//! Domain error model.

use thiserror::Error;

/// Failures the domain layer reports on its own, without knowing about
/// HTTP or storage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Raised by id parsing; the text names the id type and what was wrong.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
