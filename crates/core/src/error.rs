//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Reserved for contract violations detected at construction time (malformed
/// retry state, records without a reference number). Transport failures never
/// surface through this type; they stay inside the messaging client's own
/// error and are consumed by the retry loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let err = DomainError::validation("attempt must be >= 1");
        assert_eq!(err.to_string(), "validation failed: attempt must be >= 1");
    }
}
