//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a user-facing, synchronous rejection of the current
/// operation. Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated (e.g. an unbalanced entry).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// The operation is not allowed in the current state or with the given
    /// inputs (wrong state, missing journal, empty lines, missing account).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The operation would not change anything (values below epsilon, no
    /// accounting rows, non-positive total).
    #[error("nothing to post: {0}")]
    NoEffect(String),

    /// Master data is missing (e.g. no valuation account for a product).
    #[error("missing configuration: {0}")]
    MissingConfiguration(String),

    /// One or more picking lines carry a zero valuation.
    #[error(
        "operation blocked: one or more lines have a zero valuation (products: {})",
        .products.join(", ")
    )]
    ZeroValue { products: Vec<String> },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred (e.g. stale version / optimistic concurrency).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    pub fn no_effect(msg: impl Into<String>) -> Self {
        Self::NoEffect(msg.into())
    }

    pub fn missing_configuration(msg: impl Into<String>) -> Self {
        Self::MissingConfiguration(msg.into())
    }

    pub fn zero_value(products: Vec<String>) -> Self {
        Self::ZeroValue { products }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_value_message_lists_every_product() {
        let err = DomainError::zero_value(vec!["Desk".to_string(), "Chair".to_string()]);
        let msg = err.to_string();
        assert!(msg.contains("Desk, Chair"), "{msg}");
    }
}
