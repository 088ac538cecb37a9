//! Store error types
//!
//! `StoreError` is the error currency of the [`crate::ports`] contract.
//! It is database-agnostic; the sqlx adapter maps driver errors onto these
//! variants so domain services never see raw database errors.

use thiserror::Error;

/// Errors surfaced by ledger store adapters
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to reach the underlying store
    #[error("Failed to connect to store: {0}")]
    Connection(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    Query(String),

    /// Entity not found
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// Foreign key or check constraint violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// The transaction could not commit
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Stored data could not be decoded into a domain record
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Creates a not found error for a specific entity type and identifier
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        StoreError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// Checks if this error is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::Duplicate(_) | StoreError::Constraint(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_helper() {
        let error = StoreError::not_found("Bill", "BIL-123");
        assert!(error.is_not_found());
        assert!(error.to_string().contains("Bill"));
        assert!(error.to_string().contains("BIL-123"));
    }

    #[test]
    fn test_constraint_classification() {
        assert!(StoreError::Duplicate("shift".into()).is_constraint_violation());
        assert!(StoreError::Constraint("fk".into()).is_constraint_violation());
        assert!(!StoreError::Query("boom".into()).is_constraint_violation());
    }
}
