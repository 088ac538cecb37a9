//! Clinical domain errors

use thiserror::Error;

use core_kernel::{AdmissionId, OperationId};
use domain_ledger::operation::InvalidTransition;
use domain_ledger::StoreError;

/// Errors that can occur in the clinical workflow domain
#[derive(Debug, Error)]
pub enum ClinicalError {
    /// Caller-supplied input violates a precondition
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Referenced operation does not exist
    #[error("Operation not found: {0}")]
    OperationNotFound(OperationId),

    /// Referenced admission does not exist
    #[error("Admission not found: {0}")]
    AdmissionNotFound(AdmissionId),

    /// The state machine rejected the transition
    #[error("{0}")]
    InvalidStatusTransition(#[from] InvalidTransition),

    /// The operation's transaction could not commit
    #[error("Clinical transaction failed for operation {operation_id}: {source}")]
    Transaction {
        operation_id: OperationId,
        #[source]
        source: StoreError,
    },

    /// A read-only query failed
    #[error("Clinical query failed: {0}")]
    Query(#[from] StoreError),
}

impl ClinicalError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClinicalError::Validation(message.into())
    }
}
