//! Shift domain errors

use thiserror::Error;

use core_kernel::ShiftId;
use domain_ledger::StoreError;

/// Errors that can occur in the shift domain
#[derive(Debug, Error)]
pub enum ShiftError {
    /// Caller-supplied input violates a precondition
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Referenced shift does not exist
    #[error("Shift not found: {0}")]
    ShiftNotFound(ShiftId),

    /// The shift was already closed; close is terminal
    #[error("Shift already closed: {0}")]
    AlreadyClosed(ShiftId),

    /// The shift transaction could not commit
    #[error("Shift transaction failed for {context}: {source}")]
    Transaction {
        context: String,
        #[source]
        source: StoreError,
    },
}

impl ShiftError {
    pub fn validation(message: impl Into<String>) -> Self {
        ShiftError::Validation(message.into())
    }

    pub(crate) fn transaction(context: impl Into<String>) -> impl FnOnce(StoreError) -> Self {
        let context = context.into();
        move |source| ShiftError::Transaction { context, source }
    }
}
