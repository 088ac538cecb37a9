//! Billing domain errors
//!
//! Store failures are wrapped with the identity of the bill being
//! processed before they leave this crate, so callers can diagnose a
//! failed write without seeing raw store errors.

use thiserror::Error;

use core_kernel::BillId;
use domain_ledger::StoreError;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Caller-supplied input violates a precondition
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Referenced bill does not exist
    #[error("Bill not found: {0}")]
    BillNotFound(BillId),

    /// Bill creation could not commit
    #[error("Bill creation failed: {source}")]
    CreateFailed {
        #[source]
        source: StoreError,
    },

    /// The payment transaction could not commit
    #[error("Payment transaction failed for bill {bill_id}: {source}")]
    Transaction {
        bill_id: BillId,
        #[source]
        source: StoreError,
    },

    /// A settlement automation handler failed inside the payment transaction
    #[error("Settlement automation '{handler}' failed for bill {bill_id}: {source}")]
    Automation {
        handler: &'static str,
        bill_id: BillId,
        #[source]
        source: AutomationError,
    },
}

impl BillingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BillingError::Validation(message.into())
    }
}

/// Errors raised by settlement automation handlers
#[derive(Debug, Error)]
pub enum AutomationError {
    /// Store operation failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The downstream state did not permit the reaction
    #[error("Workflow error: {0}")]
    Workflow(String),
}

impl AutomationError {
    pub fn workflow(message: impl Into<String>) -> Self {
        AutomationError::Workflow(message.into())
    }
}
