//! Settlement domain errors

use thiserror::Error;

use core_kernel::{DoctorId, PortError};
use domain_ledger::StoreError;

/// Errors that can occur in the settlement domain
#[derive(Debug, Error)]
pub enum SettlementError {
    /// Caller-supplied input violates a precondition
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The doctor directory could not answer
    #[error("Doctor directory lookup failed for {doctor_id}: {source}")]
    Directory {
        doctor_id: DoctorId,
        #[source]
        source: PortError,
    },

    /// The payout transaction could not commit
    #[error("Settlement transaction failed for doctor {doctor_id}: {source}")]
    Transaction {
        doctor_id: DoctorId,
        #[source]
        source: StoreError,
    },
}

impl SettlementError {
    pub fn validation(message: impl Into<String>) -> Self {
        SettlementError::Validation(message.into())
    }
}
