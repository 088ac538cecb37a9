//! Operation lifecycle management
//!
//! Advances surgeries through their state machine and answers the two
//! scheduling questions around them: which operations already hold a
//! theater on a date, and whether a doctor's weekly schedule covers an
//! instant.
//!
//! Theater/date double-booking is deliberately NOT enforced at write
//! time: [`OperationLifecycle::theater_bookings`] is an advisory query
//! the scheduling desk consults before confirming a slot. Two desks
//! confirming the same slot concurrently will both succeed; the ward
//! board resolves such clashes manually today.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use core_kernel::{DoctorId, OperationId, PackageId, PatientId, TheaterId};
use domain_ledger::{
    LedgerStore, LedgerTx, OperationRevision, OperationStatus, PatientOperation,
};

use crate::error::ClinicalError;

/// Request to propose a new operation
#[derive(Debug, Clone)]
pub struct NewOperation {
    /// Patient undergoing surgery
    pub patient_id: PatientId,
    /// Operating doctor
    pub doctor_id: DoctorId,
    /// Optional surgery package
    pub package_id: Option<PackageId>,
}

/// Drives the surgery state machine
pub struct OperationLifecycle {
    store: Arc<dyn LedgerStore>,
}

impl OperationLifecycle {
    /// Creates a lifecycle manager over a ledger store
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Proposes a new operation for a patient.
    ///
    /// # Errors
    ///
    /// `Validation` if either id is nil; `Transaction` on store failure.
    pub async fn create_operation(
        &self,
        request: NewOperation,
    ) -> Result<PatientOperation, ClinicalError> {
        if request.patient_id.is_nil() {
            return Err(ClinicalError::validation("patient id must be set"));
        }
        if request.doctor_id.is_nil() {
            return Err(ClinicalError::validation("doctor id must be set"));
        }

        let mut operation = PatientOperation::propose(request.patient_id, request.doctor_id);
        if let Some(package_id) = request.package_id {
            operation = operation.with_package(package_id);
        }
        let operation_id = operation.id;

        let mut tx = self.begin(operation_id).await?;
        match tx.insert_operation(&operation).await {
            Ok(()) => {
                tx.commit()
                    .await
                    .map_err(|source| ClinicalError::Transaction { operation_id, source })?;
            }
            Err(source) => {
                rollback_quietly(tx).await;
                return Err(ClinicalError::Transaction { operation_id, source });
            }
        }

        info!(
            operation_id = %operation.id,
            patient_id = %operation.patient_id,
            "operation proposed"
        );
        Ok(operation)
    }

    /// Applies a revision: status and costs always overwritten, other
    /// fields retained when absent.
    ///
    /// # Errors
    ///
    /// `OperationNotFound`, `InvalidStatusTransition`, or `Transaction`.
    pub async fn revise(
        &self,
        operation_id: OperationId,
        revision: OperationRevision,
    ) -> Result<PatientOperation, ClinicalError> {
        let mut tx = self.begin(operation_id).await?;

        let result = async {
            let mut operation = tx
                .operation_for_update(operation_id)
                .await
                .map_err(|source| ClinicalError::Transaction { operation_id, source })?
                .ok_or(ClinicalError::OperationNotFound(operation_id))?;

            operation.apply_revision(revision)?;
            tx.update_operation(&operation)
                .await
                .map_err(|source| ClinicalError::Transaction { operation_id, source })?;
            Ok(operation)
        }
        .await;

        match result {
            Ok(operation) => {
                tx.commit()
                    .await
                    .map_err(|source| ClinicalError::Transaction { operation_id, source })?;
                info!(
                    operation_id = %operation.id,
                    status = %operation.status,
                    "operation revised"
                );
                Ok(operation)
            }
            Err(err) => {
                rollback_quietly(tx).await;
                Err(err)
            }
        }
    }

    /// Cancels an operation from any pre-Completed state
    pub async fn cancel(&self, operation_id: OperationId) -> Result<PatientOperation, ClinicalError> {
        self.revise(
            operation_id,
            OperationRevision {
                status: Some(OperationStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
    }

    /// Flips the ward-transfer flag on a completed operation.
    ///
    /// Returns `true` when the flag flipped, `false` when it was already
    /// set (the repeat call is a no-op, not an error).
    pub async fn mark_transferred(&self, operation_id: OperationId) -> Result<bool, ClinicalError> {
        let mut tx = self.begin(operation_id).await?;

        let result = async {
            let mut operation = tx
                .operation_for_update(operation_id)
                .await
                .map_err(|source| ClinicalError::Transaction { operation_id, source })?
                .ok_or(ClinicalError::OperationNotFound(operation_id))?;

            let flipped = operation.mark_transferred()?;
            if flipped {
                tx.update_operation(&operation)
                    .await
                    .map_err(|source| ClinicalError::Transaction { operation_id, source })?;
            }
            Ok(flipped)
        }
        .await;

        match result {
            Ok(flipped) => {
                tx.commit()
                    .await
                    .map_err(|source| ClinicalError::Transaction { operation_id, source })?;
                if flipped {
                    info!(operation_id = %operation_id, "patient transferred to ward");
                }
                Ok(flipped)
            }
            Err(err) => {
                rollback_quietly(tx).await;
                Err(err)
            }
        }
    }

    /// Reads one operation
    pub async fn operation(&self, operation_id: OperationId) -> Result<PatientOperation, ClinicalError> {
        let mut tx = self.begin(operation_id).await?;
        let found = tx
            .operation(operation_id)
            .await
            .map_err(ClinicalError::Query);
        rollback_quietly(tx).await;
        found?.ok_or(ClinicalError::OperationNotFound(operation_id))
    }

    /// Operations already holding a theater on a date (Scheduled or
    /// Running). Advisory: callers consult this before confirming a slot.
    pub async fn theater_bookings(
        &self,
        theater: TheaterId,
        date: NaiveDate,
    ) -> Result<Vec<PatientOperation>, ClinicalError> {
        let mut tx = self.store.begin().await.map_err(ClinicalError::Query)?;
        let bookings = tx
            .operations_for_theater_on(theater, date)
            .await
            .map_err(ClinicalError::Query);
        rollback_quietly(tx).await;
        bookings
    }

    /// Returns true when some active weekly schedule block for the doctor
    /// covers the instant (inclusive bounds). Pure read.
    pub async fn doctor_available_at(
        &self,
        doctor: DoctorId,
        when: DateTime<Utc>,
    ) -> Result<bool, ClinicalError> {
        let mut tx = self.store.begin().await.map_err(ClinicalError::Query)?;
        let schedules = tx
            .schedules_for_doctor(doctor)
            .await
            .map_err(ClinicalError::Query);
        rollback_quietly(tx).await;
        Ok(schedules?.iter().any(|block| block.covers(when)))
    }

    async fn begin(&self, operation_id: OperationId) -> Result<Box<dyn LedgerTx>, ClinicalError> {
        self.store
            .begin()
            .await
            .map_err(|source| ClinicalError::Transaction { operation_id, source })
    }
}

async fn rollback_quietly(tx: Box<dyn LedgerTx>) {
    if let Err(err) = tx.rollback().await {
        tracing::warn!(error = %err, "transaction rollback failed");
    }
}
