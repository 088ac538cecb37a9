//! Settlement automation handlers
//!
//! When a bill settles, the payment processor dispatches the
//! `PaymentSettled` event to these handlers inside its own transaction.
//! Each handler checks its linkage and does nothing when it does not
//! apply, so registering both on every processor is safe:
//!
//! - admission-linked bill → discharge + bed release
//! - plain bill for a patient with a surgery awaiting deposit → schedule it
//! - neither → no automation fires (plain outpatient bill)

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use core_kernel::PatientId;
use domain_billing::{
    AutomationError, Notification, PaymentSettled, SettlementAutomation, StaffRole,
};
use domain_ledger::{LedgerTx, OperationStatus};

use crate::ports::PatientDirectory;

/// Discharges the admission linked to a settled bill and frees its bed
pub struct AdmissionDischargeAutomation {
    patients: Arc<dyn PatientDirectory>,
}

impl AdmissionDischargeAutomation {
    pub fn new(patients: Arc<dyn PatientDirectory>) -> Self {
        Self { patients }
    }
}

#[async_trait]
impl SettlementAutomation for AdmissionDischargeAutomation {
    fn name(&self) -> &'static str {
        "admission-discharge"
    }

    async fn on_bill_settled(
        &self,
        tx: &mut dyn LedgerTx,
        event: &PaymentSettled,
    ) -> Result<Vec<Notification>, AutomationError> {
        let Some(admission_id) = event.admission_id else {
            return Ok(Vec::new());
        };

        let mut admission = tx
            .admission(admission_id)
            .await?
            .ok_or_else(|| {
                AutomationError::workflow(format!(
                    "bill {} references missing admission {}",
                    event.bill_id, admission_id
                ))
            })?;

        if !admission.discharge() {
            // Already discharged; a replayed settlement must not notify twice.
            debug!(admission_id = %admission_id, "admission already discharged");
            return Ok(Vec::new());
        }
        tx.update_admission(&admission).await?;

        match tx.bed(admission.bed_id).await? {
            Some(mut bed) => {
                bed.release();
                tx.update_bed(&bed).await?;
            }
            None => {
                // Bed rows can lag behind ward reshuffles; discharge still stands.
                warn!(bed_id = %admission.bed_id, "discharged admission references missing bed");
            }
        }

        let patient = display_name(self.patients.as_ref(), event.patient_id).await;
        info!(
            admission_id = %admission_id,
            bill_id = %event.bill_id,
            "admission discharged on bill settlement"
        );
        Ok(vec![Notification::for_role(
            StaffRole::Admin,
            "Patient discharged",
            format!(
                "{} has settled bill {} and been discharged; bed {} is available",
                patient, event.bill_id, admission.bed_id
            ),
        )])
    }
}

/// Schedules a patient's awaiting-deposit surgery once their bill settles
pub struct OperationConfirmationAutomation {
    patients: Arc<dyn PatientDirectory>,
}

impl OperationConfirmationAutomation {
    pub fn new(patients: Arc<dyn PatientDirectory>) -> Self {
        Self { patients }
    }
}

#[async_trait]
impl SettlementAutomation for OperationConfirmationAutomation {
    fn name(&self) -> &'static str {
        "operation-confirmation"
    }

    async fn on_bill_settled(
        &self,
        tx: &mut dyn LedgerTx,
        event: &PaymentSettled,
    ) -> Result<Vec<Notification>, AutomationError> {
        if event.admission_id.is_some() {
            // Admission-linked bills belong to the discharge branch.
            return Ok(Vec::new());
        }

        let mut awaiting = tx.operations_awaiting_deposit(event.patient_id).await?;
        let Some(operation) = awaiting.first_mut() else {
            return Ok(Vec::new());
        };

        operation
            .update_status(OperationStatus::Scheduled)
            .map_err(|err| AutomationError::workflow(err.to_string()))?;
        tx.update_operation(operation).await?;

        let patient = display_name(self.patients.as_ref(), event.patient_id).await;
        info!(
            operation_id = %operation.id,
            bill_id = %event.bill_id,
            "operation scheduled on deposit settlement"
        );
        Ok(vec![Notification::for_role(
            StaffRole::OtStaff,
            "Operation scheduled",
            format!(
                "Deposit received for {}; operation {} is confirmed for scheduling",
                patient, operation.id
            ),
        )])
    }
}

/// Resolves a display name, degrading to the raw id on directory failure
async fn display_name(directory: &dyn PatientDirectory, patient_id: PatientId) -> String {
    match directory.patient_name(patient_id).await {
        Ok(Some(name)) => name,
        Ok(None) => patient_id.to_string(),
        Err(err) => {
            debug!(patient_id = %patient_id, error = %err, "patient directory lookup failed");
            patient_id.to_string()
        }
    }
}
