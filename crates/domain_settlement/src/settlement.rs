//! Settlement calculation and payout recording

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use core_kernel::{Currency, DoctorId, Money};
use domain_ledger::{DoctorSettlement, LedgerStore};

use crate::error::SettlementError;
use crate::ports::DoctorDirectory;

/// Request to record a commission payout
#[derive(Debug, Clone)]
pub struct DoctorPayout {
    /// Doctor being paid
    pub doctor_id: DoctorId,
    /// Payout amount; must be positive
    pub amount: Money,
    /// First day of the settled period
    pub period_start: NaiveDate,
    /// Last day of the settled period
    pub period_end: NaiveDate,
    /// External reference (bank transfer id)
    pub reference: Option<String>,
    /// Free-form remarks
    pub remarks: Option<String>,
}

/// Computes commission payouts and records them
pub struct SettlementCalculator {
    store: Arc<dyn LedgerStore>,
    doctors: Arc<dyn DoctorDirectory>,
    /// Currency of the zero returned when no rate is on file
    currency: Currency,
}

impl SettlementCalculator {
    /// Creates a calculator over a ledger store and doctor directory
    pub fn new(
        store: Arc<dyn LedgerStore>,
        doctors: Arc<dyn DoctorDirectory>,
        currency: Currency,
    ) -> Self {
        Self {
            store,
            doctors,
            currency,
        }
    }

    /// Computes the commission owed to a doctor for a period.
    ///
    /// `Σ completed consultation fees × rate/100`, rounded to currency
    /// precision. A doctor with no commission rate on file earns zero.
    /// Pure read: safe to cancel at any await point, nothing is written.
    pub async fn calculate(
        &self,
        doctor_id: DoctorId,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Money, SettlementError> {
        let wrap = |source| SettlementError::Directory { doctor_id, source };

        let Some(rate) = self.doctors.commission_rate(doctor_id).await.map_err(wrap)? else {
            return Ok(Money::zero(self.currency));
        };

        let fees = self
            .doctors
            .completed_consultation_fees(doctor_id, period_start, period_end)
            .await
            .map_err(wrap)?;

        Ok(rate.apply(&fees).round_to_currency())
    }

    /// Records a commission payout.
    ///
    /// # Errors
    ///
    /// `Validation` if the amount is not positive or the doctor id is
    /// nil; `Transaction` on store failure.
    pub async fn process_payment(
        &self,
        payout: DoctorPayout,
    ) -> Result<DoctorSettlement, SettlementError> {
        if payout.doctor_id.is_nil() {
            return Err(SettlementError::validation("doctor id must be set"));
        }
        if !payout.amount.is_positive() {
            return Err(SettlementError::validation(format!(
                "payout amount must be positive, got {}",
                payout.amount
            )));
        }

        let doctor_id = payout.doctor_id;
        let mut settlement = DoctorSettlement::new(
            doctor_id,
            payout.amount,
            payout.period_start,
            payout.period_end,
        );
        if let Some(reference) = payout.reference {
            settlement = settlement.with_reference(reference);
        }
        if let Some(remarks) = payout.remarks {
            settlement = settlement.with_remarks(remarks);
        }

        let mut tx = self
            .store
            .begin()
            .await
            .map_err(|source| SettlementError::Transaction { doctor_id, source })?;

        match tx.insert_doctor_settlement(&settlement).await {
            Ok(()) => {
                tx.commit()
                    .await
                    .map_err(|source| SettlementError::Transaction { doctor_id, source })?;
            }
            Err(source) => {
                if let Err(err) = tx.rollback().await {
                    tracing::warn!(error = %err, "transaction rollback failed");
                }
                return Err(SettlementError::Transaction { doctor_id, source });
            }
        }

        info!(
            settlement_id = %settlement.id,
            doctor_id = %doctor_id,
            amount = %settlement.amount,
            "doctor settlement recorded"
        );
        Ok(settlement)
    }
}
