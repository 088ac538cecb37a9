//! Doctor settlement payout records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DoctorId, Money, SettlementId};

/// A recorded commission payout to a doctor for a billing period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSettlement {
    /// Unique identifier
    pub id: SettlementId,
    /// Doctor being paid
    pub doctor_id: DoctorId,
    /// Payout amount
    pub amount: Money,
    /// First day of the settled period
    pub period_start: NaiveDate,
    /// Last day of the settled period
    pub period_end: NaiveDate,
    /// When the payout was recorded
    pub paid_at: DateTime<Utc>,
    /// External reference (bank transfer id)
    pub reference: Option<String>,
    /// Free-form remarks
    pub remarks: Option<String>,
}

impl DoctorSettlement {
    /// Records a payout for a period
    pub fn new(
        doctor_id: DoctorId,
        amount: Money,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Self {
        Self {
            id: SettlementId::new_v7(),
            doctor_id,
            amount,
            period_start,
            period_end,
            paid_at: Utc::now(),
            reference: None,
            remarks: None,
        }
    }

    /// Sets the external reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Sets free-form remarks
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }
}
