//! Domain events for the billing write paths
//!
//! Events capture the significant financial occurrences. They feed audit
//! trails and drive the settlement automation dispatch: a bill reaching
//! Paid produces a [`PaymentSettled`] that the clinical handlers consume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AdmissionId, BillId, Money, PatientId, PaymentId};
use domain_ledger::PaymentMethod;

/// Payload of a bill reaching fully-paid state
///
/// Carries enough context for handlers to act without re-reading the
/// bill: the admission linkage decides the discharge branch, the patient
/// id drives the operation-confirmation lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSettled {
    /// The settled bill
    pub bill_id: BillId,
    /// Patient who owed the bill
    pub patient_id: PatientId,
    /// Ward admission linked to the bill, if any
    pub admission_id: Option<AdmissionId>,
    /// The bill's total amount
    pub total_amount: Money,
    /// When settlement was detected
    pub settled_at: DateTime<Utc>,
}

/// Domain events emitted by the billing write paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BillingEvent {
    /// A bill and its items were created
    BillCreated {
        bill_id: BillId,
        patient_id: PatientId,
        total_amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// A payment was recorded against a bill
    PaymentRecorded {
        bill_id: BillId,
        payment_id: PaymentId,
        amount: Money,
        method: PaymentMethod,
        timestamp: DateTime<Utc>,
    },

    /// A bill transitioned to fully paid
    PaymentSettled(PaymentSettled),
}

impl BillingEvent {
    /// Returns the bill ID associated with this event
    pub fn bill_id(&self) -> BillId {
        match self {
            BillingEvent::BillCreated { bill_id, .. } => *bill_id,
            BillingEvent::PaymentRecorded { bill_id, .. } => *bill_id,
            BillingEvent::PaymentSettled(settled) => settled.bill_id,
        }
    }

    /// Returns the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            BillingEvent::BillCreated { timestamp, .. } => *timestamp,
            BillingEvent::PaymentRecorded { timestamp, .. } => *timestamp,
            BillingEvent::PaymentSettled(settled) => settled.settled_at,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            BillingEvent::BillCreated { .. } => "BillCreated",
            BillingEvent::PaymentRecorded { .. } => "PaymentRecorded",
            BillingEvent::PaymentSettled(_) => "PaymentSettled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_event_accessors() {
        let bill_id = BillId::new_v7();
        let event = BillingEvent::PaymentSettled(PaymentSettled {
            bill_id,
            patient_id: PatientId::new(),
            admission_id: None,
            total_amount: Money::new(dec!(1000), Currency::USD),
            settled_at: Utc::now(),
        });

        assert_eq!(event.bill_id(), bill_id);
        assert_eq!(event.event_type(), "PaymentSettled");
    }

    #[test]
    fn test_event_serialization() {
        let event = BillingEvent::BillCreated {
            bill_id: BillId::new_v7(),
            patient_id: PatientId::new(),
            total_amount: Money::new(dec!(500), Currency::USD),
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        let back: BillingEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.bill_id(), event.bill_id());
    }
}
