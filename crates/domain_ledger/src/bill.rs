//! Bill and line-item records
//!
//! A bill is the financial record owed by a patient for one encounter.
//! Its paid/due/status triple is never edited directly: writers recompute
//! it from the full payment history via [`Bill::apply_payment_total`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{AdmissionId, BillId, BillItemId, Money, PatientId, ShiftId, UserId};

/// Residual amounts at or below this threshold count as fully paid.
///
/// Payments arrive from card terminals and bank files that round
/// independently; a bill left owing a fraction of a minor unit is settled.
pub const SETTLEMENT_EPSILON: Decimal = dec!(0.01);

/// Bill settlement status, derived from amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillStatus {
    /// No payment received
    Pending,
    /// Some payment received, balance outstanding
    Partial,
    /// Fully paid (within the settlement epsilon)
    Paid,
}

impl BillStatus {
    /// Derives the status from a total and the amount paid so far.
    ///
    /// `Paid` iff the outstanding balance is within [`SETTLEMENT_EPSILON`],
    /// else `Partial` iff anything has been paid, else `Pending`.
    pub fn derive(total: Money, paid: Money) -> BillStatus {
        let due = (total - paid).clamp_non_negative();
        if due.amount() <= SETTLEMENT_EPSILON {
            BillStatus::Paid
        } else if paid.is_positive() {
            BillStatus::Partial
        } else {
            BillStatus::Pending
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BillStatus::Pending => "Pending",
            BillStatus::Partial => "Partial",
            BillStatus::Paid => "Paid",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for BillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(BillStatus::Pending),
            "Partial" => Ok(BillStatus::Partial),
            "Paid" => Ok(BillStatus::Paid),
            other => Err(format!("unknown bill status: {}", other)),
        }
    }
}

/// A patient's invoice for one visit, admission, or encounter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    /// Unique identifier
    pub id: BillId,
    /// Patient who owes the bill
    pub patient_id: PatientId,
    /// Total amount owed
    pub total_amount: Money,
    /// Amount paid so far
    pub paid_amount: Money,
    /// Outstanding balance, never negative
    pub due_amount: Money,
    /// Settlement status
    pub status: BillStatus,
    /// When the bill was created
    pub bill_date: DateTime<Utc>,
    /// Cashier shift the bill was raised under, if any
    pub shift_id: Option<ShiftId>,
    /// Identity of the user who raised the bill
    pub created_by: Option<UserId>,
    /// Linked ward admission, when the bill covers an inpatient stay
    pub admission_id: Option<AdmissionId>,
}

impl Bill {
    /// Creates a new bill with an opening paid amount (commonly zero).
    ///
    /// The due amount and status follow the settlement invariant from the
    /// start, so a bill opened with a non-zero `paid` is already Partial
    /// or Paid.
    pub fn new(patient_id: PatientId, total_amount: Money, paid_amount: Money) -> Self {
        let due_amount = (total_amount - paid_amount).clamp_non_negative();
        Self {
            id: BillId::new_v7(),
            patient_id,
            total_amount,
            paid_amount,
            due_amount,
            status: BillStatus::derive(total_amount, paid_amount),
            bill_date: Utc::now(),
            shift_id: None,
            created_by: None,
            admission_id: None,
        }
    }

    /// Attributes the bill to a cashier shift
    pub fn with_shift(mut self, shift_id: ShiftId) -> Self {
        self.shift_id = Some(shift_id);
        self
    }

    /// Records who raised the bill
    pub fn created_by(mut self, user: UserId) -> Self {
        self.created_by = Some(user);
        self
    }

    /// Links the bill to a ward admission
    pub fn with_admission(mut self, admission_id: AdmissionId) -> Self {
        self.admission_id = Some(admission_id);
        self
    }

    /// Recomputes paid/due/status from the authoritative payment total.
    ///
    /// Callers pass the sum of all recorded payments for this bill; the
    /// method never increments, so replays and concurrent recomputations
    /// converge on the same state.
    pub fn apply_payment_total(&mut self, total_paid: Money) {
        self.paid_amount = total_paid;
        self.due_amount = (self.total_amount - total_paid).clamp_non_negative();
        self.status = BillStatus::derive(self.total_amount, total_paid);
    }

    /// Returns true when the bill is fully settled
    pub fn is_settled(&self) -> bool {
        self.status == BillStatus::Paid
    }
}

/// A single charge line on a bill
///
/// The sum of a bill's items is the authoritative total at creation time.
/// Automated accrual (daily room charges) may append items later through
/// the same store contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillItem {
    /// Unique identifier
    pub id: BillItemId,
    /// Owning bill
    pub bill_id: BillId,
    /// Human-readable charge description
    pub description: String,
    /// Charge amount
    pub amount: Money,
    /// Free-form classification tag (e.g. "Room", "Doctor", "Medicine")
    pub category: String,
}

impl BillItem {
    /// Creates a new line item for a bill
    pub fn new(
        bill_id: BillId,
        description: impl Into<String>,
        amount: Money,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: BillItemId::new_v7(),
            bill_id,
            description: description.into(),
            amount,
            category: category.into(),
        }
    }
}
