//! Payment records
//!
//! Payments are append-only facts: once recorded they are never edited or
//! deleted. Bill settlement state is recomputed from the payment history,
//! and shift reconciliation sums the cash subset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{BillId, Money, PaymentId, ShiftId, UserId};

/// How a payment was tendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Physical cash at the counter
    Cash,
    /// Credit or debit card
    Card,
    /// Bank transfer
    BankTransfer,
    /// Paper cheque
    Cheque,
    /// Mobile wallet
    MobileWallet,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::BankTransfer => "BankTransfer",
            PaymentMethod::Cheque => "Cheque",
            PaymentMethod::MobileWallet => "MobileWallet",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash" => Ok(PaymentMethod::Cash),
            "Card" => Ok(PaymentMethod::Card),
            "BankTransfer" => Ok(PaymentMethod::BankTransfer),
            "Cheque" => Ok(PaymentMethod::Cheque),
            "MobileWallet" => Ok(PaymentMethod::MobileWallet),
            other => Err(format!("unknown payment method: {}", other)),
        }
    }
}

/// A recorded payment against a bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Bill being paid
    pub bill_id: BillId,
    /// Payment amount, always positive
    pub amount: Money,
    /// Tender method
    pub method: PaymentMethod,
    /// When the payment was taken
    pub payment_date: DateTime<Utc>,
    /// External reference (card slip, bank reference)
    pub reference_number: Option<String>,
    /// Cashier who recorded the payment
    pub teller_id: UserId,
    /// Shift the payment is accounted under
    pub shift_id: ShiftId,
    /// Free-form remarks
    pub remarks: Option<String>,
}

impl Payment {
    /// Creates a new payment record
    pub fn new(
        bill_id: BillId,
        amount: Money,
        method: PaymentMethod,
        teller_id: UserId,
        shift_id: ShiftId,
    ) -> Self {
        Self {
            id: PaymentId::new_v7(),
            bill_id,
            amount,
            method,
            payment_date: Utc::now(),
            reference_number: None,
            teller_id,
            shift_id,
            remarks: None,
        }
    }

    /// Sets the external reference number
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference_number = Some(reference.into());
        self
    }

    /// Sets free-form remarks
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    /// Returns true for cash-tendered payments (the shift reconciliation subset)
    pub fn is_cash(&self) -> bool {
        self.method == PaymentMethod::Cash
    }
}
