//! Invoice management
//!
//! Raises bills with their line items as a single atomic unit: a header
//! without items (or the reverse) is never observable, and any failure
//! rolls the whole creation back.

use std::sync::Arc;

use tracing::info;

use core_kernel::{AdmissionId, BillId, Money, PatientId, ShiftId, UserId};
use domain_ledger::{Bill, BillItem, LedgerStore};

use crate::error::BillingError;

/// Request to raise a new bill
#[derive(Debug, Clone)]
pub struct NewBill {
    /// Patient who owes the bill
    pub patient_id: PatientId,
    /// Total amount owed; must not be negative
    pub total_amount: Money,
    /// Opening paid amount, commonly zero
    pub paid_amount: Money,
    /// Charge lines
    pub items: Vec<NewBillItem>,
    /// Cashier shift the bill is raised under
    pub shift_id: Option<ShiftId>,
    /// Identity of the user raising the bill
    pub created_by: Option<UserId>,
    /// Linked ward admission for inpatient bills
    pub admission_id: Option<AdmissionId>,
}

/// One charge line of a [`NewBill`]
#[derive(Debug, Clone)]
pub struct NewBillItem {
    /// Human-readable charge description
    pub description: String,
    /// Charge amount
    pub amount: Money,
    /// Free-form classification tag (e.g. "Room", "Doctor", "Medicine")
    pub category: String,
}

impl NewBillItem {
    pub fn new(
        description: impl Into<String>,
        amount: Money,
        category: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            amount,
            category: category.into(),
        }
    }
}

/// Creates bills and reads them back with their items
pub struct InvoiceManager {
    store: Arc<dyn LedgerStore>,
}

impl InvoiceManager {
    /// Creates a new invoice manager over a ledger store
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Raises a bill and its line items atomically.
    ///
    /// # Errors
    ///
    /// - `Validation` if the patient id is nil or the total is negative
    /// - `CreateFailed` if the store cannot commit; nothing is persisted
    pub async fn create_bill(&self, request: NewBill) -> Result<Bill, BillingError> {
        if request.patient_id.is_nil() {
            return Err(BillingError::validation("patient id must be set"));
        }
        if request.total_amount.is_negative() {
            return Err(BillingError::validation(format!(
                "total amount must not be negative, got {}",
                request.total_amount
            )));
        }

        let mut bill = Bill::new(request.patient_id, request.total_amount, request.paid_amount);
        if let Some(shift_id) = request.shift_id {
            bill = bill.with_shift(shift_id);
        }
        if let Some(user) = request.created_by {
            bill = bill.created_by(user);
        }
        if let Some(admission_id) = request.admission_id {
            bill = bill.with_admission(admission_id);
        }

        let items: Vec<BillItem> = request
            .items
            .into_iter()
            .map(|item| BillItem::new(bill.id, item.description, item.amount, item.category))
            .collect();

        let mut tx = self
            .store
            .begin()
            .await
            .map_err(|source| BillingError::CreateFailed { source })?;

        let staged = async {
            tx.insert_bill(&bill).await?;
            tx.insert_bill_items(&items).await?;
            Ok::<(), domain_ledger::StoreError>(())
        }
        .await;

        match staged {
            Ok(()) => {
                tx.commit()
                    .await
                    .map_err(|source| BillingError::CreateFailed { source })?;
            }
            Err(source) => {
                rollback_quietly(tx).await;
                return Err(BillingError::CreateFailed { source });
            }
        }

        info!(
            bill_id = %bill.id,
            patient_id = %bill.patient_id,
            total = %bill.total_amount,
            "bill created"
        );
        Ok(bill)
    }

    /// Reads a bill together with its line items
    pub async fn bill_with_items(
        &self,
        bill_id: BillId,
    ) -> Result<(Bill, Vec<BillItem>), BillingError> {
        let mut tx = self
            .store
            .begin()
            .await
            .map_err(|source| BillingError::Transaction { bill_id, source })?;

        let result = async {
            let bill = tx.bill(bill_id).await?;
            let items = tx.bill_items(bill_id).await?;
            Ok::<_, domain_ledger::StoreError>((bill, items))
        }
        .await;

        rollback_quietly(tx).await;

        match result {
            Ok((Some(bill), items)) => Ok((bill, items)),
            Ok((None, _)) => Err(BillingError::BillNotFound(bill_id)),
            Err(source) => Err(BillingError::Transaction { bill_id, source }),
        }
    }
}

/// Rolls a transaction back, logging rather than propagating failures.
/// Used on error paths where the original error matters more.
pub(crate) async fn rollback_quietly(tx: Box<dyn domain_ledger::LedgerTx>) {
    if let Err(err) = tx.rollback().await {
        tracing::warn!(error = %err, "transaction rollback failed");
    }
}
