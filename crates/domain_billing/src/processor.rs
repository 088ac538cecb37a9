//! Payment processing
//!
//! Records a payment and settles the owning bill in one transaction:
//! payment insert, recompute of paid/due/status from the full payment
//! history, and — when the bill transitions to Paid — the settlement
//! automation handlers. Either all of it commits or none of it does.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use core_kernel::{BillId, Money, ShiftId, UserId};
use domain_ledger::{Bill, LedgerStore, LedgerTx, Payment, PaymentMethod, StoreError};

use crate::error::BillingError;
use crate::events::PaymentSettled;
use crate::ports::{Notification, NotificationPort, SettlementAutomation};

/// Request to record a payment against a bill
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    /// Bill being paid
    pub bill_id: BillId,
    /// Amount tendered; must be positive and in the bill's currency
    pub amount: Money,
    /// Tender method
    pub method: PaymentMethod,
    /// Cashier recording the payment
    pub teller_id: UserId,
    /// Shift the payment is accounted under
    pub shift_id: ShiftId,
    /// External reference (card slip, bank reference)
    pub reference_number: Option<String>,
    /// Free-form remarks
    pub remarks: Option<String>,
}

/// Result of a recorded payment
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    /// The payment as persisted
    pub payment: Payment,
    /// The bill after settlement recompute
    pub bill: Bill,
    /// True when this payment moved the bill to Paid
    pub settled_now: bool,
}

/// Records payments and drives settlement automation
pub struct PaymentProcessor {
    store: Arc<dyn LedgerStore>,
    automations: Vec<Arc<dyn SettlementAutomation>>,
    notifier: Arc<dyn NotificationPort>,
}

impl PaymentProcessor {
    /// Creates a processor with no automation handlers
    pub fn new(store: Arc<dyn LedgerStore>, notifier: Arc<dyn NotificationPort>) -> Self {
        Self {
            store,
            automations: Vec::new(),
            notifier,
        }
    }

    /// Registers a settlement automation handler
    pub fn with_automation(mut self, automation: Arc<dyn SettlementAutomation>) -> Self {
        self.automations.push(automation);
        self
    }

    /// Records a payment against a bill.
    ///
    /// The payment insert, the bill settlement recompute, and any
    /// settlement automation run in a single transaction; a failure in
    /// any step rolls everything back. Notifications produced by the
    /// automation are delivered after the commit — a delivery failure is
    /// logged and does not undo the financial write.
    ///
    /// # Errors
    ///
    /// - `Validation` if the amount is not positive or the currency does
    ///   not match the bill
    /// - `BillNotFound` if the bill does not exist
    /// - `Automation` if a handler rejected the settled bill
    /// - `Transaction` if the store could not commit
    pub async fn add_payment(&self, request: PaymentRequest) -> Result<PaymentOutcome, BillingError> {
        if !request.amount.is_positive() {
            return Err(BillingError::validation(format!(
                "payment amount must be positive, got {}",
                request.amount
            )));
        }
        let bill_id = request.bill_id;

        let mut tx = self
            .store
            .begin()
            .await
            .map_err(|source| BillingError::Transaction { bill_id, source })?;

        match self.apply_payment(tx.as_mut(), request).await {
            Ok((outcome, notifications)) => {
                tx.commit()
                    .await
                    .map_err(|source| BillingError::Transaction { bill_id, source })?;

                info!(
                    bill_id = %outcome.bill.id,
                    payment_id = %outcome.payment.id,
                    amount = %outcome.payment.amount,
                    status = %outcome.bill.status,
                    "payment recorded"
                );
                self.dispatch(&notifications).await;
                Ok(outcome)
            }
            Err(err) => {
                crate::invoice::rollback_quietly(tx).await;
                Err(err)
            }
        }
    }

    /// Performs all in-transaction work; the caller commits or rolls back.
    async fn apply_payment(
        &self,
        tx: &mut dyn LedgerTx,
        request: PaymentRequest,
    ) -> Result<(PaymentOutcome, Vec<Notification>), BillingError> {
        let bill_id = request.bill_id;
        let wrap = |source: StoreError| BillingError::Transaction { bill_id, source };

        let mut bill = tx
            .bill_for_update(bill_id)
            .await
            .map_err(wrap)?
            .ok_or(BillingError::BillNotFound(bill_id))?;

        if request.amount.currency() != bill.total_amount.currency() {
            return Err(BillingError::validation(format!(
                "payment currency {} does not match bill currency {}",
                request.amount.currency(),
                bill.total_amount.currency()
            )));
        }

        let previous_status = bill.status;

        let mut payment = Payment::new(
            bill_id,
            request.amount,
            request.method,
            request.teller_id,
            request.shift_id,
        );
        if let Some(reference) = request.reference_number {
            payment = payment.with_reference(reference);
        }
        if let Some(remarks) = request.remarks {
            payment = payment.with_remarks(remarks);
        }
        tx.insert_payment(&payment).await.map_err(wrap)?;

        // The payment history is authoritative: recompute rather than
        // increment, so replays and concurrent writers converge.
        let payments = tx.payments_for_bill(bill_id).await.map_err(wrap)?;
        let total_paid = payments.iter().fold(
            Money::zero(bill.total_amount.currency()),
            |acc, p| acc + p.amount,
        );
        bill.apply_payment_total(total_paid);
        tx.update_bill_settlement(&bill).await.map_err(wrap)?;

        let settled_now = bill.is_settled() && previous_status != domain_ledger::BillStatus::Paid;

        let mut notifications = Vec::new();
        if settled_now {
            let event = PaymentSettled {
                bill_id,
                patient_id: bill.patient_id,
                admission_id: bill.admission_id,
                total_amount: bill.total_amount,
                settled_at: Utc::now(),
            };
            for automation in &self.automations {
                let produced = automation
                    .on_bill_settled(tx, &event)
                    .await
                    .map_err(|source| BillingError::Automation {
                        handler: automation.name(),
                        bill_id,
                        source,
                    })?;
                notifications.extend(produced);
            }
        }

        Ok((
            PaymentOutcome {
                payment,
                bill,
                settled_now,
            },
            notifications,
        ))
    }

    /// Delivers post-commit notifications, logging failures
    async fn dispatch(&self, notifications: &[Notification]) {
        for notification in notifications {
            if let Err(err) = self.notifier.notify(notification).await {
                warn!(
                    title = %notification.title,
                    error = %err,
                    "notification delivery failed"
                );
            }
        }
    }
}
