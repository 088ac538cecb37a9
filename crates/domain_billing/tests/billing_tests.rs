//! Behavioral tests for the billing write paths
//!
//! Runs the invoice manager and payment processor against the in-memory
//! ledger store, with local stubs for the notification port and a
//! deliberately failing automation handler for the rollback tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal_macros::dec;
use uuid::Uuid;

use core_kernel::{BillId, Currency, Money, PatientId, PortError, ShiftId, UserId};
use domain_billing::{
    AutomationError, BillingError, InvoiceManager, NewBill, NewBillItem, Notification,
    NotificationPort, PaymentProcessor, PaymentRequest, PaymentSettled, SettlementAutomation,
};
use domain_ledger::{BillStatus, LedgerStore, LedgerTx, PaymentMethod, UserShift};
use infra_db::MemoryLedger;

use core_kernel::DomainPort;

fn usd(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, Currency::USD)
}

#[derive(Default)]
struct NullNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl DomainPort for NullNotifier {}

#[async_trait]
impl NotificationPort for NullNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), PortError> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Automation that always rejects, to prove the transaction rolls back
struct RejectingAutomation;

#[async_trait]
impl SettlementAutomation for RejectingAutomation {
    fn name(&self) -> &'static str {
        "rejecting"
    }

    async fn on_bill_settled(
        &self,
        _tx: &mut dyn LedgerTx,
        _event: &PaymentSettled,
    ) -> Result<Vec<Notification>, AutomationError> {
        Err(AutomationError::workflow("downstream state rejected"))
    }
}

/// Automation that counts invocations
#[derive(Default)]
struct CountingAutomation {
    fired: Mutex<u32>,
}

#[async_trait]
impl SettlementAutomation for CountingAutomation {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn on_bill_settled(
        &self,
        _tx: &mut dyn LedgerTx,
        _event: &PaymentSettled,
    ) -> Result<Vec<Notification>, AutomationError> {
        *self.fired.lock().unwrap() += 1;
        Ok(Vec::new())
    }
}

fn new_bill(total: Money) -> NewBill {
    NewBill {
        patient_id: PatientId::new(),
        total_amount: total,
        paid_amount: Money::zero(Currency::USD),
        items: vec![NewBillItem::new("Consultation", total, "Doctor")],
        shift_id: None,
        created_by: None,
        admission_id: None,
    }
}

fn payment(bill_id: BillId, shift_id: ShiftId, amount: Money) -> PaymentRequest {
    PaymentRequest {
        bill_id,
        amount,
        method: PaymentMethod::Cash,
        teller_id: UserId::new("teller-1"),
        shift_id,
        reference_number: None,
        remarks: None,
    }
}

async fn seed_shift(store: &MemoryLedger) -> ShiftId {
    let shift = UserShift::open(UserId::new("teller-1"), usd(dec!(1000)));
    let mut tx = store.begin().await.unwrap();
    tx.insert_shift(&shift).await.unwrap();
    tx.commit().await.unwrap();
    shift.id
}

mod invoice_tests {
    use super::*;

    #[tokio::test]
    async fn create_bill_rejects_nil_patient() {
        let invoices = InvoiceManager::new(Arc::new(MemoryLedger::new()));
        let mut request = new_bill(usd(dec!(100)));
        request.patient_id = PatientId::from_uuid(Uuid::nil());

        let err = invoices.create_bill(request).await.unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));
    }

    #[tokio::test]
    async fn create_bill_rejects_negative_total() {
        let invoices = InvoiceManager::new(Arc::new(MemoryLedger::new()));
        let err = invoices
            .create_bill(new_bill(usd(dec!(-50))))
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));
    }

    #[tokio::test]
    async fn create_bill_persists_header_and_items_together() {
        let store = Arc::new(MemoryLedger::new());
        let invoices = InvoiceManager::new(store.clone());

        let mut request = new_bill(usd(dec!(300)));
        request.items = vec![
            NewBillItem::new("Ward bed", usd(dec!(250)), "Room"),
            NewBillItem::new("Dressing kit", usd(dec!(50)), "Equipment"),
        ];
        let bill = invoices.create_bill(request).await.unwrap();

        let (stored, items) = invoices.bill_with_items(bill.id).await.unwrap();
        assert_eq!(stored.status, BillStatus::Pending);
        assert_eq!(stored.due_amount, usd(dec!(300)));
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn reading_a_missing_bill_reports_not_found() {
        let invoices = InvoiceManager::new(Arc::new(MemoryLedger::new()));
        let err = invoices.bill_with_items(BillId::new_v7()).await.unwrap_err();
        assert!(matches!(err, BillingError::BillNotFound(_)));
    }
}

mod processor_tests {
    use super::*;

    #[tokio::test]
    async fn rejects_non_positive_amounts() {
        let store = Arc::new(MemoryLedger::new());
        let processor = PaymentProcessor::new(store, Arc::new(NullNotifier::default()));

        let err = processor
            .add_payment(payment(BillId::new_v7(), ShiftId::new_v7(), usd(dec!(0))))
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_missing_bill() {
        let store = Arc::new(MemoryLedger::new());
        let shift_id = seed_shift(&store).await;
        let processor = PaymentProcessor::new(store, Arc::new(NullNotifier::default()));

        let err = processor
            .add_payment(payment(BillId::new_v7(), shift_id, usd(dec!(100))))
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::BillNotFound(_)));
    }

    #[tokio::test]
    async fn rejects_currency_mismatch() {
        let store = Arc::new(MemoryLedger::new());
        let shift_id = seed_shift(&store).await;
        let invoices = InvoiceManager::new(store.clone());
        let bill = invoices.create_bill(new_bill(usd(dec!(100)))).await.unwrap();

        let processor = PaymentProcessor::new(store, Arc::new(NullNotifier::default()));
        let err = processor
            .add_payment(payment(
                bill.id,
                shift_id,
                Money::new(dec!(100), Currency::EUR),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));
    }

    #[tokio::test]
    async fn partial_payment_leaves_bill_partial() {
        let store = Arc::new(MemoryLedger::new());
        let shift_id = seed_shift(&store).await;
        let invoices = InvoiceManager::new(store.clone());
        let bill = invoices.create_bill(new_bill(usd(dec!(500)))).await.unwrap();

        let processor = PaymentProcessor::new(store, Arc::new(NullNotifier::default()));
        let outcome = processor
            .add_payment(payment(bill.id, shift_id, usd(dec!(200))))
            .await
            .unwrap();

        assert!(!outcome.settled_now);
        assert_eq!(outcome.bill.status, BillStatus::Partial);
        assert_eq!(outcome.bill.paid_amount, usd(dec!(200)));
        assert_eq!(outcome.bill.due_amount, usd(dec!(300)));
    }

    #[tokio::test]
    async fn successive_payments_accumulate_to_settlement() {
        let store = Arc::new(MemoryLedger::new());
        let shift_id = seed_shift(&store).await;
        let invoices = InvoiceManager::new(store.clone());
        let bill = invoices.create_bill(new_bill(usd(dec!(900)))).await.unwrap();

        let counting = Arc::new(CountingAutomation::default());
        let processor = PaymentProcessor::new(store, Arc::new(NullNotifier::default()))
            .with_automation(counting.clone());

        let first = processor
            .add_payment(payment(bill.id, shift_id, usd(dec!(400))))
            .await
            .unwrap();
        assert!(!first.settled_now);
        assert_eq!(*counting.fired.lock().unwrap(), 0);

        let second = processor
            .add_payment(payment(bill.id, shift_id, usd(dec!(500))))
            .await
            .unwrap();
        assert!(second.settled_now);
        assert_eq!(second.bill.status, BillStatus::Paid);
        assert_eq!(*counting.fired.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn overpayment_on_paid_bill_does_not_refire_automation() {
        let store = Arc::new(MemoryLedger::new());
        let shift_id = seed_shift(&store).await;
        let invoices = InvoiceManager::new(store.clone());
        let bill = invoices.create_bill(new_bill(usd(dec!(100)))).await.unwrap();

        let counting = Arc::new(CountingAutomation::default());
        let processor = PaymentProcessor::new(store, Arc::new(NullNotifier::default()))
            .with_automation(counting.clone());

        processor
            .add_payment(payment(bill.id, shift_id, usd(dec!(100))))
            .await
            .unwrap();
        let again = processor
            .add_payment(payment(bill.id, shift_id, usd(dec!(25))))
            .await
            .unwrap();

        // Already Paid before this payment: no transition, no second fire.
        assert!(!again.settled_now);
        assert_eq!(*counting.fired.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn failing_automation_rolls_back_payment_and_bill() {
        let store = Arc::new(MemoryLedger::new());
        let shift_id = seed_shift(&store).await;
        let invoices = InvoiceManager::new(store.clone());
        let bill = invoices.create_bill(new_bill(usd(dec!(100)))).await.unwrap();

        let processor = PaymentProcessor::new(store.clone(), Arc::new(NullNotifier::default()))
            .with_automation(Arc::new(RejectingAutomation));

        let err = processor
            .add_payment(payment(bill.id, shift_id, usd(dec!(100))))
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Automation { .. }));

        // Nothing observable: no payment row, bill untouched.
        let mut tx = store.begin().await.unwrap();
        let payments = tx.payments_for_bill(bill.id).await.unwrap();
        let stored = tx.bill(bill.id).await.unwrap().unwrap();
        tx.rollback().await.unwrap();
        assert!(payments.is_empty());
        assert_eq!(stored.status, BillStatus::Pending);
        assert!(stored.paid_amount.is_zero());
    }

    #[tokio::test]
    async fn epsilon_residual_settles_the_bill() {
        let store = Arc::new(MemoryLedger::new());
        let shift_id = seed_shift(&store).await;
        let invoices = InvoiceManager::new(store.clone());
        let bill = invoices.create_bill(new_bill(usd(dec!(100.00)))).await.unwrap();

        let processor = PaymentProcessor::new(store, Arc::new(NullNotifier::default()));
        let outcome = processor
            .add_payment(payment(bill.id, shift_id, usd(dec!(99.99))))
            .await
            .unwrap();

        assert!(outcome.settled_now);
        assert_eq!(outcome.bill.status, BillStatus::Paid);
        assert_eq!(outcome.bill.due_amount, usd(dec!(0.01)));
    }
}
