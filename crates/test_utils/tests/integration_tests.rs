//! Cross-domain integration tests
//!
//! Exercises the full payment/settlement/automation flow over the
//! in-memory ledger store: bill creation, payment settlement, admission
//! discharge, operation confirmation, shift reconciliation, and doctor
//! settlement.

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, Rate, UserId};
use domain_billing::{InvoiceManager, NewBillItem, PaymentProcessor, StaffRole, NotifyTarget};
use domain_clinical::{
    AdmissionDischargeAutomation, OperationConfirmationAutomation, OperationLifecycle,
};
use domain_ledger::{
    Admission, AdmissionStatus, Bed, BedStatus, BillStatus, LedgerStore, OperationStatus,
    PaymentMethod, UserShift,
};
use domain_settlement::SettlementCalculator;
use domain_shifts::ShiftRegister;
use infra_db::MemoryLedger;
use test_utils::{
    assert_bill_invariants, assert_money_eq, IdFixtures, MoneyFixtures, NewBillBuilder,
    OperationBuilder, PaymentRequestBuilder, RecordingNotifier, FailingNotifier,
    StaticDoctorDirectory, StaticPatientDirectory, TimeFixtures,
};

fn usd(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, Currency::USD)
}

/// Opt-in log output for debugging: `RUST_LOG=info cargo test`
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Builds a processor wired with both clinical automations
fn processor_with_automations(
    store: Arc<MemoryLedger>,
    notifier: Arc<dyn domain_billing::NotificationPort>,
    patients: Arc<StaticPatientDirectory>,
) -> PaymentProcessor {
    PaymentProcessor::new(store, notifier)
        .with_automation(Arc::new(AdmissionDischargeAutomation::new(patients.clone())))
        .with_automation(Arc::new(OperationConfirmationAutomation::new(patients)))
}

/// Seeds an open shift so payments have somewhere to be accounted
async fn seed_shift(store: &MemoryLedger) -> UserShift {
    let shift = UserShift::open(IdFixtures::cashier(), MoneyFixtures::starting_float());
    let mut tx = store.begin().await.unwrap();
    tx.insert_shift(&shift).await.unwrap();
    tx.commit().await.unwrap();
    shift
}

#[tokio::test]
async fn full_payment_discharges_linked_admission() {
    init_tracing();
    let store = Arc::new(MemoryLedger::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let patient_id = IdFixtures::patient();

    // Seed bed + admission
    let mut bed = Bed::new("General-2");
    bed.occupy();
    let admission = Admission::new(patient_id, bed.id);
    {
        let mut tx = store.begin().await.unwrap();
        tx.insert_bed(&bed).await.unwrap();
        tx.insert_admission(&admission).await.unwrap();
        tx.commit().await.unwrap();
    }
    let shift = seed_shift(&store).await;

    let invoices = InvoiceManager::new(store.clone());
    let bill = invoices
        .create_bill(
            NewBillBuilder::new()
                .for_patient(patient_id)
                .with_total(usd(dec!(1000.00)))
                .for_admission(admission.id)
                .under_shift(shift.id)
                .build(),
        )
        .await
        .unwrap();

    let patients = Arc::new(StaticPatientDirectory::new().with_patient(patient_id, "Asha Verma"));
    let processor = processor_with_automations(store.clone(), notifier.clone(), patients);

    let outcome = processor
        .add_payment(
            PaymentRequestBuilder::new(bill.id, shift.id)
                .amount(usd(dec!(1000.00)))
                .method(PaymentMethod::Cash)
                .build(),
        )
        .await
        .unwrap();

    assert!(outcome.settled_now);
    assert_eq!(outcome.bill.status, BillStatus::Paid);
    assert_money_eq(&outcome.bill.due_amount, &usd(dec!(0)));
    assert_bill_invariants(&outcome.bill);

    // Admission discharged, bed freed
    let mut tx = store.begin().await.unwrap();
    let stored_admission = tx.admission(admission.id).await.unwrap().unwrap();
    let stored_bed = tx.bed(bed.id).await.unwrap().unwrap();
    tx.rollback().await.unwrap();
    assert_eq!(stored_admission.status, AdmissionStatus::Discharged);
    assert!(stored_admission.discharge_date.is_some());
    assert_eq!(stored_bed.status, BedStatus::Available);

    // Admin notified, naming the patient
    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].target, NotifyTarget::Role(StaffRole::Admin));
    assert!(sent[0].message.contains("Asha Verma"));
}

#[tokio::test]
async fn partial_payment_fires_no_automation() {
    let store = Arc::new(MemoryLedger::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let shift = seed_shift(&store).await;

    let invoices = InvoiceManager::new(store.clone());
    let bill = invoices
        .create_bill(NewBillBuilder::new().with_total(usd(dec!(500.00))).build())
        .await
        .unwrap();

    let patients = Arc::new(StaticPatientDirectory::new());
    let processor = processor_with_automations(store.clone(), notifier.clone(), patients);

    let outcome = processor
        .add_payment(
            PaymentRequestBuilder::new(bill.id, shift.id)
                .amount(usd(dec!(200.00)))
                .build(),
        )
        .await
        .unwrap();

    assert!(!outcome.settled_now);
    assert_eq!(outcome.bill.status, BillStatus::Partial);
    assert_money_eq(&outcome.bill.paid_amount, &usd(dec!(200.00)));
    assert_money_eq(&outcome.bill.due_amount, &usd(dec!(300.00)));
    assert_bill_invariants(&outcome.bill);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn deposit_settlement_schedules_awaiting_operation() {
    let store = Arc::new(MemoryLedger::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let patient_id = IdFixtures::patient();
    let shift = seed_shift(&store).await;

    // Patient has a surgery awaiting its deposit
    let operation = OperationBuilder::new()
        .for_patient(patient_id)
        .in_status(OperationStatus::PendingDeposit)
        .build();
    {
        let mut tx = store.begin().await.unwrap();
        tx.insert_operation(&operation).await.unwrap();
        tx.commit().await.unwrap();
    }

    let invoices = InvoiceManager::new(store.clone());
    let bill = invoices
        .create_bill(
            NewBillBuilder::new()
                .for_patient(patient_id)
                .with_total(usd(dec!(2500.00)))
                .with_items(vec![NewBillItem::new(
                    "Operation deposit",
                    usd(dec!(2500.00)),
                    "Procedure",
                )])
                .build(),
        )
        .await
        .unwrap();

    let patients = Arc::new(StaticPatientDirectory::new());
    let processor = processor_with_automations(store.clone(), notifier.clone(), patients);

    processor
        .add_payment(
            PaymentRequestBuilder::new(bill.id, shift.id)
                .amount(usd(dec!(2500.00)))
                .method(PaymentMethod::BankTransfer)
                .build(),
        )
        .await
        .unwrap();

    let mut tx = store.begin().await.unwrap();
    let stored_operation = tx.operation(operation.id).await.unwrap().unwrap();
    tx.rollback().await.unwrap();
    assert_eq!(stored_operation.status, OperationStatus::Scheduled);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].target, NotifyTarget::Role(StaffRole::OtStaff));
}

#[tokio::test]
async fn failed_notifier_does_not_undo_the_financial_write() {
    let store = Arc::new(MemoryLedger::new());
    let patient_id = IdFixtures::patient();
    let shift = seed_shift(&store).await;

    let bed = Bed::new("ICU");
    let admission = Admission::new(patient_id, bed.id);
    {
        let mut tx = store.begin().await.unwrap();
        tx.insert_bed(&bed).await.unwrap();
        tx.insert_admission(&admission).await.unwrap();
        tx.commit().await.unwrap();
    }

    let invoices = InvoiceManager::new(store.clone());
    let bill = invoices
        .create_bill(
            NewBillBuilder::new()
                .for_patient(patient_id)
                .with_total(usd(dec!(750.00)))
                .for_admission(admission.id)
                .build(),
        )
        .await
        .unwrap();

    let patients = Arc::new(StaticPatientDirectory::new());
    let processor =
        processor_with_automations(store.clone(), Arc::new(FailingNotifier), patients);

    let outcome = processor
        .add_payment(
            PaymentRequestBuilder::new(bill.id, shift.id)
                .amount(usd(dec!(750.00)))
                .build(),
        )
        .await
        .unwrap();

    // Settlement and discharge committed despite the delivery failure.
    assert!(outcome.settled_now);
    let mut tx = store.begin().await.unwrap();
    let stored_admission = tx.admission(admission.id).await.unwrap().unwrap();
    let stored_bill = tx.bill(bill.id).await.unwrap().unwrap();
    tx.rollback().await.unwrap();
    assert_eq!(stored_admission.status, AdmissionStatus::Discharged);
    assert_eq!(stored_bill.status, BillStatus::Paid);
}

#[tokio::test]
async fn starting_a_second_shift_auto_closes_the_first() {
    let store = Arc::new(MemoryLedger::new());
    let register = ShiftRegister::new(store.clone());
    let user = UserId::new("A");

    let first = register
        .start_shift(user.clone(), usd(dec!(5000)))
        .await
        .unwrap();
    let second = register
        .start_shift(user.clone(), usd(dec!(3000)))
        .await
        .unwrap();

    let current = register.current_shift(&user).await.unwrap().unwrap();
    assert_eq!(current.id, second.id);

    // At most one open shift per user
    let mut tx = store.begin().await.unwrap();
    let open = tx.open_shifts_for_user(&user).await.unwrap();
    let closed_first = tx.shift(first.id).await.unwrap().unwrap();
    tx.rollback().await.unwrap();
    assert_eq!(open.len(), 1);
    assert!(!closed_first.is_open());
    assert!(closed_first.notes.unwrap().contains("Auto-closed"));
}

#[tokio::test]
async fn shift_close_reconciles_cash_only() {
    init_tracing();
    let store = Arc::new(MemoryLedger::new());
    let register = ShiftRegister::new(store.clone());
    let notifier = Arc::new(RecordingNotifier::new());

    let shift = register
        .start_shift(IdFixtures::cashier(), usd(dec!(1000)))
        .await
        .unwrap();

    let invoices = InvoiceManager::new(store.clone());
    let processor = PaymentProcessor::new(store.clone(), notifier);

    // Two cash payments and one card payment against the shift
    for (amount, method) in [
        (dec!(300), PaymentMethod::Cash),
        (dec!(200), PaymentMethod::Cash),
        (dec!(500), PaymentMethod::Card),
    ] {
        let bill = invoices
            .create_bill(
                NewBillBuilder::new()
                    .with_total(usd(amount))
                    .under_shift(shift.id)
                    .build(),
            )
            .await
            .unwrap();
        processor
            .add_payment(
                PaymentRequestBuilder::new(bill.id, shift.id)
                    .amount(usd(amount))
                    .method(method)
                    .build(),
            )
            .await
            .unwrap();
    }

    let revenue = register.shift_revenue(shift.id).await.unwrap();
    assert_money_eq(&revenue, &usd(dec!(1000)));

    let close = register
        .close_shift(shift.id, usd(dec!(1490)), None)
        .await
        .unwrap();

    assert_money_eq(&close.reconciliation.expected_cash, &usd(dec!(1500)));
    assert_money_eq(&close.reconciliation.actual_cash, &usd(dec!(1490)));
    assert_money_eq(&close.reconciliation.discrepancy, &usd(dec!(-10)));
    assert!(!close.shift.is_open());
}

#[tokio::test]
async fn doctor_settlement_applies_commission_rate() {
    let store = Arc::new(MemoryLedger::new());
    let doctors = Arc::new(StaticDoctorDirectory::new(
        Some(Rate::from_percentage(dec!(80))),
        usd(dec!(10000.00)),
    ));
    let calculator = SettlementCalculator::new(store, doctors, Currency::USD);

    let payout = calculator
        .calculate(
            IdFixtures::doctor(),
            TimeFixtures::period_start(),
            TimeFixtures::period_end(),
        )
        .await
        .unwrap();

    assert_money_eq(&payout, &usd(dec!(8000.00)));
}

#[tokio::test]
async fn bill_round_trip_preserves_totals() {
    let store = Arc::new(MemoryLedger::new());
    let invoices = InvoiceManager::new(store);

    let items = vec![
        NewBillItem::new("Room charge", usd(dec!(1200.00)), "Room"),
        NewBillItem::new("Medication", usd(dec!(150.50)), "Medicine"),
        NewBillItem::new("Surgeon fee", usd(dec!(2000.00)), "Doctor"),
    ];
    let total = usd(dec!(3350.50));

    let bill = invoices
        .create_bill(
            NewBillBuilder::new()
                .with_total(total)
                .with_items(items)
                .build(),
        )
        .await
        .unwrap();

    let (read_back, read_items) = invoices.bill_with_items(bill.id).await.unwrap();
    assert_money_eq(&read_back.total_amount, &total);
    assert_money_eq(&read_back.due_amount, &total);
    assert!(read_back.paid_amount.is_zero());
    assert_eq!(read_back.status, BillStatus::Pending);
    assert_eq!(read_items.len(), 3);

    let items_total = read_items
        .iter()
        .fold(usd(dec!(0)), |acc, item| acc + item.amount);
    assert_money_eq(&items_total, &total);
}

#[tokio::test]
async fn completed_operation_transfer_flow() {
    let store = Arc::new(MemoryLedger::new());
    let lifecycle = OperationLifecycle::new(store.clone());

    let operation = OperationBuilder::new()
        .in_status(OperationStatus::Completed)
        .build();
    {
        let mut tx = store.begin().await.unwrap();
        tx.insert_operation(&operation).await.unwrap();
        tx.commit().await.unwrap();
    }

    assert!(lifecycle.mark_transferred(operation.id).await.unwrap());
    // Second call is a no-op, not an error.
    assert!(!lifecycle.mark_transferred(operation.id).await.unwrap());

    let stored = lifecycle.operation(operation.id).await.unwrap();
    assert!(stored.is_transferred);
    assert!(stored.is_terminal());
}
