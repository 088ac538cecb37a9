//! In-memory ledger store
//!
//! Serializable by construction: `begin` takes an owned lock on the whole
//! ledger state, so exactly one transaction runs at a time. The
//! transaction works on a staged copy; commit writes the copy back,
//! dropping the transaction (or calling rollback) discards it. That gives
//! tests the same atomicity and isolation guarantees the PostgreSQL
//! adapter gets from row locking, without a running database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};

use core_kernel::{
    AdmissionId, BedId, BillId, DoctorId, OperationId, PatientId, ShiftId, TheaterId, UserId,
};
use domain_ledger::{
    Admission, Bed, Bill, BillItem, DoctorSchedule, DoctorSettlement, LedgerStore, LedgerTx,
    Payment, PatientOperation, ShiftStatus, StoreError, UserShift,
};

/// The whole ledger, held in maps keyed by identity
#[derive(Debug, Default, Clone)]
struct LedgerState {
    bills: HashMap<BillId, Bill>,
    bill_items: Vec<BillItem>,
    payments: Vec<Payment>,
    shifts: HashMap<ShiftId, UserShift>,
    admissions: HashMap<AdmissionId, Admission>,
    beds: HashMap<BedId, Bed>,
    operations: HashMap<OperationId, PatientOperation>,
    schedules: Vec<DoctorSchedule>,
    settlements: Vec<DoctorSettlement>,
}

/// In-memory implementation of the ledger store contract
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl MemoryLedger {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTx { guard, staged }))
    }
}

/// A transaction over a staged copy of the ledger state
struct MemoryTx {
    guard: OwnedMutexGuard<LedgerState>,
    staged: LedgerState,
}

#[async_trait]
impl LedgerTx for MemoryTx {
    async fn insert_bill(&mut self, bill: &Bill) -> Result<(), StoreError> {
        if self.staged.bills.contains_key(&bill.id) {
            return Err(StoreError::Duplicate(format!("bill {}", bill.id)));
        }
        self.staged.bills.insert(bill.id, bill.clone());
        Ok(())
    }

    async fn insert_bill_items(&mut self, items: &[BillItem]) -> Result<(), StoreError> {
        for item in items {
            if !self.staged.bills.contains_key(&item.bill_id) {
                return Err(StoreError::Constraint(format!(
                    "bill item references missing bill {}",
                    item.bill_id
                )));
            }
            self.staged.bill_items.push(item.clone());
        }
        Ok(())
    }

    async fn bill(&mut self, id: BillId) -> Result<Option<Bill>, StoreError> {
        Ok(self.staged.bills.get(&id).cloned())
    }

    async fn bill_for_update(&mut self, id: BillId) -> Result<Option<Bill>, StoreError> {
        // Transactions are fully serialized here; the read is the lock.
        Ok(self.staged.bills.get(&id).cloned())
    }

    async fn update_bill_settlement(&mut self, bill: &Bill) -> Result<(), StoreError> {
        match self.staged.bills.get_mut(&bill.id) {
            Some(stored) => {
                *stored = bill.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("Bill", bill.id)),
        }
    }

    async fn bill_items(&mut self, id: BillId) -> Result<Vec<BillItem>, StoreError> {
        Ok(self
            .staged
            .bill_items
            .iter()
            .filter(|item| item.bill_id == id)
            .cloned()
            .collect())
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), StoreError> {
        if !self.staged.bills.contains_key(&payment.bill_id) {
            return Err(StoreError::Constraint(format!(
                "payment references missing bill {}",
                payment.bill_id
            )));
        }
        self.staged.payments.push(payment.clone());
        Ok(())
    }

    async fn payments_for_bill(&mut self, id: BillId) -> Result<Vec<Payment>, StoreError> {
        Ok(self
            .staged
            .payments
            .iter()
            .filter(|p| p.bill_id == id)
            .cloned()
            .collect())
    }

    async fn payments_for_shift(&mut self, id: ShiftId) -> Result<Vec<Payment>, StoreError> {
        Ok(self
            .staged
            .payments
            .iter()
            .filter(|p| p.shift_id == id)
            .cloned()
            .collect())
    }

    async fn insert_shift(&mut self, shift: &UserShift) -> Result<(), StoreError> {
        if self.staged.shifts.contains_key(&shift.id) {
            return Err(StoreError::Duplicate(format!("shift {}", shift.id)));
        }
        self.staged.shifts.insert(shift.id, shift.clone());
        Ok(())
    }

    async fn update_shift(&mut self, shift: &UserShift) -> Result<(), StoreError> {
        match self.staged.shifts.get_mut(&shift.id) {
            Some(stored) => {
                *stored = shift.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("UserShift", shift.id)),
        }
    }

    async fn shift(&mut self, id: ShiftId) -> Result<Option<UserShift>, StoreError> {
        Ok(self.staged.shifts.get(&id).cloned())
    }

    async fn open_shifts_for_user(&mut self, user: &UserId) -> Result<Vec<UserShift>, StoreError> {
        let mut open: Vec<UserShift> = self
            .staged
            .shifts
            .values()
            .filter(|s| &s.user_id == user && s.status == ShiftStatus::Open)
            .cloned()
            .collect();
        open.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(open)
    }

    async fn insert_admission(&mut self, admission: &Admission) -> Result<(), StoreError> {
        if self.staged.admissions.contains_key(&admission.id) {
            return Err(StoreError::Duplicate(format!("admission {}", admission.id)));
        }
        self.staged.admissions.insert(admission.id, admission.clone());
        Ok(())
    }

    async fn admission(&mut self, id: AdmissionId) -> Result<Option<Admission>, StoreError> {
        Ok(self.staged.admissions.get(&id).cloned())
    }

    async fn update_admission(&mut self, admission: &Admission) -> Result<(), StoreError> {
        match self.staged.admissions.get_mut(&admission.id) {
            Some(stored) => {
                *stored = admission.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("Admission", admission.id)),
        }
    }

    async fn insert_bed(&mut self, bed: &Bed) -> Result<(), StoreError> {
        if self.staged.beds.contains_key(&bed.id) {
            return Err(StoreError::Duplicate(format!("bed {}", bed.id)));
        }
        self.staged.beds.insert(bed.id, bed.clone());
        Ok(())
    }

    async fn bed(&mut self, id: BedId) -> Result<Option<Bed>, StoreError> {
        Ok(self.staged.beds.get(&id).cloned())
    }

    async fn update_bed(&mut self, bed: &Bed) -> Result<(), StoreError> {
        match self.staged.beds.get_mut(&bed.id) {
            Some(stored) => {
                *stored = bed.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("Bed", bed.id)),
        }
    }

    async fn insert_operation(&mut self, operation: &PatientOperation) -> Result<(), StoreError> {
        if self.staged.operations.contains_key(&operation.id) {
            return Err(StoreError::Duplicate(format!("operation {}", operation.id)));
        }
        self.staged.operations.insert(operation.id, operation.clone());
        Ok(())
    }

    async fn operation(&mut self, id: OperationId) -> Result<Option<PatientOperation>, StoreError> {
        Ok(self.staged.operations.get(&id).cloned())
    }

    async fn operation_for_update(
        &mut self,
        id: OperationId,
    ) -> Result<Option<PatientOperation>, StoreError> {
        Ok(self.staged.operations.get(&id).cloned())
    }

    async fn update_operation(&mut self, operation: &PatientOperation) -> Result<(), StoreError> {
        match self.staged.operations.get_mut(&operation.id) {
            Some(stored) => {
                *stored = operation.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("PatientOperation", operation.id)),
        }
    }

    async fn operations_awaiting_deposit(
        &mut self,
        patient: PatientId,
    ) -> Result<Vec<PatientOperation>, StoreError> {
        let mut awaiting: Vec<PatientOperation> = self
            .staged
            .operations
            .values()
            .filter(|op| op.patient_id == patient && op.status.awaiting_deposit())
            .cloned()
            .collect();
        awaiting.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(awaiting)
    }

    async fn operations_for_theater_on(
        &mut self,
        theater: TheaterId,
        date: NaiveDate,
    ) -> Result<Vec<PatientOperation>, StoreError> {
        Ok(self
            .staged
            .operations
            .values()
            .filter(|op| op.occupies(theater, date))
            .cloned()
            .collect())
    }

    async fn insert_schedule(&mut self, schedule: &DoctorSchedule) -> Result<(), StoreError> {
        self.staged.schedules.push(schedule.clone());
        Ok(())
    }

    async fn schedules_for_doctor(
        &mut self,
        doctor: DoctorId,
    ) -> Result<Vec<DoctorSchedule>, StoreError> {
        Ok(self
            .staged
            .schedules
            .iter()
            .filter(|s| s.doctor_id == doctor && s.active)
            .cloned()
            .collect())
    }

    async fn insert_doctor_settlement(
        &mut self,
        settlement: &DoctorSettlement,
    ) -> Result<(), StoreError> {
        self.staged.settlements.push(settlement.clone());
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        *self.guard = self.staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        // Dropping the staged copy is the rollback.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Currency, Money};
    use rust_decimal_macros::dec;

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    #[tokio::test]
    async fn test_commit_makes_writes_visible() {
        let store = MemoryLedger::new();
        let bill = Bill::new(PatientId::new(), usd(dec!(100)), usd(dec!(0)));

        let mut tx = store.begin().await.unwrap();
        tx.insert_bill(&bill).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(tx.bill(bill.id).await.unwrap().is_some());
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_rollback_discards_staged_writes() {
        let store = MemoryLedger::new();
        let bill = Bill::new(PatientId::new(), usd(dec!(100)), usd(dec!(0)));

        let mut tx = store.begin().await.unwrap();
        tx.insert_bill(&bill).await.unwrap();
        tx.rollback().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(tx.bill(bill.id).await.unwrap().is_none());
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_transaction_leaves_no_trace() {
        let store = MemoryLedger::new();
        let bill = Bill::new(PatientId::new(), usd(dec!(100)), usd(dec!(0)));

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_bill(&bill).await.unwrap();
            // Dropped without commit.
        }

        let mut tx = store.begin().await.unwrap();
        assert!(tx.bill(bill.id).await.unwrap().is_none());
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_transaction_sees_own_staged_writes() {
        let store = MemoryLedger::new();
        let bill = Bill::new(PatientId::new(), usd(dec!(100)), usd(dec!(0)));

        let mut tx = store.begin().await.unwrap();
        tx.insert_bill(&bill).await.unwrap();
        assert!(tx.bill(bill.id).await.unwrap().is_some());
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_payment_requires_existing_bill() {
        let store = MemoryLedger::new();
        let payment = Payment::new(
            BillId::new_v7(),
            usd(dec!(50)),
            domain_ledger::PaymentMethod::Cash,
            UserId::new("teller-1"),
            ShiftId::new_v7(),
        );

        let mut tx = store.begin().await.unwrap();
        let err = tx.insert_payment(&payment).await.unwrap_err();
        assert!(err.is_constraint_violation());
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_open_shifts_sorted_most_recent_first() {
        let store = MemoryLedger::new();
        let user = UserId::new("cashier-1");

        let first = UserShift::open(user.clone(), usd(dec!(100)));
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = UserShift::open(user.clone(), usd(dec!(200)));

        let mut tx = store.begin().await.unwrap();
        tx.insert_shift(&first).await.unwrap();
        tx.insert_shift(&second).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let open = tx.open_shifts_for_user(&user).await.unwrap();
        assert_eq!(open.len(), 2);
        assert_eq!(open[0].id, second.id);
        tx.rollback().await.unwrap();
    }
}
