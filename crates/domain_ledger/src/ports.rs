//! The transactional store contract
//!
//! Every multi-statement mutation in the engine runs inside one
//! [`LedgerTx`]: begin a transaction, perform the reads and writes, then
//! [`LedgerTx::commit`]. Dropping a transaction without committing
//! discards everything it staged, so `?`-propagation on any step leaves
//! the store untouched.
//!
//! Isolation requirement: concurrent transactions touching the same bill
//! must not lose updates. Adapters satisfy this either by serializing
//! transactions outright (the in-memory store) or with row-level locking
//! (`bill_for_update` maps to `SELECT ... FOR UPDATE` in PostgreSQL).

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{
    AdmissionId, BedId, BillId, DoctorId, OperationId, PatientId, ShiftId, TheaterId, UserId,
};

use crate::admission::{Admission, Bed};
use crate::bill::{Bill, BillItem};
use crate::error::StoreError;
use crate::operation::PatientOperation;
use crate::payment::Payment;
use crate::schedule::DoctorSchedule;
use crate::settlement::DoctorSettlement;
use crate::shift::UserShift;

/// Factory for ledger transactions
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Begins a new transaction
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError>;
}

/// One atomic unit of ledger work
///
/// All reads within a transaction observe a consistent snapshot that
/// includes the transaction's own staged writes. Nothing becomes visible
/// to other transactions before [`LedgerTx::commit`] returns.
#[async_trait]
pub trait LedgerTx: Send {
    // --- bills ---

    /// Inserts a bill header
    async fn insert_bill(&mut self, bill: &Bill) -> Result<(), StoreError>;

    /// Inserts the line items of a bill
    async fn insert_bill_items(&mut self, items: &[BillItem]) -> Result<(), StoreError>;

    /// Reads a bill
    async fn bill(&mut self, id: BillId) -> Result<Option<Bill>, StoreError>;

    /// Reads a bill, locking the row against concurrent settlement writers
    async fn bill_for_update(&mut self, id: BillId) -> Result<Option<Bill>, StoreError>;

    /// Writes back a bill's paid/due/status triple
    async fn update_bill_settlement(&mut self, bill: &Bill) -> Result<(), StoreError>;

    /// Reads a bill's line items
    async fn bill_items(&mut self, id: BillId) -> Result<Vec<BillItem>, StoreError>;

    // --- payments ---

    /// Appends a payment
    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), StoreError>;

    /// All payments recorded against a bill
    async fn payments_for_bill(&mut self, id: BillId) -> Result<Vec<Payment>, StoreError>;

    /// All payments accounted under a shift
    async fn payments_for_shift(&mut self, id: ShiftId) -> Result<Vec<Payment>, StoreError>;

    // --- cashier shifts ---

    /// Inserts a shift
    async fn insert_shift(&mut self, shift: &UserShift) -> Result<(), StoreError>;

    /// Writes back a shift's close/reconciliation fields
    async fn update_shift(&mut self, shift: &UserShift) -> Result<(), StoreError>;

    /// Reads a shift
    async fn shift(&mut self, id: ShiftId) -> Result<Option<UserShift>, StoreError>;

    /// Open shifts for a user, most recently started first
    async fn open_shifts_for_user(&mut self, user: &UserId) -> Result<Vec<UserShift>, StoreError>;

    // --- admissions and beds ---

    /// Inserts an admission
    async fn insert_admission(&mut self, admission: &Admission) -> Result<(), StoreError>;

    /// Reads an admission
    async fn admission(&mut self, id: AdmissionId) -> Result<Option<Admission>, StoreError>;

    /// Writes back an admission's status fields
    async fn update_admission(&mut self, admission: &Admission) -> Result<(), StoreError>;

    /// Inserts a bed
    async fn insert_bed(&mut self, bed: &Bed) -> Result<(), StoreError>;

    /// Reads a bed
    async fn bed(&mut self, id: BedId) -> Result<Option<Bed>, StoreError>;

    /// Writes back a bed's status
    async fn update_bed(&mut self, bed: &Bed) -> Result<(), StoreError>;

    // --- patient operations ---

    /// Inserts an operation
    async fn insert_operation(&mut self, operation: &PatientOperation) -> Result<(), StoreError>;

    /// Reads an operation
    async fn operation(&mut self, id: OperationId) -> Result<Option<PatientOperation>, StoreError>;

    /// Reads an operation, locking the row against concurrent lifecycle writers
    async fn operation_for_update(
        &mut self,
        id: OperationId,
    ) -> Result<Option<PatientOperation>, StoreError>;

    /// Writes back an operation's full record
    async fn update_operation(&mut self, operation: &PatientOperation) -> Result<(), StoreError>;

    /// A patient's operations currently awaiting a deposit, oldest first
    async fn operations_awaiting_deposit(
        &mut self,
        patient: PatientId,
    ) -> Result<Vec<PatientOperation>, StoreError>;

    /// Operations holding the given theater on the given date
    async fn operations_for_theater_on(
        &mut self,
        theater: TheaterId,
        date: NaiveDate,
    ) -> Result<Vec<PatientOperation>, StoreError>;

    // --- doctor schedules ---

    /// Inserts a weekly schedule block
    async fn insert_schedule(&mut self, schedule: &DoctorSchedule) -> Result<(), StoreError>;

    /// Active weekly schedule blocks for a doctor
    async fn schedules_for_doctor(
        &mut self,
        doctor: DoctorId,
    ) -> Result<Vec<DoctorSchedule>, StoreError>;

    // --- doctor settlements ---

    /// Records a commission payout
    async fn insert_doctor_settlement(
        &mut self,
        settlement: &DoctorSettlement,
    ) -> Result<(), StoreError>;

    // --- transaction control ---

    /// Makes the transaction's writes durable and visible
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Discards the transaction's writes explicitly
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
