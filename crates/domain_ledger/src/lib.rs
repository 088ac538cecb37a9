//! Ledger Data Model - Durable records of the billing & clinical-workflow engine
//!
//! This crate defines the records the transaction engine persists and the
//! contract of the store that persists them:
//!
//! - **Bills & payments**: the financial core. A bill's paid/due/status
//!   triple is always derivable from its payment history; the derivation
//!   lives here so every writer applies the same invariant.
//! - **Cashier shifts**: bounded accountability periods with cash
//!   reconciliation at close.
//! - **Admissions & beds**: ward occupancy, discharged directly or by
//!   settlement automation.
//! - **Patient operations**: the surgery lifecycle state machine.
//! - **Doctor schedules & settlements**: weekly availability rows and
//!   recorded commission payouts.
//!
//! The [`LedgerStore`]/[`LedgerTx`] pair is the atomic multi-statement
//! execution contract: every multi-record mutation in the engine runs
//! inside one `LedgerTx` and either commits completely or leaves no trace.

pub mod bill;
pub mod payment;
pub mod shift;
pub mod admission;
pub mod operation;
pub mod schedule;
pub mod settlement;
pub mod ports;
pub mod error;

pub use bill::{Bill, BillItem, BillStatus, SETTLEMENT_EPSILON};
pub use payment::{Payment, PaymentMethod};
pub use shift::{UserShift, ShiftStatus, CashReconciliation};
pub use admission::{Admission, AdmissionStatus, Bed, BedStatus};
pub use operation::{PatientOperation, OperationStatus, OperationRevision};
pub use schedule::DoctorSchedule;
pub use settlement::DoctorSettlement;
pub use ports::{LedgerStore, LedgerTx};
pub use error::StoreError;
