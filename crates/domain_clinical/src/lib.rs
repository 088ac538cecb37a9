//! Clinical Workflow Domain - Surgery lifecycle and settlement automation
//!
//! Two concerns live here:
//!
//! - [`OperationLifecycle`] advances surgeries through their state machine
//!   (propose, recommend, collect deposit, schedule, run, complete,
//!   transfer to ward), exposes the advisory theater-booking query, and
//!   answers doctor time-availability from weekly schedule rows.
//! - The settlement automation handlers react to a fully-paid bill:
//!   [`AdmissionDischargeAutomation`] discharges the linked admission and
//!   frees its bed; [`OperationConfirmationAutomation`] moves a patient's
//!   awaiting-deposit surgery to Scheduled. Both are idempotent and run
//!   inside the payment transaction.

pub mod lifecycle;
pub mod automation;
pub mod ports;
pub mod error;

pub use lifecycle::{NewOperation, OperationLifecycle};
pub use automation::{AdmissionDischargeAutomation, OperationConfirmationAutomation};
pub use ports::PatientDirectory;
pub use error::ClinicalError;
