//! Doctor Settlement Domain - Commission computation and payouts
//!
//! [`SettlementCalculator`] turns a doctor's completed, billable
//! consultations over a period into a commission payout: Σ fees × rate.
//! The calculation is a pure read over the doctor directory; recording a
//! payout is a single validated insert into the ledger.

pub mod settlement;
pub mod ports;
pub mod error;

pub use settlement::{DoctorPayout, SettlementCalculator};
pub use ports::DoctorDirectory;
pub use error::SettlementError;
