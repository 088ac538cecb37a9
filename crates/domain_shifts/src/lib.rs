//! Cashier Shift Domain - Session lifecycle and cash reconciliation
//!
//! [`ShiftRegister`] opens and closes cashier sessions. Starting a shift
//! defensively auto-closes any session the user left open — inside the
//! same transaction as the new insert, so two concurrent starts cannot
//! both leave an open shift behind. Closing computes expected drawer
//! contents from recorded cash payments and persists the counted amount
//! alongside; the discrepancy is recorded for audit, never corrected.

pub mod register;
pub mod error;

pub use register::{ShiftRegister, ShiftClose};
pub use error::ShiftError;
