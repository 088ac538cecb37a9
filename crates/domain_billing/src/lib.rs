//! Billing Domain - Invoice creation and payment settlement
//!
//! This crate owns the two write paths of the financial core:
//!
//! - [`InvoiceManager`] raises a bill and its line items as one atomic
//!   unit.
//! - [`PaymentProcessor`] records a payment, recomputes the owning bill's
//!   paid/due/status triple from the full payment history, and — when the
//!   bill transitions to Paid — dispatches a [`PaymentSettled`] event to
//!   the registered [`SettlementAutomation`] handlers inside the same
//!   transaction. Notifications collected by the handlers are delivered
//!   after the commit; a delivery failure is logged and never rolls back
//!   the financial write.
//!
//! Downstream clinical effects (bed discharge, surgery confirmation) live
//! behind the handler trait so each one is independently testable and
//! idempotent.

pub mod invoice;
pub mod processor;
pub mod events;
pub mod ports;
pub mod error;

pub use invoice::{InvoiceManager, NewBill, NewBillItem};
pub use processor::{PaymentProcessor, PaymentRequest, PaymentOutcome};
pub use events::{BillingEvent, PaymentSettled};
pub use ports::{
    Notification, NotificationPort, NotifyTarget, SettlementAutomation, StaffRole,
};
pub use error::{AutomationError, BillingError};
