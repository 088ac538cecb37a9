//! Billing ports - settlement automation and notifications
//!
//! The payment processor knows nothing about wards or theaters. Downstream
//! clinical effects plug in through [`SettlementAutomation`]; outbound
//! messages leave through [`NotificationPort`]. Handlers run inside the
//! payment transaction and must be idempotent; notifications they return
//! are delivered only after the transaction commits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{DomainPort, PortError, UserId};
use domain_ledger::LedgerTx;

use crate::error::AutomationError;
use crate::events::PaymentSettled;

/// Staff roles notifications can be addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffRole {
    /// Hospital administration desk
    Admin,
    /// Operating theater staff
    OtStaff,
    /// Billing counter staff
    Cashier,
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StaffRole::Admin => "Admin",
            StaffRole::OtStaff => "OtStaff",
            StaffRole::Cashier => "Cashier",
        };
        write!(f, "{}", s)
    }
}

/// Addressee of a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyTarget {
    /// Everyone holding a role
    Role(StaffRole),
    /// A single user
    User(UserId),
}

/// An outbound notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Who receives it
    pub target: NotifyTarget,
    /// Short title
    pub title: String,
    /// Message body
    pub message: String,
}

impl Notification {
    /// Creates a notification addressed to a role
    pub fn for_role(role: StaffRole, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: NotifyTarget::Role(role),
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Port to the external notification service
///
/// Fire-and-forget: the engine logs delivery failures and moves on. A
/// notification must never decide the fate of a financial write.
#[async_trait]
pub trait NotificationPort: DomainPort {
    /// Delivers one notification
    async fn notify(&self, notification: &Notification) -> Result<(), PortError>;
}

/// A downstream reaction to a bill becoming fully paid
///
/// Implementations run inside the payment transaction: their writes share
/// its commit/rollback fate. Each handler must be idempotent — the
/// processor fires only on the transition to Paid, but a handler may still
/// see an already-applied state after a retried payment.
#[async_trait]
pub trait SettlementAutomation: Send + Sync {
    /// Short name used in logs and error context
    fn name(&self) -> &'static str;

    /// Reacts to the settled bill, returning notifications to deliver
    /// after commit
    async fn on_bill_settled(
        &self,
        tx: &mut dyn LedgerTx,
        event: &PaymentSettled,
    ) -> Result<Vec<Notification>, AutomationError>;
}
