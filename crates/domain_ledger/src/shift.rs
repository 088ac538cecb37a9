//! Cashier shift records
//!
//! A shift is the bounded period during which a cashier is accountable for
//! cash collected. Closing a shift computes the expected drawer contents
//! from recorded cash payments and persists the counted amount alongside;
//! the discrepancy is kept for audit, never auto-corrected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{Money, ShiftId, UserId};

/// Shift lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftStatus {
    /// Shift is running; payments may be recorded against it
    Open,
    /// Shift has been closed and reconciled. Terminal: never reopened.
    Closed,
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShiftStatus::Open => "Open",
            ShiftStatus::Closed => "Closed",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ShiftStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(ShiftStatus::Open),
            "Closed" => Ok(ShiftStatus::Closed),
            other => Err(format!("unknown shift status: {}", other)),
        }
    }
}

/// Expected-vs-actual cash comparison at shift close
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CashReconciliation {
    /// Starting float plus recorded cash payments
    pub expected_cash: Money,
    /// Physically counted drawer contents
    pub actual_cash: Money,
    /// `actual − expected`; negative when the drawer is short
    pub discrepancy: Money,
}

/// A cashier session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserShift {
    /// Unique identifier
    pub id: ShiftId,
    /// Cashier identity
    pub user_id: UserId,
    /// When the shift opened
    pub start_time: DateTime<Utc>,
    /// When the shift closed, if it has
    pub end_time: Option<DateTime<Utc>>,
    /// Cash float at open
    pub starting_cash: Money,
    /// Expected drawer contents, computed at close
    pub ending_cash: Option<Money>,
    /// Counted drawer contents at close
    pub actual_cash: Option<Money>,
    /// Lifecycle status
    pub status: ShiftStatus,
    /// Audit notes (auto-close tags, cashier remarks)
    pub notes: Option<String>,
}

impl UserShift {
    /// Opens a new shift with the given cash float
    pub fn open(user_id: UserId, starting_cash: Money) -> Self {
        Self {
            id: ShiftId::new_v7(),
            user_id,
            start_time: Utc::now(),
            end_time: None,
            starting_cash,
            ending_cash: None,
            actual_cash: None,
            status: ShiftStatus::Open,
            notes: None,
        }
    }

    /// Returns true while the shift accepts payments
    pub fn is_open(&self) -> bool {
        self.status == ShiftStatus::Open
    }

    /// Closes the shift with a counted drawer amount.
    ///
    /// `collected_cash` is the sum of cash payments recorded against the
    /// shift; the expected drawer is `starting_cash + collected_cash`.
    pub fn close(
        &mut self,
        collected_cash: Money,
        actual_cash: Money,
        notes: Option<String>,
    ) -> CashReconciliation {
        let expected_cash = self.starting_cash + collected_cash;
        self.end_time = Some(Utc::now());
        self.ending_cash = Some(expected_cash);
        self.actual_cash = Some(actual_cash);
        self.status = ShiftStatus::Closed;
        if let Some(notes) = notes {
            self.append_note(&notes);
        }
        CashReconciliation {
            expected_cash,
            actual_cash,
            discrepancy: actual_cash - expected_cash,
        }
    }

    /// Closes the shift without a count, tagging the notes for audit.
    ///
    /// Used when a new shift start finds this one still open: the expected
    /// drawer is recorded, the counted amount stays absent.
    pub fn auto_close(&mut self, collected_cash: Money, tag: &str) {
        let expected_cash = self.starting_cash + collected_cash;
        self.end_time = Some(Utc::now());
        self.ending_cash = Some(expected_cash);
        self.status = ShiftStatus::Closed;
        self.append_note(tag);
    }

    /// Returns the reconciliation if the shift was closed with a count
    pub fn reconciliation(&self) -> Option<CashReconciliation> {
        let expected_cash = self.ending_cash?;
        let actual_cash = self.actual_cash?;
        Some(CashReconciliation {
            expected_cash,
            actual_cash,
            discrepancy: actual_cash - expected_cash,
        })
    }

    fn append_note(&mut self, note: &str) {
        match &mut self.notes {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(note);
            }
            None => self.notes = Some(note.to_string()),
        }
    }
}
