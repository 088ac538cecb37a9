//! Patient operation (surgery) records and lifecycle state machine
//!
//! An operation advances from proposal through deposit collection to the
//! theater and, once completed, a one-way ward-transfer flag. Costs are
//! re-quoted at each approval step, so a revision always overwrites the
//! cost fields while coalescing everything else.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{DoctorId, Money, OperationId, PackageId, PatientId, TheaterId};

/// Surgery lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    /// Raised by the treating doctor
    Proposed,
    /// Endorsed by the surgical board
    Recommended,
    /// Awaiting the full deposit
    PendingDeposit,
    /// Awaiting a partial advance payment
    AdvancePaymentRequested,
    /// Deposit received; theater slot confirmed
    Scheduled,
    /// Underway in theater
    Running,
    /// Surgery finished
    Completed,
    /// Abandoned before completion
    Cancelled,
}

impl OperationStatus {
    /// Returns true while the operation is waiting on money before scheduling
    pub fn awaiting_deposit(&self) -> bool {
        matches!(
            self,
            OperationStatus::PendingDeposit | OperationStatus::AdvancePaymentRequested
        )
    }

    /// Returns true for states that hold a theater slot on their scheduled date
    pub fn occupies_theater(&self) -> bool {
        matches!(self, OperationStatus::Scheduled | OperationStatus::Running)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationStatus::Proposed => "Proposed",
            OperationStatus::Recommended => "Recommended",
            OperationStatus::PendingDeposit => "PendingDeposit",
            OperationStatus::AdvancePaymentRequested => "AdvancePaymentRequested",
            OperationStatus::Scheduled => "Scheduled",
            OperationStatus::Running => "Running",
            OperationStatus::Completed => "Completed",
            OperationStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for OperationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Proposed" => Ok(OperationStatus::Proposed),
            "Recommended" => Ok(OperationStatus::Recommended),
            "PendingDeposit" => Ok(OperationStatus::PendingDeposit),
            "AdvancePaymentRequested" => Ok(OperationStatus::AdvancePaymentRequested),
            "Scheduled" => Ok(OperationStatus::Scheduled),
            "Running" => Ok(OperationStatus::Running),
            "Completed" => Ok(OperationStatus::Completed),
            "Cancelled" => Ok(OperationStatus::Cancelled),
            other => Err(format!("unknown operation status: {}", other)),
        }
    }
}

/// A partial update to an operation.
///
/// Coalesce semantics: fields left `None` retain their stored value,
/// except the three cost fields, which are always written as supplied —
/// costs are re-quoted at each approval step, so an absent cost clears
/// the stored one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationRevision {
    /// New status; validated against the state machine
    pub status: Option<OperationStatus>,
    /// Agreed surgery cost (always overwritten)
    pub operation_cost: Option<Money>,
    /// Agreed medicine cost (always overwritten)
    pub medicine_cost: Option<Money>,
    /// Agreed equipment cost (always overwritten)
    pub equipment_cost: Option<Money>,
    /// Theater assignment (coalesced)
    pub theater_id: Option<TheaterId>,
    /// Planned date (coalesced)
    pub scheduled_date: Option<NaiveDate>,
    /// Planned duration in minutes (coalesced)
    pub duration_minutes: Option<i32>,
    /// Actual wheel-in time (coalesced)
    pub actual_start_time: Option<DateTime<Utc>>,
    /// Operating doctor (coalesced)
    pub doctor_id: Option<DoctorId>,
}

/// A surgery booked for a patient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientOperation {
    /// Unique identifier
    pub id: OperationId,
    /// Patient undergoing surgery
    pub patient_id: PatientId,
    /// Operating doctor
    pub doctor_id: DoctorId,
    /// Optional surgery package
    pub package_id: Option<PackageId>,
    /// Assigned theater, once known
    pub theater_id: Option<TheaterId>,
    /// Lifecycle status
    pub status: OperationStatus,
    /// Planned date
    pub scheduled_date: Option<NaiveDate>,
    /// Planned duration in minutes
    pub duration_minutes: Option<i32>,
    /// Actual wheel-in time
    pub actual_start_time: Option<DateTime<Utc>>,
    /// Agreed surgery cost, absent until quoted
    pub operation_cost: Option<Money>,
    /// Agreed medicine cost, absent until quoted
    pub medicine_cost: Option<Money>,
    /// Agreed equipment cost, absent until quoted
    pub equipment_cost: Option<Money>,
    /// Whether the completed patient has been moved to a ward bed.
    /// Monotonic: flips false→true exactly once.
    pub is_transferred: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl PatientOperation {
    /// Proposes a new operation
    pub fn propose(patient_id: PatientId, doctor_id: DoctorId) -> Self {
        let now = Utc::now();
        Self {
            id: OperationId::new_v7(),
            patient_id,
            doctor_id,
            package_id: None,
            theater_id: None,
            status: OperationStatus::Proposed,
            scheduled_date: None,
            duration_minutes: None,
            actual_start_time: None,
            operation_cost: None,
            medicine_cost: None,
            equipment_cost: None,
            is_transferred: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attaches a surgery package
    pub fn with_package(mut self, package_id: PackageId) -> Self {
        self.package_id = Some(package_id);
        self
    }

    /// Updates the status, validating the transition
    pub fn update_status(&mut self, status: OperationStatus) -> Result<(), InvalidTransition> {
        if !self.can_transition_to(status) {
            return Err(InvalidTransition {
                from: self.status,
                to: status,
            });
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Applies a revision with the documented coalesce semantics
    pub fn apply_revision(&mut self, revision: OperationRevision) -> Result<(), InvalidTransition> {
        if let Some(status) = revision.status {
            if status != self.status {
                self.update_status(status)?;
            }
        }

        // Costs are re-quoted on every revision: absent means cleared.
        self.operation_cost = revision.operation_cost;
        self.medicine_cost = revision.medicine_cost;
        self.equipment_cost = revision.equipment_cost;

        if let Some(theater_id) = revision.theater_id {
            self.theater_id = Some(theater_id);
        }
        if let Some(scheduled_date) = revision.scheduled_date {
            self.scheduled_date = Some(scheduled_date);
        }
        if let Some(duration) = revision.duration_minutes {
            self.duration_minutes = Some(duration);
        }
        if let Some(actual_start) = revision.actual_start_time {
            self.actual_start_time = Some(actual_start);
        }
        if let Some(doctor_id) = revision.doctor_id {
            self.doctor_id = doctor_id;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Flips the ward-transfer flag.
    ///
    /// Returns `false` when the flag was already set; calling again is a
    /// no-op rather than an error.
    pub fn mark_transferred(&mut self) -> Result<bool, InvalidTransition> {
        if self.status != OperationStatus::Completed {
            return Err(InvalidTransition {
                from: self.status,
                to: OperationStatus::Completed,
            });
        }
        if self.is_transferred {
            return Ok(false);
        }
        self.is_transferred = true;
        self.updated_at = Utc::now();
        Ok(true)
    }

    /// Sum of the agreed cost components, if any have been quoted
    pub fn total_agreed_cost(&self) -> Option<Money> {
        let costs = [self.operation_cost, self.medicine_cost, self.equipment_cost];
        let mut total: Option<Money> = None;
        for cost in costs.into_iter().flatten() {
            total = Some(match total {
                Some(t) => t + cost,
                None => cost,
            });
        }
        total
    }

    /// Returns true when no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        match self.status {
            OperationStatus::Cancelled => true,
            OperationStatus::Completed => self.is_transferred,
            _ => false,
        }
    }

    /// Returns true when the operation holds `theater` on `date`
    pub fn occupies(&self, theater: TheaterId, date: NaiveDate) -> bool {
        self.status.occupies_theater()
            && self.theater_id == Some(theater)
            && self.scheduled_date == Some(date)
    }

    /// Checks whether a transition is legal
    fn can_transition_to(&self, target: OperationStatus) -> bool {
        use OperationStatus::*;
        // Cancellation is allowed from any state that has not completed.
        if target == Cancelled {
            return !matches!(self.status, Completed | Cancelled);
        }
        matches!(
            (self.status, target),
            (Proposed, Recommended)
                | (Recommended, PendingDeposit)
                | (Recommended, AdvancePaymentRequested)
                | (PendingDeposit, Scheduled)
                | (AdvancePaymentRequested, Scheduled)
                | (Scheduled, Running)
                | (Running, Completed)
        )
    }
}

/// Rejected state-machine transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: OperationStatus,
    pub to: OperationStatus,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid operation transition: {} -> {}", self.from, self.to)
    }
}

impl std::error::Error for InvalidTransition {}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    fn operation_in(status: OperationStatus) -> PatientOperation {
        let mut op = PatientOperation::propose(PatientId::new(), DoctorId::new());
        op.status = status;
        op
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut op = PatientOperation::propose(PatientId::new(), DoctorId::new());

        for status in [
            OperationStatus::Recommended,
            OperationStatus::PendingDeposit,
            OperationStatus::Scheduled,
            OperationStatus::Running,
            OperationStatus::Completed,
        ] {
            op.update_status(status).unwrap();
        }
        assert_eq!(op.status, OperationStatus::Completed);
    }

    #[test]
    fn test_advance_payment_branch() {
        let mut op = operation_in(OperationStatus::Recommended);
        op.update_status(OperationStatus::AdvancePaymentRequested).unwrap();
        op.update_status(OperationStatus::Scheduled).unwrap();

        assert_eq!(op.status, OperationStatus::Scheduled);
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        let mut op = operation_in(OperationStatus::Proposed);
        let err = op.update_status(OperationStatus::Running).unwrap_err();
        assert_eq!(err.from, OperationStatus::Proposed);
        assert_eq!(err.to, OperationStatus::Running);

        let mut op = operation_in(OperationStatus::Scheduled);
        assert!(op.update_status(OperationStatus::Proposed).is_err());
    }

    #[test]
    fn test_cancel_from_any_pre_completed_state() {
        for status in [
            OperationStatus::Proposed,
            OperationStatus::Recommended,
            OperationStatus::PendingDeposit,
            OperationStatus::AdvancePaymentRequested,
            OperationStatus::Scheduled,
            OperationStatus::Running,
        ] {
            let mut op = operation_in(status);
            op.update_status(OperationStatus::Cancelled).unwrap();
            assert!(op.is_terminal());
        }

        let mut completed = operation_in(OperationStatus::Completed);
        assert!(completed.update_status(OperationStatus::Cancelled).is_err());
    }

    #[test]
    fn test_mark_transferred_requires_completed() {
        let mut op = operation_in(OperationStatus::Running);
        assert!(op.mark_transferred().is_err());
    }

    #[test]
    fn test_mark_transferred_is_idempotent() {
        let mut op = operation_in(OperationStatus::Completed);

        assert!(op.mark_transferred().unwrap());
        assert!(op.is_transferred);
        assert!(op.is_terminal());

        // Second call: no error, no effect.
        assert!(!op.mark_transferred().unwrap());
        assert!(op.is_transferred);
    }

    #[test]
    fn test_revision_overwrites_costs_and_coalesces_rest() {
        let mut op = operation_in(OperationStatus::Recommended);
        let theater = TheaterId::new();
        op.theater_id = Some(theater);
        op.duration_minutes = Some(90);
        op.operation_cost = Some(usd(dec!(4000)));
        op.medicine_cost = Some(usd(dec!(800)));

        op.apply_revision(OperationRevision {
            status: Some(OperationStatus::PendingDeposit),
            operation_cost: Some(usd(dec!(4500))),
            // medicine/equipment absent: cleared
            scheduled_date: Some(NaiveDate::from_ymd_opt(2026, 9, 14).unwrap()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(op.status, OperationStatus::PendingDeposit);
        assert_eq!(op.operation_cost, Some(usd(dec!(4500))));
        assert!(op.medicine_cost.is_none());
        assert!(op.equipment_cost.is_none());
        // Coalesced fields retained
        assert_eq!(op.theater_id, Some(theater));
        assert_eq!(op.duration_minutes, Some(90));
        assert!(op.scheduled_date.is_some());
    }

    #[test]
    fn test_revision_with_same_status_is_allowed() {
        let mut op = operation_in(OperationStatus::Scheduled);
        op.apply_revision(OperationRevision {
            status: Some(OperationStatus::Scheduled),
            duration_minutes: Some(120),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(op.duration_minutes, Some(120));
    }

    #[test]
    fn test_total_agreed_cost() {
        let mut op = operation_in(OperationStatus::PendingDeposit);
        assert!(op.total_agreed_cost().is_none());

        op.operation_cost = Some(usd(dec!(4000)));
        op.equipment_cost = Some(usd(dec!(600)));
        assert_eq!(op.total_agreed_cost(), Some(usd(dec!(4600))));
    }

    #[test]
    fn test_theater_occupancy() {
        let theater = TheaterId::new();
        let date = NaiveDate::from_ymd_opt(2026, 9, 14).unwrap();

        let mut op = operation_in(OperationStatus::Scheduled);
        op.theater_id = Some(theater);
        op.scheduled_date = Some(date);
        assert!(op.occupies(theater, date));

        // Awaiting deposit does not hold the slot
        op.status = OperationStatus::PendingDeposit;
        assert!(!op.occupies(theater, date));
    }

    #[test]
    fn test_awaiting_deposit() {
        assert!(OperationStatus::PendingDeposit.awaiting_deposit());
        assert!(OperationStatus::AdvancePaymentRequested.awaiting_deposit());
        assert!(!OperationStatus::Scheduled.awaiting_deposit());
    }
}
