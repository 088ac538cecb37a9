//! Doctor weekly schedule records
//!
//! A schedule row says a doctor works a given weekday between two times.
//! Rows are soft-deleted via the `active` flag so historical availability
//! stays auditable.

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::DoctorId;

/// One weekly working block for a doctor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSchedule {
    /// Unique identifier
    pub id: Uuid,
    /// Doctor the block belongs to
    pub doctor_id: DoctorId,
    /// Day of week the block recurs on
    pub weekday: Weekday,
    /// Block start, inclusive
    pub start_time: NaiveTime,
    /// Block end, inclusive
    pub end_time: NaiveTime,
    /// Soft-delete flag; inactive rows never satisfy availability checks
    pub active: bool,
}

impl DoctorSchedule {
    /// Creates an active weekly block
    pub fn new(doctor_id: DoctorId, weekday: Weekday, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            doctor_id,
            weekday,
            start_time,
            end_time,
            active: true,
        }
    }

    /// Soft-deletes the block
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Returns true when this block covers the given instant.
    ///
    /// The weekday must match and the time of day must fall within
    /// `[start_time, end_time]`, both bounds inclusive.
    pub fn covers(&self, when: DateTime<Utc>) -> bool {
        if !self.active || when.weekday() != self.weekday {
            return false;
        }
        let time = when.time();
        self.start_time <= time && time <= self.end_time
    }
}
