//! Settlement ports - read-only doctor directory

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{DoctorId, DomainPort, Money, PortError, Rate};

/// Read-only access to the doctor directory
///
/// Commission rates and appointment billing live in the directory
/// services outside this engine; settlement math consumes them through
/// this narrow port.
#[async_trait]
pub trait DoctorDirectory: DomainPort {
    /// The doctor's commission rate, if one is on file
    async fn commission_rate(&self, doctor: DoctorId) -> Result<Option<Rate>, PortError>;

    /// Sum of consultation fees for the doctor's Completed appointments
    /// whose date falls in `[period_start, period_end]`
    async fn completed_consultation_fees(
        &self,
        doctor: DoctorId,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Money, PortError>;
}
