//! Stub implementations of the external collaborator ports
//!
//! The engine consumes a notification service and two read-only
//! directories it does not own. These stubs stand in for them: recording
//! what was sent, answering from fixed data, or failing on purpose.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{DoctorId, DomainPort, Money, PatientId, PortError, Rate};
use domain_billing::{Notification, NotificationPort};
use domain_clinical::PatientDirectory;
use domain_settlement::DoctorDirectory;

/// Notification port that records every delivery
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl DomainPort for RecordingNotifier {}

#[async_trait]
impl NotificationPort for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), PortError> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Notification port that always fails delivery
#[derive(Debug, Default)]
pub struct FailingNotifier;

impl DomainPort for FailingNotifier {}

#[async_trait]
impl NotificationPort for FailingNotifier {
    async fn notify(&self, _notification: &Notification) -> Result<(), PortError> {
        Err(PortError::ServiceUnavailable {
            service: "notifications".to_string(),
        })
    }
}

/// Patient directory answering from a fixed name table
#[derive(Debug, Default)]
pub struct StaticPatientDirectory {
    names: HashMap<PatientId, String>,
}

impl StaticPatientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a patient name
    pub fn with_patient(mut self, id: PatientId, name: impl Into<String>) -> Self {
        self.names.insert(id, name.into());
        self
    }
}

impl DomainPort for StaticPatientDirectory {}

#[async_trait]
impl PatientDirectory for StaticPatientDirectory {
    async fn patient_name(&self, id: PatientId) -> Result<Option<String>, PortError> {
        Ok(self.names.get(&id).cloned())
    }
}

/// Doctor directory answering with a fixed rate and fee total
#[derive(Debug)]
pub struct StaticDoctorDirectory {
    rate: Option<Rate>,
    fees: Money,
}

impl StaticDoctorDirectory {
    /// Creates a directory with the given commission rate and period fees
    pub fn new(rate: Option<Rate>, fees: Money) -> Self {
        Self { rate, fees }
    }
}

impl DomainPort for StaticDoctorDirectory {}

#[async_trait]
impl DoctorDirectory for StaticDoctorDirectory {
    async fn commission_rate(&self, _doctor: DoctorId) -> Result<Option<Rate>, PortError> {
        Ok(self.rate)
    }

    async fn completed_consultation_fees(
        &self,
        _doctor: DoctorId,
        _period_start: NaiveDate,
        _period_end: NaiveDate,
    ) -> Result<Money, PortError> {
        Ok(self.fees)
    }
}
