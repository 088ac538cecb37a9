//! Ward admission and bed records
//!
//! An admission ties a patient to a bed for the duration of an inpatient
//! stay. Discharge happens directly from the ward desk or automatically
//! when the admission's bill settles; either way it is idempotent and
//! frees the bed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{AdmissionId, BedId, PatientId};

/// Admission lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdmissionStatus {
    /// Patient occupies the bed
    Admitted,
    /// Stay has ended
    Discharged,
}

impl fmt::Display for AdmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdmissionStatus::Admitted => "Admitted",
            AdmissionStatus::Discharged => "Discharged",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for AdmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admitted" => Ok(AdmissionStatus::Admitted),
            "Discharged" => Ok(AdmissionStatus::Discharged),
            other => Err(format!("unknown admission status: {}", other)),
        }
    }
}

/// An inpatient stay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admission {
    /// Unique identifier
    pub id: AdmissionId,
    /// Admitted patient
    pub patient_id: PatientId,
    /// Occupied bed
    pub bed_id: BedId,
    /// When the stay began
    pub admission_date: DateTime<Utc>,
    /// When the stay ended, if it has
    pub discharge_date: Option<DateTime<Utc>>,
    /// Lifecycle status
    pub status: AdmissionStatus,
}

impl Admission {
    /// Admits a patient to a bed
    pub fn new(patient_id: PatientId, bed_id: BedId) -> Self {
        Self {
            id: AdmissionId::new_v7(),
            patient_id,
            bed_id,
            admission_date: Utc::now(),
            discharge_date: None,
            status: AdmissionStatus::Admitted,
        }
    }

    /// Marks the admission discharged.
    ///
    /// Returns `false` when the admission was already discharged, so
    /// callers can skip downstream side effects on replays.
    pub fn discharge(&mut self) -> bool {
        if self.status == AdmissionStatus::Discharged {
            return false;
        }
        self.status = AdmissionStatus::Discharged;
        self.discharge_date = Some(Utc::now());
        true
    }
}

/// Bed availability status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BedStatus {
    /// Free for allocation
    Available,
    /// Held by an admission
    Occupied,
    /// Out of service
    Maintenance,
}

impl fmt::Display for BedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BedStatus::Available => "Available",
            BedStatus::Occupied => "Occupied",
            BedStatus::Maintenance => "Maintenance",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for BedStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(BedStatus::Available),
            "Occupied" => Ok(BedStatus::Occupied),
            "Maintenance" => Ok(BedStatus::Maintenance),
            other => Err(format!("unknown bed status: {}", other)),
        }
    }
}

/// A ward bed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bed {
    /// Unique identifier
    pub id: BedId,
    /// Ward label (e.g. "ICU", "General-2")
    pub ward: String,
    /// Availability status
    pub status: BedStatus,
}

impl Bed {
    /// Creates a bed in the given ward, initially available
    pub fn new(ward: impl Into<String>) -> Self {
        Self {
            id: BedId::new_v7(),
            ward: ward.into(),
            status: BedStatus::Available,
        }
    }

    /// Marks the bed occupied
    pub fn occupy(&mut self) {
        self.status = BedStatus::Occupied;
    }

    /// Marks the bed available
    pub fn release(&mut self) {
        self.status = BedStatus::Available;
    }
}
