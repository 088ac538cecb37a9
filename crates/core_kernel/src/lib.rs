//! Core Kernel - Foundational types and utilities for the hospital operations platform
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers for clinical and financial entities
//! - Port abstractions for external collaborators

pub mod money;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, Rate, MoneyError};
pub use identifiers::{
    PatientId, DoctorId, BillId, BillItemId, PaymentId, ShiftId,
    AdmissionId, BedId, OperationId, TheaterId, PackageId, SettlementId,
    UserId,
};
pub use ports::{DomainPort, PortError};
pub use error::CoreError;
