//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for common entities. Fixtures are consistent
//! and predictable so unit tests read cleanly.

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, PatientId, DoctorId, UserId};

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// The deployment currency used throughout the test suite
    pub fn currency() -> Currency {
        Currency::USD
    }

    /// A standard bill total
    pub fn usd_1000() -> Money {
        Money::new(dec!(1000.00), Currency::USD)
    }

    /// A smaller amount for partial payments
    pub fn usd_200() -> Money {
        Money::new(dec!(200.00), Currency::USD)
    }

    /// A typical cashier float
    pub fn starting_float() -> Money {
        Money::new(dec!(5000.00), Currency::USD)
    }

    /// Zero in the test currency
    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// A fresh patient id
    pub fn patient() -> PatientId {
        PatientId::new()
    }

    /// A fresh doctor id
    pub fn doctor() -> DoctorId {
        DoctorId::new()
    }

    /// A cashier identity
    pub fn cashier() -> UserId {
        UserId::new("cashier-01")
    }

    /// A second cashier identity for multi-user tests
    pub fn other_cashier() -> UserId {
        UserId::new("cashier-02")
    }
}

/// Fixture for temporal test data
pub struct TimeFixtures;

impl TimeFixtures {
    /// Start of a monthly settlement period
    pub fn period_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
    }

    /// End of a monthly settlement period
    pub fn period_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 31).unwrap()
    }

    /// A theater scheduling date
    pub fn theater_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 14).unwrap()
    }
}
