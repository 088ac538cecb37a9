//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for precise calculations without floating-point errors.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub, Mul, Neg};
use thiserror::Error;

/// Number of decimal places carried by billing amounts (currency minor units).
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    INR,
    AED,
    SGD,
}

impl Currency {
    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::INR => "₹",
            Currency::AED => "د.إ",
            Currency::SGD => "S$",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::INR => "INR",
            Currency::AED => "AED",
            Currency::SGD => "SGD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Division by zero")]
    DivisionByZero,
}

/// A monetary amount with associated currency
///
/// Money uses rust_decimal for precise arithmetic without floating-point
/// errors. Amounts are stored with 4 decimal places internally so that
/// commission-rate calculations do not lose precision before the final
/// rounding to currency minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(4),
            currency,
        }
    }

    /// Creates Money from an integer amount in minor units (e.g., cents)
    pub fn from_minor(minor_units: i64, currency: Currency) -> Self {
        let divisor = Decimal::new(10_i64.pow(MINOR_UNIT_SCALE), 0);
        Self::new(Decimal::new(minor_units, 0) / divisor, currency)
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: dec!(0),
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self {
            amount: self.amount.abs(),
            currency: self.currency,
        }
    }

    /// Rounds to the currency's minor-unit precision (2 decimal places)
    pub fn round_to_currency(&self) -> Self {
        Self {
            amount: self.amount.round_dp(MINOR_UNIT_SCALE),
            currency: self.currency,
        }
    }

    /// Clamps a negative amount to zero, leaving positive amounts unchanged
    pub fn clamp_non_negative(&self) -> Self {
        if self.is_negative() {
            Self::zero(self.currency)
        } else {
            *self
        }
    }

    /// Checked addition that returns an error on currency mismatch
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(Self::new(self.amount + other.amount, self.currency))
    }

    /// Checked subtraction that returns an error on currency mismatch
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(Self::new(self.amount - other.amount, self.currency))
    }

    /// Multiplies by a scalar (e.g., for rate calculations)
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.amount * factor, self.currency)
    }

    /// Divides by a scalar
    pub fn divide(&self, divisor: Decimal) -> Result<Self, MoneyError> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        Ok(Self::new(self.amount / divisor, self.currency))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.dp$}",
            self.currency.symbol(),
            self.amount,
            dp = MINOR_UNIT_SCALE as usize
        )
    }
}

impl PartialOrd for Money {
    /// Amounts are only ordered within the same currency.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency != other.currency {
            return None;
        }
        self.amount.partial_cmp(&other.amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(&other)
            .expect("Currency mismatch in Money::add")
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(&other)
            .expect("Currency mismatch in Money::sub")
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.amount, self.currency)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        self.multiply(factor)
    }
}

/// Represents a percentage rate (e.g., a doctor's commission rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.05 for 5%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a decimal value (e.g., 0.05 for 5%)
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates a rate from a percentage (e.g., 5.0 for 5%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / dec!(100),
        }
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }

    /// Applies this rate to a money amount
    pub fn apply(&self, money: &Money) -> Money {
        money.multiply(self.value)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn money_arithmetic_is_associative(
            a in -1_000_000i64..1_000_000i64,
            b in -1_000_000i64..1_000_000i64,
            c in -1_000_000i64..1_000_000i64
        ) {
            let ma = Money::from_minor(a, Currency::USD);
            let mb = Money::from_minor(b, Currency::USD);
            let mc = Money::from_minor(c, Currency::USD);

            prop_assert_eq!((ma + mb) + mc, ma + (mb + mc));
        }

        #[test]
        fn clamp_non_negative_never_negative(a in -1_000_000i64..1_000_000i64) {
            let m = Money::from_minor(a, Currency::USD);
            prop_assert!(!m.clamp_non_negative().is_negative());
        }
    }
}
