//! Custom Test Assertions
//!
//! Specialized assertion helpers for domain types that give more
//! meaningful error messages than standard assertions.

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_ledger::{Bill, BillStatus, SETTLEMENT_EPSILON};

/// Asserts that two Money values are exactly equal
pub fn assert_money_eq(actual: &Money, expected: &Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "Money amounts differ: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts that two Money values are approximately equal within a tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts the bill settlement invariant holds:
/// `due = max(total - paid, 0)` and the status matches the derivation.
pub fn assert_bill_invariants(bill: &Bill) {
    let expected_due = (bill.total_amount - bill.paid_amount).clamp_non_negative();
    assert_money_eq(&bill.due_amount, &expected_due);

    let expected_status = if bill.due_amount.amount() <= SETTLEMENT_EPSILON {
        BillStatus::Paid
    } else if bill.paid_amount.is_positive() {
        BillStatus::Partial
    } else {
        BillStatus::Pending
    };
    assert_eq!(
        bill.status, expected_status,
        "Bill {} status {} does not match derivation (total={}, paid={}, due={})",
        bill.id, bill.status, bill.total_amount, bill.paid_amount, bill.due_amount
    );
}
