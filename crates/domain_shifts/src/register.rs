//! Shift register
//!
//! Opens and closes cashier sessions against the ledger store. The
//! at-most-one-open-shift-per-user invariant is enforced by running the
//! defensive auto-close and the new insert in one transaction.

use std::sync::Arc;

use tracing::{info, warn};

use core_kernel::{Money, ShiftId, UserId};
use domain_ledger::{CashReconciliation, LedgerStore, LedgerTx, Payment, UserShift};

use crate::error::ShiftError;

/// Note tagged onto a shift closed by a subsequent start
const AUTO_CLOSE_TAG: &str = "Auto-closed by new shift start";

/// Result of closing a shift
#[derive(Debug, Clone)]
pub struct ShiftClose {
    /// The shift as persisted after close
    pub shift: UserShift,
    /// Expected vs counted drawer contents
    pub reconciliation: CashReconciliation,
}

/// Opens, closes, and reports on cashier sessions
pub struct ShiftRegister {
    store: Arc<dyn LedgerStore>,
}

impl ShiftRegister {
    /// Creates a shift register over a ledger store
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Starts a shift for a user with the given cash float.
    ///
    /// Any shift the user still has open is auto-closed first — expected
    /// drawer recorded, counted amount left absent, notes tagged — within
    /// the same transaction as the new insert, so concurrent starts
    /// cannot leave two open shifts behind.
    ///
    /// # Errors
    ///
    /// `Validation` if the user id is blank; `Transaction` on store failure.
    pub async fn start_shift(
        &self,
        user_id: UserId,
        starting_cash: Money,
    ) -> Result<UserShift, ShiftError> {
        if user_id.is_empty() {
            return Err(ShiftError::validation("user id must not be empty"));
        }

        let mut tx = self
            .store
            .begin()
            .await
            .map_err(ShiftError::transaction(format!("start_shift({})", user_id)))?;

        let result = self.open_exclusive(tx.as_mut(), &user_id, starting_cash).await;

        match result {
            Ok(shift) => {
                tx.commit()
                    .await
                    .map_err(ShiftError::transaction(format!("start_shift({})", user_id)))?;
                info!(shift_id = %shift.id, user = %user_id, "shift opened");
                Ok(shift)
            }
            Err(err) => {
                rollback_quietly(tx).await;
                Err(err)
            }
        }
    }

    /// Returns the user's most recently started open shift, if any
    pub async fn current_shift(&self, user_id: &UserId) -> Result<Option<UserShift>, ShiftError> {
        let mut tx = self
            .store
            .begin()
            .await
            .map_err(ShiftError::transaction(format!("current_shift({})", user_id)))?;
        let open = tx
            .open_shifts_for_user(user_id)
            .await
            .map_err(ShiftError::transaction(format!("current_shift({})", user_id)));
        rollback_quietly(tx).await;
        Ok(open?.into_iter().next())
    }

    /// Closes a shift with the counted drawer amount.
    ///
    /// Expected cash is `starting_cash + Σ cash payments` recorded against
    /// the shift. The discrepancy between counted and expected is
    /// persisted for audit — it is never a failure and never corrected.
    ///
    /// # Errors
    ///
    /// `ShiftNotFound`, `AlreadyClosed`, or `Transaction`.
    pub async fn close_shift(
        &self,
        shift_id: ShiftId,
        actual_cash: Money,
        notes: Option<String>,
    ) -> Result<ShiftClose, ShiftError> {
        let wrap = || ShiftError::transaction(format!("close_shift({})", shift_id));

        let mut tx = self.store.begin().await.map_err(wrap())?;

        let result = async {
            let mut shift = tx
                .shift(shift_id)
                .await
                .map_err(wrap())?
                .ok_or(ShiftError::ShiftNotFound(shift_id))?;
            if !shift.is_open() {
                return Err(ShiftError::AlreadyClosed(shift_id));
            }

            let payments = tx.payments_for_shift(shift_id).await.map_err(wrap())?;
            let collected_cash = sum_cash(&payments, shift.starting_cash);

            let reconciliation = shift.close(collected_cash, actual_cash, notes);
            tx.update_shift(&shift).await.map_err(wrap())?;
            Ok(ShiftClose {
                shift,
                reconciliation,
            })
        }
        .await;

        match result {
            Ok(close) => {
                tx.commit().await.map_err(wrap())?;
                info!(
                    shift_id = %shift_id,
                    expected = %close.reconciliation.expected_cash,
                    actual = %close.reconciliation.actual_cash,
                    discrepancy = %close.reconciliation.discrepancy,
                    "shift closed"
                );
                Ok(close)
            }
            Err(err) => {
                rollback_quietly(tx).await;
                Err(err)
            }
        }
    }

    /// Total of all payments (any method) accounted under a shift
    pub async fn shift_revenue(&self, shift_id: ShiftId) -> Result<Money, ShiftError> {
        let wrap = || ShiftError::transaction(format!("shift_revenue({})", shift_id));

        let mut tx = self.store.begin().await.map_err(wrap())?;
        let result = async {
            let shift = tx
                .shift(shift_id)
                .await
                .map_err(wrap())?
                .ok_or(ShiftError::ShiftNotFound(shift_id))?;
            let payments = tx.payments_for_shift(shift_id).await.map_err(wrap())?;
            let zero = Money::zero(shift.starting_cash.currency());
            Ok(payments.iter().fold(zero, |acc, p| acc + p.amount))
        }
        .await;
        rollback_quietly(tx).await;
        result
    }

    /// Auto-closes leftovers and opens the new shift inside the caller's
    /// transaction
    async fn open_exclusive(
        &self,
        tx: &mut dyn LedgerTx,
        user_id: &UserId,
        starting_cash: Money,
    ) -> Result<UserShift, ShiftError> {
        let wrap = || ShiftError::transaction(format!("start_shift({})", user_id));

        let leftovers = tx.open_shifts_for_user(user_id).await.map_err(wrap())?;
        for mut leftover in leftovers {
            let payments = tx.payments_for_shift(leftover.id).await.map_err(wrap())?;
            let collected_cash = sum_cash(&payments, leftover.starting_cash);
            leftover.auto_close(collected_cash, AUTO_CLOSE_TAG);
            tx.update_shift(&leftover).await.map_err(wrap())?;
            warn!(
                shift_id = %leftover.id,
                user = %user_id,
                "open shift auto-closed by new shift start"
            );
        }

        let shift = UserShift::open(user_id.clone(), starting_cash);
        tx.insert_shift(&shift).await.map_err(wrap())?;
        Ok(shift)
    }
}

/// Sums the cash subset of a shift's payments in the float's currency
fn sum_cash(payments: &[Payment], starting_cash: Money) -> Money {
    payments
        .iter()
        .filter(|p| p.is_cash())
        .fold(Money::zero(starting_cash.currency()), |acc, p| acc + p.amount)
}

async fn rollback_quietly(tx: Box<dyn LedgerTx>) {
    if let Err(err) = tx.rollback().await {
        tracing::warn!(error = %err, "transaction rollback failed");
    }
}
