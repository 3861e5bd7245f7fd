// Income/expense totals over a ledger

use crate::money::{Amount, AmountError};
use crate::schema::LedgerEntry;
use serde::Serialize;

/// Derived totals; `balance` is always `income - expense`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub income: Amount,
    pub expense: Amount,
    pub balance: Amount,
}

impl Totals {
    /// Fold one entry in: credits add their absolute amount to income,
    /// everything else adds its absolute amount to expense.
    ///
    /// Leaves `self` untouched and returns `OutOfRange` if either side would
    /// overflow. Both sides stay non-negative, so `balance` cannot overflow.
    pub fn add(&mut self, entry: &LedgerEntry) -> Result<(), AmountError> {
        let overflow = || AmountError::OutOfRange(entry.amount.to_string());
        let amount = entry.amount.checked_abs().ok_or_else(overflow)?;

        let (income, expense) = if entry.credit {
            (self.income.checked_add(amount).ok_or_else(overflow)?, self.expense)
        } else {
            (self.income, self.expense.checked_add(amount).ok_or_else(overflow)?)
        };

        self.income = income;
        self.expense = expense;
        self.balance = income - expense;
        Ok(())
    }
}

/// Reduce ledger entries into totals, failing on the first overflowing entry
pub fn totals<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Result<Totals, AmountError> {
    let mut totals = Totals::default();
    for entry in entries {
        totals.add(entry)?;
    }
    Ok(totals)
}
