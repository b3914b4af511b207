use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// The aggregate totals for a user, as computed by the wallet service.
///
/// The service is expected to keep `balance == income - expenses`, where `expenses` is reported
/// as a positive magnitude. Nothing here enforces that; see `is_consistent`.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Summary {
    pub(crate) balance: Amount,
    pub(crate) income: Amount,
    pub(crate) expenses: Amount,
}

impl Summary {
    /// The all-zero summary. This is what an empty store holds and what a malformed summary
    /// payload decodes to.
    pub const ZERO: Summary = Summary {
        balance: Amount::ZERO,
        income: Amount::ZERO,
        expenses: Amount::ZERO,
    };

    pub fn new(
        balance: impl Into<Amount>,
        income: impl Into<Amount>,
        expenses: impl Into<Amount>,
    ) -> Self {
        Self {
            balance: balance.into(),
            income: income.into(),
            expenses: expenses.into(),
        }
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn income(&self) -> Amount {
        self.income
    }

    pub fn expenses(&self) -> Amount {
        self.expenses
    }

    /// Whether `balance == income - |expenses|`. Services differ on the sign of `expenses`, so
    /// the magnitude is used. Totals whose difference overflows are never consistent.
    pub fn is_consistent(&self) -> bool {
        self.income
            .checked_sub(self.expenses.abs())
            .is_some_and(|expected| expected == self.balance)
    }
}
