use crate::categories::{CategoryId, CategoryTree};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Number of fractional digits used when chaining running balances, to absorb
/// the noise of sources that give amounts as binary floats.
const BALANCE_PRECISION: u32 = 2;

/// A single line of a bank statement.
///
/// Two transactions are equal when all the fields that came from the bank are
/// equal.  The balance after the transaction is part of the identity, so two
/// purchases with the same description and amount on the same day are still
/// distinct.  The category override is a user annotation and is not part of
/// the identity.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,

    // Positive for credits, negative for debits
    pub amount: Decimal,

    // The balance of the account immediately after this transaction
    pub running_balance: Decimal,

    pub counterparty: Option<String>,

    category_override: Option<CategoryId>,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        description: &str,
        amount: Decimal,
        running_balance: Decimal,
    ) -> Self {
        Transaction {
            date,
            description: description.into(),
            amount,
            running_balance,
            counterparty: None,
            category_override: None,
        }
    }

    #[must_use]
    pub fn with_counterparty(mut self, counterparty: Option<&str>) -> Self {
        self.counterparty = counterparty.map(str::to_string);
        self
    }

    /// The category of the transaction: the override if one was set,
    /// otherwise whatever the rules of the tree say.
    #[must_use]
    pub fn get_category(&self, categories: &CategoryTree) -> CategoryId {
        match self.category_override {
            Some(id) => id,
            None => categories.from_description(
                &self.description,
                self.counterparty.as_deref(),
            ),
        }
    }

    /// Pin the category, whatever the classification rules become later.
    pub fn set_category_override(&mut self, category: CategoryId) {
        self.category_override = Some(category);
    }

    pub fn clear_category_override(&mut self) {
        self.category_override = None;
    }

    #[must_use]
    pub fn category_override(&self) -> Option<CategoryId> {
        self.category_override
    }

    #[must_use]
    pub fn is_debit(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Whether self can come immediately after `previous` in the ledger:
    /// it is not older, and applying its amount to the previous balance
    /// gives its own balance.
    #[must_use]
    pub fn follows(&self, previous: &Transaction) -> bool {
        previous.date <= self.date
            && (previous.running_balance + self.amount)
                .round_dp(BALANCE_PRECISION)
                == self.running_balance.round_dp(BALANCE_PRECISION)
    }
}

impl PartialEq for Transaction {
    fn eq(&self, right: &Self) -> bool {
        self.date == right.date
            && self.description == right.description
            && self.amount == right.amount
            && self.running_balance == right.running_balance
            && self.counterparty == right.counterparty
    }
}

impl Eq for Transaction {}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} (balance {})",
            self.date, self.description, self.amount, self.running_balance
        )?;
        if let Some(cp) = &self.counterparty {
            write!(f, " [{cp}]")?;
        }
        Ok(())
    }
}
