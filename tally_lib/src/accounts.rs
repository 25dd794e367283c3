use crate::errors::{Error, Result};
use crate::reconcile::reconcile;
use crate::times::DateRange;
use crate::transactions::Transaction;
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;

/// One physical bank account and its ledger.
///
/// Transactions added one at a time with `add_transaction` are kept in
/// whatever order they came, until `postprocess` or `update_from_fresh`
/// reconciles them.  Queries always see a reconciled view.
#[derive(Debug, Clone)]
pub struct Account {
    // Unique among the accounts of a session
    pub name: String,

    transactions: Vec<Transaction>,

    // Whether `transactions` is known to be in ledger order
    reconciled: bool,
}

impl Account {
    pub fn new(name: &str) -> Self {
        Account {
            name: name.into(),
            transactions: Vec::new(),
            reconciled: true,
        }
    }

    /// Append a transaction, without checking where it belongs.
    pub fn add_transaction(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
        self.reconciled = self.transactions.len() <= 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    #[must_use]
    pub fn is_reconciled(&self) -> bool {
        self.reconciled
    }

    /// The transactions in their stored order.
    pub fn iter_transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    pub fn iter_transactions_mut(
        &mut self,
    ) -> impl Iterator<Item = &mut Transaction> {
        self.transactions.iter_mut()
    }

    fn unreconcilable(&self, source: crate::reconcile::Unreconcilable) -> Error {
        Error::Unreconcilable {
            account: self.name.clone(),
            source,
        }
    }

    /// Re-arrange the stored transactions in ledger order.
    /// On error, the stored order is unchanged.
    pub fn postprocess(&mut self) -> Result<()> {
        if !self.reconciled {
            self.transactions = reconcile(self.transactions.clone())
                .map_err(|e| self.unreconcilable(e))?;
            self.reconciled = true;
        }
        Ok(())
    }

    /// Merge freshly downloaded transactions into the ledger.
    ///
    /// Transactions already in the ledger are skipped, so downloading an
    /// overlapping date range again never creates duplicates.  The result is
    /// reconciled as a whole, since the fresh batch might interleave with
    /// the existing history.  Nothing is changed if that fails.
    /// Returns the number of transactions that were added.
    pub fn update_from_fresh(&mut self, fresh: Account) -> Result<usize> {
        let mut merged = self.transactions.clone();
        let mut added = 0_usize;
        for tx in fresh.transactions {
            if !merged.contains(&tx) {
                merged.push(tx);
                added += 1;
            }
        }

        if added == 0 && self.reconciled {
            debug!("{}: nothing new", self.name);
            return Ok(0);
        }

        let sorted = reconcile(merged).map_err(|e| self.unreconcilable(e))?;
        debug!("{}: merged {added} new transactions", self.name);
        self.transactions = sorted;
        self.reconciled = true;
        Ok(added)
    }

    /// The transactions within the range, in ledger order.
    /// The stored order is left untouched.
    pub fn get_transactions(&self, range: &DateRange) -> Result<Vec<&Transaction>> {
        let all: Vec<&Transaction> = self.transactions.iter().collect();
        let sorted = if self.reconciled {
            all
        } else {
            reconcile(all).map_err(|e| self.unreconcilable(e))?
        };
        Ok(sorted
            .into_iter()
            .filter(|tx| range.contains(tx.date))
            .collect())
    }

    /// The evolution of the balance over time, one point per transaction.
    pub fn balance_history(&self) -> Result<Vec<(NaiveDate, Decimal)>> {
        Ok(self
            .get_transactions(&DateRange::all())?
            .into_iter()
            .map(|tx| (tx.date, tx.running_balance))
            .collect())
    }

    /// The balance after the most recent transaction
    pub fn latest_balance(&self) -> Result<Option<Decimal>> {
        Ok(self
            .get_transactions(&DateRange::all())?
            .last()
            .map(|tx| tx.running_balance))
    }
}
