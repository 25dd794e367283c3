use crate::accounts::Account;
use crate::categories::CategoryTree;
use crate::errors::Result;
use crate::times::DateRange;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Sum of all credits and debits across accounts.
///
/// Unlike a `Breakdown`, no netting is done: this is the raw cash flow.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct Totals {
    pub income: Decimal,
    pub spending: Decimal,
}

impl Totals {
    pub fn new<'a>(
        accounts: impl IntoIterator<Item = &'a Account>,
        range: &DateRange,
    ) -> Result<Self> {
        let mut result = Totals::default();
        for acc in accounts {
            for tx in acc.get_transactions(range)? {
                if tx.is_debit() {
                    result.spending += tx.amount;
                } else {
                    result.income += tx.amount;
                }
            }
        }
        Ok(result)
    }

    #[must_use]
    pub fn net(&self) -> Decimal {
        self.income + self.spending
    }
}

/// The counterparties and descriptions of transactions that no rule
/// matched, as a starting point for writing new rules.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Unknowns {
    pub counterparties: BTreeSet<String>,

    // Only for transactions without a counterparty
    pub descriptions: BTreeSet<String>,
}

impl Unknowns {
    pub fn new<'a>(
        accounts: impl IntoIterator<Item = &'a Account>,
        categories: &CategoryTree,
        range: &DateRange,
    ) -> Result<Self> {
        let mut result = Unknowns::default();
        for acc in accounts {
            for tx in acc.get_transactions(range)? {
                if !tx.get_category(categories).is_unknown() {
                    continue;
                }
                match &tx.counterparty {
                    Some(cp) => result.counterparties.insert(cp.clone()),
                    None => result.descriptions.insert(tx.description.clone()),
                };
            }
        }
        Ok(result)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counterparties.is_empty() && self.descriptions.is_empty()
    }
}

#[cfg(test)]
mod test {
    use crate::accounts::Account;
    use crate::categories::CategoryTree;
    use crate::errors::Result;
    use crate::reports::{Totals, Unknowns};
    use crate::times::DateRange;
    use crate::transactions::Transaction;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn account() -> Account {
        let d = |day| NaiveDate::from_ymd_opt(2024, 4, day).unwrap();
        let mut acc = Account::new("current");
        acc.add_transaction(Transaction::new(d(1), "ACME LTD", dec!(1200), dec!(1200)));
        acc.add_transaction(
            Transaction::new(d(2), "CARD 1234", dec!(-30), dec!(1170))
                .with_counterparty(Some("CORNER SHOP")),
        );
        acc.add_transaction(Transaction::new(d(3), "TESCO 12", dec!(-20.5), dec!(1149.5)));
        acc.add_transaction(Transaction::new(d(4), "TESCO 98", dec!(-9.5), dec!(1140)));
        acc.add_transaction(
            Transaction::new(d(5), "CARD 5678", dec!(-40), dec!(1100))
                .with_counterparty(Some("CORNER SHOP")),
        );
        acc
    }

    #[test]
    fn test_totals() -> Result<()> {
        let acc = account();
        let t = Totals::new([&acc], &DateRange::all())?;
        assert_eq!(t.income, dec!(1200));
        assert_eq!(t.spending, dec!(-100));
        assert_eq!(t.net(), dec!(1100));
        assert_eq!(Totals::new([], &DateRange::all())?, Totals::default());
        Ok(())
    }

    #[test]
    fn test_zero_amount_is_not_spending() -> Result<()> {
        let mut acc = account();
        let d = NaiveDate::from_ymd_opt(2024, 4, 6).unwrap();
        acc.add_transaction(Transaction::new(d, "FEE WAIVED", dec!(-0.00), dec!(1100)));
        let t = Totals::new([&acc], &DateRange::all())?;
        assert_eq!(t.spending, dec!(-100));
        assert_eq!(t.income, dec!(1200));
        assert_eq!(acc.len(), 6);
        Ok(())
    }

    #[test]
    fn test_unknowns() -> Result<()> {
        let mut tree = CategoryTree::default();
        let salary = tree.add_root("Salary")?;
        if let Some(c) = tree.get_mut(salary) {
            c.add_description("ACME");
        }
        let acc = account();
        let u = Unknowns::new([&acc], &tree, &DateRange::all())?;
        assert_eq!(u.counterparties.len(), 1);
        assert!(u.counterparties.contains("CORNER SHOP"));
        assert_eq!(
            u.descriptions.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["TESCO 12", "TESCO 98"]
        );

        let food = tree.add_root("Food")?;
        let shops = tree.add_root("Shops")?;
        if let Some(c) = tree.get_mut(food) {
            c.add_description("TESCO");
        }
        if let Some(c) = tree.get_mut(shops) {
            c.add_counterpart("CORNER SHOP");
        }
        assert!(Unknowns::new([&acc], &tree, &DateRange::all())?.is_empty());
        Ok(())
    }
}
