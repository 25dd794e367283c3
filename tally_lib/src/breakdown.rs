use crate::accounts::Account;
use crate::categories::{CategoryId, CategoryTree};
use crate::errors::Result;
use crate::times::DateRange;
use itertools::Itertools;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Income and spending per category over a range of time.
///
/// Spending values are negative.  Categories flagged as `diff` are netted,
/// so that money flowing in and back out (a credit card payment for
/// instance) only shows as its net effect.
#[derive(Debug, Default, PartialEq)]
pub struct Breakdown {
    pub income: BTreeMap<CategoryId, Decimal>,
    pub spending: BTreeMap<CategoryId, Decimal>,
}

/// One line of a breakdown, ready for display
#[derive(Debug, PartialEq)]
pub struct BreakdownRow {
    pub category: CategoryId,
    pub name: String,
    pub value: Decimal,

    // Share of the total of the same map, between 0 and 100 unless netting
    // made some values change sign.
    pub percent: Option<Decimal>,
}

impl Breakdown {
    pub fn new<'a>(
        accounts: impl IntoIterator<Item = &'a Account>,
        categories: &CategoryTree,
        range: &DateRange,
    ) -> Result<Self> {
        let mut result = Breakdown::default();
        for acc in accounts {
            for tx in acc.get_transactions(range)? {
                let values = if tx.is_debit() {
                    &mut result.spending
                } else {
                    &mut result.income
                };
                *values.entry(tx.get_category(categories)).or_default() +=
                    tx.amount;
            }
        }

        result.prune_zero();
        result.net_diff_categories(categories);
        result.cancel_offsetting();
        Ok(result)
    }

    fn prune_zero(&mut self) {
        self.income.retain(|_, v| !v.is_zero());
        self.spending.retain(|_, v| !v.is_zero());
    }

    fn in_both(&self) -> Vec<(CategoryId, Decimal, Decimal)> {
        self.income
            .iter()
            .filter_map(|(cat, inc)| {
                self.spending.get(cat).map(|spent| (*cat, *inc, *spent))
            })
            .collect()
    }

    /// For diff categories, only keep the net value on the side where it
    /// belongs.
    fn net_diff_categories(&mut self, categories: &CategoryTree) {
        for (cat, inc, spent) in self.in_both() {
            if !categories.is_diff(cat) {
                continue;
            }
            match inc.cmp(&spent.abs()) {
                std::cmp::Ordering::Greater => {
                    self.income.insert(cat, inc + spent);
                    self.spending.remove(&cat);
                }
                std::cmp::Ordering::Less => {
                    self.spending.insert(cat, spent + inc);
                    self.income.remove(&cat);
                }
                std::cmp::Ordering::Equal => {
                    self.income.remove(&cat);
                    self.spending.remove(&cat);
                }
            }
        }
    }

    /// Whatever the category, drop it when income and spending exactly
    /// offset each other.
    fn cancel_offsetting(&mut self) {
        for (cat, inc, spent) in self.in_both() {
            if spent == -inc {
                self.income.remove(&cat);
                self.spending.remove(&cat);
            }
        }
    }

    #[must_use]
    pub fn total_income(&self) -> Decimal {
        self.income.values().sum()
    }

    #[must_use]
    pub fn total_spending(&self) -> Decimal {
        self.spending.values().sum()
    }

    #[must_use]
    pub fn income_rows(&self, categories: &CategoryTree) -> Vec<BreakdownRow> {
        rows(&self.income, categories)
    }

    #[must_use]
    pub fn spending_rows(&self, categories: &CategoryTree) -> Vec<BreakdownRow> {
        rows(&self.spending, categories)
    }
}

/// Rows sorted by category name, with their share of the total.
fn rows(
    values: &BTreeMap<CategoryId, Decimal>,
    categories: &CategoryTree,
) -> Vec<BreakdownRow> {
    let total: Decimal = values.values().sum();
    values
        .iter()
        .map(|(cat, value)| BreakdownRow {
            category: *cat,
            name: categories.full_name(*cat),
            value: *value,
            percent: (Decimal::ONE_HUNDRED * value).checked_div(total),
        })
        .sorted_by(|r1, r2| r1.name.cmp(&r2.name))
        .collect()
}
