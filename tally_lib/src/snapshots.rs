use crate::accounts::Account;
use crate::categories::{CategoryId, CategoryTree};
use crate::errors::{Error, Result};
use crate::transactions::Transaction;
use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const LEDGER_FILE: &str = "ledger.json";
pub const CATEGORIES_FILE: &str = "categories.json";

/// What to do with a transaction pinned to a category that no longer exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverridePolicy {
    /// Loading fails with `Error::UnknownCategory`
    Strict,

    /// The override is dropped and reported
    #[default]
    Discard,
}

/// An override that could not be resolved while loading a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedOverride {
    pub account: String,
    pub transaction: String,
    pub category: String,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct TransactionRecord {
    date: NaiveDate,

    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,

    description: String,

    #[serde(default)]
    counterparty: Option<String>,

    #[serde(alias = "running_balance", with = "rust_decimal::serde::float")]
    balance_after: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    category_override: Option<String>,
}

impl TransactionRecord {
    fn new(tx: &Transaction, categories: &CategoryTree) -> Self {
        TransactionRecord {
            date: tx.date,
            amount: tx.amount,
            description: tx.description.clone(),
            counterparty: tx.counterparty.clone(),
            balance_after: tx.running_balance,
            category_override: tx
                .category_override()
                .map(|id| categories.full_name(id)),
        }
    }

    /// The transaction, without its override
    fn to_transaction(&self) -> Transaction {
        Transaction::new(
            self.date,
            &self.description,
            self.amount,
            self.balance_after,
        )
        .with_counterparty(self.counterparty.as_deref())
    }
}

#[derive(Serialize, Deserialize)]
pub(crate) struct AccountRecord {
    name: String,

    #[serde(default)]
    transactions: Vec<TransactionRecord>,
}

impl AccountRecord {
    /// Build an account, ignoring all category overrides.  This is used for
    /// data coming from a bank, which knows nothing of our categories.
    pub(crate) fn into_account_without_overrides(self) -> Account {
        let mut acc = Account::new(&self.name);
        let mut ignored = 0_usize;
        for rec in &self.transactions {
            if rec.category_override.is_some() {
                ignored += 1;
            }
            acc.add_transaction(rec.to_transaction());
        }
        if ignored > 0 {
            warn!("{}: ignored {ignored} category overrides", self.name);
        }
        acc
    }
}

#[derive(Serialize, Deserialize)]
struct LedgerFile {
    accounts: Vec<AccountRecord>,
}

#[derive(Serialize, Deserialize)]
struct CategoryRecord {
    name: String,

    #[serde(default)]
    descriptions: Vec<String>,

    #[serde(default)]
    counterparts: Vec<String>,

    #[serde(default)]
    diff: bool,

    #[serde(default)]
    children: Vec<CategoryRecord>,
}

impl CategoryRecord {
    fn new(tree: &CategoryTree, id: CategoryId) -> Self {
        match tree.get(id) {
            None => CategoryRecord {
                name: tree.full_name(id),
                descriptions: Vec::new(),
                counterparts: Vec::new(),
                diff: false,
                children: Vec::new(),
            },
            Some(cat) => CategoryRecord {
                name: cat.name.clone(),
                descriptions: cat.descriptions.clone(),
                counterparts: cat.counterparts.clone(),
                diff: cat.diff,
                children: cat
                    .iter_children()
                    .map(|child| CategoryRecord::new(tree, child))
                    .collect(),
            },
        }
    }

    fn insert_into(
        self,
        tree: &mut CategoryTree,
        parent: Option<CategoryId>,
    ) -> Result<()> {
        let id = match parent {
            None => tree.add_root(&self.name)?,
            Some(p) => tree.create_child(p, &self.name)?,
        };
        if let Some(cat) = tree.get_mut(id) {
            cat.descriptions = self.descriptions;
            cat.counterparts = self.counterparts;
            cat.diff = self.diff;
        }
        for child in self.children {
            child.insert_into(tree, Some(id))?;
        }
        Ok(())
    }
}

fn malformed(what: &'static str) -> impl FnOnce(serde_json::Error) -> Error {
    move |source| Error::MalformedSnapshot { what, source }
}

pub fn categories_from_str(text: &str) -> Result<CategoryTree> {
    let records: Vec<CategoryRecord> =
        serde_json::from_str(text).map_err(malformed("categories"))?;
    let mut tree = CategoryTree::default();
    for rec in records {
        rec.insert_into(&mut tree, None)?;
    }
    Ok(tree)
}

pub fn categories_to_string(tree: &CategoryTree) -> Result<String> {
    let records: Vec<CategoryRecord> = tree
        .iter_roots()
        .map(|id| CategoryRecord::new(tree, id))
        .collect();
    serde_json::to_string_pretty(&records).map_err(malformed("categories"))
}

/// Parse the ledgers of all accounts.
///
/// The session is stored as two files, the category tree and the ledgers.
/// Pinned categories are looked up in `categories`, which must therefore be
/// loaded first.  With `OverridePolicy::Discard`, the overrides that could
/// not be resolved are returned so that the caller can tell the user.
pub fn accounts_from_str(
    text: &str,
    categories: &CategoryTree,
    policy: OverridePolicy,
) -> Result<(Vec<Account>, Vec<UnresolvedOverride>)> {
    let file: LedgerFile =
        serde_json::from_str(text).map_err(malformed("ledger"))?;
    let mut unresolved = Vec::new();
    let mut accounts = Vec::with_capacity(file.accounts.len());

    for rec in file.accounts {
        let mut acc = Account::new(&rec.name);
        for txrec in &rec.transactions {
            let mut tx = txrec.to_transaction();
            if let Some(name) = &txrec.category_override {
                match (categories.get_category(name), policy) {
                    (Some(id), _) => tx.set_category_override(id),
                    (None, OverridePolicy::Strict) => {
                        return Err(Error::UnknownCategory(name.clone()));
                    }
                    (None, OverridePolicy::Discard) => {
                        warn!(
                            "{}: discarded override {name:?} of {tx}",
                            rec.name
                        );
                        unresolved.push(UnresolvedOverride {
                            account: rec.name.clone(),
                            transaction: tx.to_string(),
                            category: name.clone(),
                        });
                    }
                }
            }
            acc.add_transaction(tx);
        }
        acc.postprocess()?;
        accounts.push(acc);
    }
    Ok((accounts, unresolved))
}

pub fn accounts_to_string(
    accounts: &[Account],
    categories: &CategoryTree,
) -> Result<String> {
    let file = LedgerFile {
        accounts: accounts
            .iter()
            .map(|acc| AccountRecord {
                name: acc.name.clone(),
                transactions: acc
                    .iter_transactions()
                    .map(|tx| TransactionRecord::new(tx, categories))
                    .collect(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&file).map_err(malformed("ledger"))
}

/// Read a whole file, or None if it does not exist.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(Error::Io {
            path: path.into(),
            source,
        }),
    }
}

pub fn write(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).map_err(|source| Error::Io {
        path: path.into(),
        source,
    })
}
