use crate::accounts::Account;
use crate::snapshots::AccountRecord;
use crate::times::DateRange;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// A source of fresh transactions, typically a bank.
///
/// The accounts returned need not be sorted, and may overlap with what is
/// already known: merging takes care of both.
pub trait Importer {
    /// A name for the source, used in messages
    fn source(&self) -> &str;

    fn download(&mut self, range: &DateRange) -> Result<Vec<Account>>;
}

/// Reads a file previously downloaded from a bank: a JSON array of account
/// records, using the same shape as the ledger snapshot.
pub struct BatchFileImporter {
    path: PathBuf,
    name: String,
}

impl BatchFileImporter {
    pub fn new(path: &Path) -> Self {
        BatchFileImporter {
            path: path.into(),
            name: path.display().to_string(),
        }
    }
}

impl Importer for BatchFileImporter {
    fn source(&self) -> &str {
        &self.name
    }

    fn download(&mut self, range: &DateRange) -> Result<Vec<Account>> {
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.name))?;
        let records: Vec<AccountRecord> = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", self.name))?;

        Ok(records
            .into_iter()
            .map(|rec| {
                let raw = rec.into_account_without_overrides();
                let mut acc = Account::new(&raw.name);
                raw.iter_transactions()
                    .filter(|tx| range.contains(tx.date))
                    .for_each(|tx| acc.add_transaction(tx.clone()));
                acc
            })
            .collect())
    }
}

#[cfg(test)]
mod test {
    use crate::importers::{BatchFileImporter, Importer};
    use crate::times::DateRange;
    use chrono::NaiveDate;

    #[test]
    fn test_batch_file() -> anyhow::Result<()> {
        let path = std::env::temp_dir()
            .join(format!("tally_batch_{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{"name": "current", "transactions": [
                {"date": "2024-01-01", "amount": 10, "description": "a",
                 "balance_after": 10},
                {"date": "2024-01-05", "amount": 5, "description": "b",
                 "balance_after": 15, "category_override": "Food"},
                {"date": "2024-02-01", "amount": 1, "description": "c",
                 "balance_after": 16}
            ]}]"#,
        )?;

        let mut imp = BatchFileImporter::new(&path);
        let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day);
        let accounts = imp.download(&DateRange::new(d(1, 2), d(1, 31)))?;
        std::fs::remove_file(&path)?;

        assert_eq!(accounts.len(), 1);
        let acc = accounts.first().ok_or_else(|| anyhow::anyhow!("empty"))?;
        assert_eq!(acc.name, "current");
        let txs: Vec<_> = acc.iter_transactions().collect();
        assert_eq!(txs.len(), 1);
        assert!(txs.iter().all(|tx| tx.description == "b"
            && tx.category_override().is_none()));
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let mut imp = BatchFileImporter::new(std::path::Path::new(
            "/nonexistent/tally/batch.json",
        ));
        assert!(imp.source().contains("batch.json"));
        assert!(imp.download(&DateRange::all()).is_err());
    }
}
