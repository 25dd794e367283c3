use crate::accounts::Account;
use crate::breakdown::Breakdown;
use crate::categories::{CategoryId, CategoryTree};
use crate::errors::{Error, Result};
use crate::importers::Importer;
use crate::reports::{Totals, Unknowns};
use crate::snapshots::{
    accounts_from_str, accounts_to_string, categories_from_str,
    categories_to_string, read_optional, write, OverridePolicy,
    UnresolvedOverride, CATEGORIES_FILE, LEDGER_FILE,
};
use crate::times::DateRange;
use crate::transactions::Transaction;
use log::{debug, info, warn};
use std::path::Path;

/// Everything known about the user's money: the category tree and the
/// ledgers of all accounts.
#[derive(Default)]
pub struct Session {
    pub categories: CategoryTree,
    accounts: Vec<Account>,

    // Overrides dropped while loading
    unresolved: Vec<UnresolvedOverride>,
}

impl Session {
    /// Load the snapshots from `dir`.  Missing files give an empty session.
    pub fn load(dir: &Path, policy: OverridePolicy) -> Result<Self> {
        let categories = match read_optional(&dir.join(CATEGORIES_FILE))? {
            Some(text) => categories_from_str(&text)?,
            None => CategoryTree::default(),
        };
        let (accounts, unresolved) = match read_optional(&dir.join(LEDGER_FILE))? {
            Some(text) => accounts_from_str(&text, &categories, policy)?,
            None => (Vec::new(), Vec::new()),
        };
        info!(
            "loaded {} accounts and {} categories from {}",
            accounts.len(),
            categories.len(),
            dir.display()
        );
        Ok(Session {
            categories,
            accounts,
            unresolved,
        })
    }

    /// Write the snapshots to `dir`.  Refuses to do so while some overrides
    /// could not be resolved when loading, since they would be lost.
    pub fn save(&self, dir: &Path) -> Result<()> {
        if !self.unresolved.is_empty() {
            return Err(Error::UnresolvedOverrides(self.unresolved.len()));
        }
        std::fs::create_dir_all(dir).map_err(|source| Error::Io {
            path: dir.into(),
            source,
        })?;
        write(&dir.join(CATEGORIES_FILE), &categories_to_string(&self.categories)?)?;
        write(
            &dir.join(LEDGER_FILE),
            &accounts_to_string(&self.accounts, &self.categories)?,
        )?;
        debug!("saved session to {}", dir.display());
        Ok(())
    }

    /// The overrides that were dropped when loading
    #[must_use]
    pub fn unresolved_overrides(&self) -> &[UnresolvedOverride] {
        &self.unresolved
    }

    /// Accept that the unresolved overrides are lost, so that `save` works
    pub fn forget_unresolved_overrides(&mut self) {
        if !self.unresolved.is_empty() {
            info!("dropping {} category overrides", self.unresolved.len());
            self.unresolved.clear();
        }
    }

    pub fn list_accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    #[must_use]
    pub fn get_account(&self, name: &str) -> Option<&Account> {
        self.accounts.iter().find(|acc| acc.name == name)
    }

    pub fn get_account_mut(&mut self, name: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|acc| acc.name == name)
    }

    /// Create a new category from its full name.  All segments but the last
    /// must already exist.
    pub fn create_category(&mut self, full_name: &str) -> Result<CategoryId> {
        match full_name.rsplit_once(crate::categories::SEPARATOR) {
            None => self.categories.add_root(full_name),
            Some((parent, name)) => {
                let parent = self.categories.expect_category(parent)?;
                self.categories.create_child(parent, name)
            }
        }
    }

    #[must_use]
    pub fn classify(&self, tx: &Transaction) -> CategoryId {
        self.categories.classify(tx)
    }

    pub fn breakdown(&self, range: &DateRange) -> Result<Breakdown> {
        Breakdown::new(&self.accounts, &self.categories, range)
    }

    pub fn totals(&self, range: &DateRange) -> Result<Totals> {
        Totals::new(&self.accounts, range)
    }

    pub fn unknowns(&self, range: &DateRange) -> Result<Unknowns> {
        Unknowns::new(&self.accounts, &self.categories, range)
    }

    /// Merge fresh accounts into the ledgers, matching them by name.
    ///
    /// Either all accounts are merged, or the session is left unchanged.
    /// Returns the number of new transactions.
    pub fn merge_fresh(&mut self, fresh: Vec<Account>) -> Result<usize> {
        let mut staging = self.accounts.clone();
        let mut added = 0;
        for acc in fresh {
            match staging.iter_mut().find(|a| a.name == acc.name) {
                Some(existing) => added += existing.update_from_fresh(acc)?,
                None => {
                    let mut new = Account::new(&acc.name);
                    added += new.update_from_fresh(acc)?;
                    info!("new account {}", new.name);
                    staging.push(new);
                }
            }
        }
        self.accounts = staging;
        Ok(added)
    }

    /// Download from all importers, and merge the result.  An importer that
    /// fails is skipped, the others still contribute.
    pub fn update(
        &mut self,
        importers: &mut [Box<dyn Importer>],
        range: &DateRange,
    ) -> Result<usize> {
        let mut fresh = Vec::new();
        for imp in importers.iter_mut() {
            match imp.download(range) {
                Ok(accounts) => {
                    debug!("{}: {} accounts", imp.source(), accounts.len());
                    fresh.extend(accounts);
                }
                Err(e) => warn!("{}: {e:#}", imp.source()),
            }
        }
        self.merge_fresh(fresh)
    }
}

#[cfg(test)]
mod test {
    use crate::accounts::Account;
    use crate::errors::{Error, Result};
    use crate::importers::Importer;
    use crate::sessions::Session;
    use crate::snapshots::{OverridePolicy, LEDGER_FILE};
    use crate::times::DateRange;
    use crate::transactions::Transaction;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn fresh(name: &str, txs: &[Transaction]) -> Account {
        let mut acc = Account::new(name);
        for tx in txs {
            acc.add_transaction(tx.clone());
        }
        acc
    }

    struct Fixed(Vec<Account>);
    impl Importer for Fixed {
        fn source(&self) -> &str {
            "fixed"
        }
        fn download(&mut self, _range: &DateRange) -> anyhow::Result<Vec<Account>> {
            Ok(self.0.clone())
        }
    }

    struct Broken;
    impl Importer for Broken {
        fn source(&self) -> &str {
            "broken"
        }
        fn download(&mut self, _range: &DateRange) -> anyhow::Result<Vec<Account>> {
            anyhow::bail!("connection refused")
        }
    }

    #[test]
    fn test_create_category() -> Result<()> {
        let mut s = Session::default();
        let food = s.create_category("Food")?;
        let takeaway = s.create_category("Food--Takeaway")?;
        assert_eq!(s.categories.get(takeaway).and_then(|c| c.parent()), Some(food));
        assert!(matches!(
            s.create_category("Bills--Water"),
            Err(Error::UnknownCategory(name)) if name == "Bills"
        ));
        assert!(matches!(
            s.create_category("Food"),
            Err(Error::DuplicateCategory(_))
        ));
        assert!(matches!(
            s.create_category("Food--"),
            Err(Error::InvalidCategoryName(_))
        ));
        assert!(matches!(
            s.create_category("--Food"),
            Err(Error::UnknownCategory(_))
        ));
        Ok(())
    }

    #[test]
    fn test_merge_all_or_nothing() -> Result<()> {
        let t1 = Transaction::new(day(1), "a", dec!(10), dec!(10));
        let t2 = Transaction::new(day(2), "b", dec!(5), dec!(15));
        let bad = Transaction::new(day(3), "c", dec!(5), dec!(99));

        let mut s = Session::default();
        assert_eq!(s.merge_fresh(vec![fresh("current", &[t2.clone(), t1.clone()])])?, 2);
        assert_eq!(s.list_accounts().count(), 1);

        let result = s.merge_fresh(vec![
            fresh("savings", &[t1.clone()]),
            fresh("current", &[bad]),
        ]);
        assert!(result.is_err());
        assert_eq!(s.list_accounts().count(), 1);
        assert!(s.get_account("savings").is_none());

        let current: Vec<Transaction> = s
            .get_account("current")
            .map(|a| a.iter_transactions().cloned().collect())
            .unwrap_or_default();
        assert_eq!(current, vec![t1, t2]);
        Ok(())
    }

    #[test]
    fn test_update_skips_failed_importers() -> Result<()> {
        let t1 = Transaction::new(day(1), "SALARY", dec!(100), dec!(100));
        let mut importers: Vec<Box<dyn Importer>> = vec![
            Box::new(Broken),
            Box::new(Fixed(vec![fresh("current", &[t1])])),
        ];
        let mut s = Session::default();
        assert_eq!(s.update(&mut importers, &DateRange::all())?, 1);
        assert_eq!(s.update(&mut importers, &DateRange::all())?, 0);
        Ok(())
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = std::env::temp_dir()
            .join(format!("tally_session_{}", std::process::id()));
        let missing = Session::load(&dir, OverridePolicy::Strict)?;
        assert_eq!(missing.list_accounts().count(), 0);
        assert!(missing.categories.is_empty());

        let mut s = Session::default();
        let food = s.create_category("Food")?;
        if let Some(c) = s.categories.get_mut(food) {
            c.add_description("TESCO");
        }
        let gifts = s.create_category("Gifts")?;
        let tesco = Transaction::new(day(1), "TESCO 1", dec!(-5), dec!(-5));
        let other = Transaction::new(day(2), "TESCO 2", dec!(-5), dec!(-10));
        s.merge_fresh(vec![fresh("current", &[tesco, other])])?;
        if let Some(tx) = s
            .get_account_mut("current")
            .and_then(|a| a.iter_transactions_mut().last())
        {
            tx.set_category_override(gifts);
        }
        s.save(&dir)?;

        let loaded = Session::load(&dir, OverridePolicy::Strict)?;
        std::fs::remove_dir_all(&dir).map_err(|e| Error::Str(e.to_string()))?;

        let acc = loaded.get_account("current").ok_or(Error::Str("lost".into()))?;
        let cats: Vec<String> = acc
            .iter_transactions()
            .map(|tx| loaded.categories.full_name(loaded.classify(tx)))
            .collect();
        assert_eq!(cats, vec!["Food", "Gifts"]);
        assert!(loaded.unresolved_overrides().is_empty());

        let totals = loaded.totals(&DateRange::all())?;
        assert_eq!(totals.net(), dec!(-10));
        let b = loaded.breakdown(&DateRange::all())?;
        assert_eq!(b.total_spending(), dec!(-10));
        assert!(loaded.unknowns(&DateRange::all())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_save_keeps_unresolved_overrides() -> Result<()> {
        let dir = std::env::temp_dir()
            .join(format!("tally_unresolved_{}", std::process::id()));
        std::fs::create_dir_all(&dir).map_err(|e| Error::Str(e.to_string()))?;
        let ledger = r#"{"accounts": [
            {"name": "current",
             "transactions": [
                {"date": "2024-07-01", "amount": 10, "description": "a",
                 "balance_after": 10, "category_override": "Gifts"}
             ]}
        ]}"#;
        std::fs::write(dir.join(LEDGER_FILE), ledger)
            .map_err(|e| Error::Str(e.to_string()))?;

        let mut s = Session::load(&dir, OverridePolicy::Discard)?;
        assert_eq!(s.unresolved_overrides().len(), 1);
        assert!(matches!(s.save(&dir), Err(Error::UnresolvedOverrides(1))));

        // The override is still on disk
        let again = Session::load(&dir, OverridePolicy::Discard)?;
        assert_eq!(again.unresolved_overrides().len(), 1);

        s.forget_unresolved_overrides();
        s.save(&dir)?;
        let again = Session::load(&dir, OverridePolicy::Strict)?;
        std::fs::remove_dir_all(&dir).map_err(|e| Error::Str(e.to_string()))?;
        assert!(again.unresolved_overrides().is_empty());
        assert_eq!(again.get_account("current").map(Account::len), Some(1));
        Ok(())
    }
}
