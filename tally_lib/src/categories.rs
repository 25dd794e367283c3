use crate::errors::{Error, Result};
use crate::transactions::Transaction;
use std::collections::HashMap;

/// Separator between the segments of a category's full name.
pub const SEPARATOR: &str = "--";

#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy, PartialOrd, Ord)]
pub struct CategoryId(pub u16);

impl CategoryId {
    /// The sentinel returned when no category matches a transaction.
    pub const UNKNOWN: CategoryId = CategoryId(0);

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        *self == CategoryId::UNKNOWN
    }
}

/// A node in the user's classification taxonomy.
///
/// A category matches a transaction when the transaction's counterparty is
/// one of `counterparts`, or when its description starts with one of
/// `descriptions`.  Children inherit nothing from their parent: each has its
/// own rules.
#[derive(Debug)]
pub struct Category {
    // Short name, the last segment of the full name
    pub name: String,

    parent: Option<CategoryId>,
    children: Vec<CategoryId>,

    pub descriptions: Vec<String>,
    pub counterparts: Vec<String>,

    // Whether income and spending for this category are netted against each
    // other in breakdowns (transfers, credit card payments,...)
    pub diff: bool,
}

impl Category {
    fn new(name: &str, parent: Option<CategoryId>) -> Self {
        Category {
            name: name.into(),
            parent,
            children: Vec::new(),
            descriptions: Vec::new(),
            counterparts: Vec::new(),
            diff: false,
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<CategoryId> {
        self.parent
    }

    pub fn iter_children(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.children.iter().copied()
    }

    /// No de-duplication is performed: overlapping prefixes make the
    /// classification depend on the traversal order.
    pub fn add_description(&mut self, prefix: &str) {
        self.descriptions.push(prefix.into());
    }

    pub fn add_counterpart(&mut self, counterpart: &str) {
        self.counterparts.push(counterpart.into());
    }

    #[must_use]
    pub fn matches(&self, description: &str, counterparty: Option<&str>) -> bool {
        counterparty.is_some_and(|cp| self.counterparts.iter().any(|c| c == cp))
            || self
                .descriptions
                .iter()
                .any(|prefix| description.starts_with(prefix.as_str()))
    }
}

/// The registry of all categories, owned by a session.
///
/// Categories are stored in an arena and refer to each other through their
/// id, so that the parent links do not create ownership cycles.  The first
/// slot is always the `Unknown` sentinel, which is not part of any
/// traversal.
pub struct CategoryTree {
    categories: Vec<Category>,
    roots: Vec<CategoryId>,
    by_name: HashMap<String, CategoryId>,
}

impl Default for CategoryTree {
    fn default() -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("Unknown".to_string(), CategoryId::UNKNOWN);
        CategoryTree {
            categories: vec![Category::new("Unknown", None)],
            roots: Vec::new(),
            by_name,
        }
    }
}

impl CategoryTree {
    #[must_use]
    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: CategoryId) -> Option<&mut Category> {
        self.categories.get_mut(id.0 as usize)
    }

    /// Look a category up by its full name.
    #[must_use]
    pub fn get_category(&self, full_name: &str) -> Option<CategoryId> {
        self.by_name.get(full_name).copied()
    }

    /// Same as `get_category`, for callers that expect the name to exist.
    pub fn expect_category(&self, full_name: &str) -> Result<CategoryId> {
        self.get_category(full_name)
            .ok_or_else(|| Error::UnknownCategory(full_name.into()))
    }

    #[must_use]
    pub fn full_name(&self, id: CategoryId) -> String {
        match self.get(id) {
            None => "Unknown".to_string(),
            Some(cat) => match cat.parent {
                Some(p) => format!("{}{SEPARATOR}{}", self.full_name(p), cat.name),
                None => cat.name.clone(),
            },
        }
    }

    pub fn add_root(&mut self, name: &str) -> Result<CategoryId> {
        let id = self.insert(name, None)?;
        self.roots.push(id);
        Ok(id)
    }

    pub fn create_child(
        &mut self,
        parent: CategoryId,
        name: &str,
    ) -> Result<CategoryId> {
        if parent.is_unknown() || self.get(parent).is_none() {
            return Err(Error::UnknownCategory(self.full_name(parent)));
        }
        let id = self.insert(name, Some(parent))?;
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        Ok(id)
    }

    fn insert(
        &mut self,
        name: &str,
        parent: Option<CategoryId>,
    ) -> Result<CategoryId> {
        if name.is_empty() || name.contains(SEPARATOR) {
            return Err(Error::InvalidCategoryName(name.into()));
        }
        let full_name = match parent {
            Some(p) => format!("{}{SEPARATOR}{name}", self.full_name(p)),
            None => name.to_string(),
        };
        if self.by_name.contains_key(&full_name) {
            return Err(Error::DuplicateCategory(full_name));
        }
        let id = u16::try_from(self.categories.len())
            .map(CategoryId)
            .map_err(|_| Error::Str("too many categories".into()))?;
        self.categories.push(Category::new(name, parent));
        self.by_name.insert(full_name, id);
        Ok(id)
    }

    pub fn iter_roots(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.roots.iter().copied()
    }

    /// All categories except `Unknown`, each parent before its children, in
    /// the order they were declared.  This is the order used both for
    /// matching and for serialization.
    #[must_use]
    pub fn iter_preorder(&self) -> Vec<CategoryId> {
        let mut result = Vec::with_capacity(self.categories.len());
        let mut stack: Vec<CategoryId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            result.push(id);
            if let Some(cat) = self.get(id) {
                stack.extend(cat.children.iter().rev());
            }
        }
        result
    }

    /// Depth of a category, 0 for roots.
    #[must_use]
    pub fn depth(&self, id: CategoryId) -> usize {
        std::iter::successors(self.get(id).and_then(|c| c.parent), |p| {
            self.get(*p).and_then(|c| c.parent)
        })
        .count()
    }

    #[must_use]
    pub fn is_diff(&self, id: CategoryId) -> bool {
        self.get(id).is_some_and(|c| c.diff)
    }

    /// Find the first category, in pre-order, matching either the
    /// counterparty or a prefix of the description.
    #[must_use]
    pub fn from_description(
        &self,
        description: &str,
        counterparty: Option<&str>,
    ) -> CategoryId {
        self.iter_preorder()
            .into_iter()
            .find(|id| {
                self.get(*id)
                    .is_some_and(|c| c.matches(description, counterparty))
            })
            .unwrap_or(CategoryId::UNKNOWN)
    }

    /// The category of a transaction, taking overrides into account.
    #[must_use]
    pub fn classify(&self, tx: &Transaction) -> CategoryId {
        tx.get_category(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

#[cfg(test)]
mod test {
    use crate::categories::{CategoryId, CategoryTree};
    use crate::errors::{Error, Result};

    fn build() -> Result<(CategoryTree, CategoryId, CategoryId, CategoryId)> {
        let mut tree = CategoryTree::default();
        let food = tree.add_root("Food")?;
        let groceries = tree.create_child(food, "Groceries")?;
        let bills = tree.add_root("Bills")?;
        Ok((tree, food, groceries, bills))
    }

    #[test]
    fn test_full_names() -> Result<()> {
        let (tree, food, groceries, _) = build()?;
        assert_eq!(tree.full_name(food), "Food");
        assert_eq!(tree.full_name(groceries), "Food--Groceries");
        assert_eq!(tree.full_name(CategoryId::UNKNOWN), "Unknown");
        assert_eq!(tree.get_category("Food--Groceries"), Some(groceries));
        assert_eq!(tree.get_category("Groceries"), None);
        assert_eq!(tree.depth(groceries), 1);
        assert_eq!(tree.depth(food), 0);
        assert_eq!(tree.len(), 3);
        Ok(())
    }

    #[test]
    fn test_duplicates() -> Result<()> {
        let (mut tree, food, _, _) = build()?;
        assert!(matches!(
            tree.create_child(food, "Groceries"),
            Err(Error::DuplicateCategory(name)) if name == "Food--Groceries"
        ));
        assert!(matches!(
            tree.add_root("Unknown"),
            Err(Error::DuplicateCategory(_))
        ));
        assert!(matches!(
            tree.create_child(CategoryId::UNKNOWN, "Child"),
            Err(Error::UnknownCategory(_))
        ));

        // Same short name under a different parent is fine
        tree.add_root("Groceries")?;
        Ok(())
    }

    #[test]
    fn test_invalid_names() -> Result<()> {
        let (mut tree, food, _, _) = build()?;
        let before = tree.len();
        assert!(matches!(
            tree.create_child(food, ""),
            Err(Error::InvalidCategoryName(_))
        ));
        assert!(matches!(
            tree.add_root("Food--Takeaway"),
            Err(Error::InvalidCategoryName(name)) if name == "Food--Takeaway"
        ));
        assert!(matches!(tree.add_root(""), Err(Error::InvalidCategoryName(_))));
        assert_eq!(tree.len(), before);
        assert_eq!(tree.get_category("Food--"), None);
        Ok(())
    }

    #[test]
    fn test_preorder() -> Result<()> {
        let (mut tree, food, groceries, bills) = build()?;
        let takeaway = tree.create_child(food, "Takeaway")?;
        let water = tree.create_child(bills, "Water")?;
        assert_eq!(
            tree.iter_preorder(),
            vec![food, groceries, takeaway, bills, water]
        );
        Ok(())
    }

    #[test]
    fn test_from_description() -> Result<()> {
        let (mut tree, food, groceries, bills) = build()?;
        tree.get_mut(groceries)
            .ok_or(Error::Str("missing".into()))?
            .add_description("TESCO");
        tree.get_mut(bills)
            .ok_or(Error::Str("missing".into()))?
            .add_counterpart("THAMES WATER");

        assert_eq!(tree.from_description("TESCO 123", None), groceries);
        assert_eq!(tree.from_description("tesco 123", None), CategoryId::UNKNOWN);
        assert_eq!(tree.from_description("MY TESCO", None), CategoryId::UNKNOWN);
        assert_eq!(
            tree.from_description("DIRECT DEBIT", Some("THAMES WATER")),
            bills
        );
        assert_eq!(
            tree.from_description("DIRECT DEBIT", Some("THAMES")),
            CategoryId::UNKNOWN
        );

        // The first match in pre-order wins: the parent is visited first
        tree.get_mut(food)
            .ok_or(Error::Str("missing".into()))?
            .add_description("TES");
        assert_eq!(tree.from_description("TESCO 123", None), food);

        // Deterministic
        assert_eq!(
            tree.from_description("TESCO 123", None),
            tree.from_description("TESCO 123", None),
        );
        Ok(())
    }

    #[test]
    fn test_unknown_never_matches() {
        let mut tree = CategoryTree::default();
        if let Some(unknown) = tree.get_mut(CategoryId::UNKNOWN) {
            unknown.add_description("");
        }
        assert!(tree.is_empty());
        assert_eq!(tree.from_description("anything", None), CategoryId::UNKNOWN);
        assert!(tree.iter_preorder().is_empty());
    }
}
