use crate::reconcile::Unreconcilable;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Str(String),

    /// The running balances of an account's transactions do not form a single
    /// linear chain.  The ledger was left untouched.
    #[error("cannot reconcile transactions of account {account}: {source}")]
    Unreconcilable {
        account: String,
        #[source]
        source: Unreconcilable,
    },

    #[error("unknown category {0:?}")]
    UnknownCategory(String),

    #[error("category {0:?} already exists")]
    DuplicateCategory(String),

    #[error("invalid category name {0:?}")]
    InvalidCategoryName(String),

    /// Some pinned categories could not be resolved when loading, and
    /// saving would lose them.
    #[error("{0} category overrides could not be resolved, saving would drop them")]
    UnresolvedOverrides(usize),

    #[error("malformed {what} snapshot: {source}")]
    MalformedSnapshot {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
