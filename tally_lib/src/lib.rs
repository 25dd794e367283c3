pub mod accounts;
pub mod breakdown;
pub mod categories;
pub mod errors;
pub mod formatters;
pub mod importers;
pub mod reconcile;
pub mod reports;
pub mod sessions;
pub mod snapshots;
pub mod times;
pub mod transactions;

pub use errors::{Error, Result};
