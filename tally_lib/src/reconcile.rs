use crate::transactions::Transaction;
use log::{debug, error};
use std::borrow::Borrow;
use std::collections::VecDeque;

/// A batch whose balances imply a gap or a branch in the history.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "{stranded} of {} transactions do not chain with the others, \
     first is {first_stranded}",
    .placed + .stranded
)]
pub struct Unreconcilable {
    // How many transactions were successfully chained
    pub placed: usize,

    // How many could not be attached to the chain
    pub stranded: usize,

    pub first_stranded: String,
}

enum End {
    Head,
    Tail,
}

/// Order the batch so that each transaction follows the previous one.
///
/// Banks do not always return statements in chronological order, and many
/// transactions share the same date.  But each one carries the balance of
/// the account right after it posted, so the ledger is a chain where each
/// link can be verified:
///     previous.running_balance + next.amount == next.running_balance
/// The chain is grown from an arbitrary element, attaching at either end any
/// remaining transaction that links to it.
///
/// This works on owned transactions as well as references, so that a view of
/// a ledger can be sorted without copying it.  No partial result is ever
/// returned: an order that skips transactions would corrupt the ledger.
pub fn reconcile<T: Borrow<Transaction>>(
    batch: Vec<T>,
) -> Result<Vec<T>, Unreconcilable> {
    let mut unsorted = batch.into_iter();
    let Some(first) = unsorted.next() else {
        return Ok(Vec::new());
    };
    let mut unsorted: Vec<T> = unsorted.collect();
    let mut sorted = VecDeque::with_capacity(unsorted.len() + 1);
    sorted.push_back(first);

    while !unsorted.is_empty() {
        let found = unsorted.iter().enumerate().find_map(|(idx, tx)| {
            let tx = tx.borrow();
            if sorted.front().is_some_and(|head| head.borrow().follows(tx)) {
                Some((idx, End::Head))
            } else if sorted.back().is_some_and(|tail| tx.follows(tail.borrow())) {
                Some((idx, End::Tail))
            } else {
                None
            }
        });

        match found {
            Some((idx, End::Head)) => sorted.push_front(unsorted.remove(idx)),
            Some((idx, End::Tail)) => sorted.push_back(unsorted.remove(idx)),
            None => {
                let err = Unreconcilable {
                    placed: sorted.len(),
                    stranded: unsorted.len(),
                    first_stranded: unsorted
                        .first()
                        .map(|tx| tx.borrow().to_string())
                        .unwrap_or_default(),
                };
                error!("{err}");
                return Err(err);
            }
        }
    }

    debug!("reconciled {} transactions", sorted.len());
    Ok(sorted.into())
}
