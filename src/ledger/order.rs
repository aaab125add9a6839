//! Newest-first ordering of ledger views.

use crate::model::LedgerEntry;

/// Orders `entries` by date, newest first.
///
/// Dates are compared as calendar dates, never as `DD/MM/YYYY` text. Entries with an invalid date
/// come after all others. The sort is stable, so entries on the same date, and entries with invalid
/// dates, keep their input order.
pub fn order<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Vec<&'a LedgerEntry> {
    let mut ordered: Vec<&LedgerEntry> = entries.into_iter().collect();
    ordered.sort_by(|a, b| a.date().cmp_newest_first(b.date()));
    ordered
}
