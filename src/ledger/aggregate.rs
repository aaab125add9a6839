//! Totals per category and across the whole ledger, and the snapshot that owns them.

use crate::ledger::normalize::{normalize, Normalized};
use crate::model::{
    Category, GeneralPayments, LedgerEntry, ParentRecords, RejectedEntry, Status,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Add;
use tracing::debug;

/// Total, received and pending amounts. `pending` is always `total - received`.
///
/// Sums saturate at `Decimal::MAX` instead of panicking. Every amount is at most `MAX_AMOUNT`, so
/// no real ledger comes near that limit.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub struct CategoryTotals {
    total: Decimal,
    received: Decimal,
    pending: Decimal,
}

impl CategoryTotals {
    /// Builds totals from `total` and `received`; `pending` is derived.
    pub fn new(total: Decimal, received: Decimal) -> Self {
        Self {
            total,
            received,
            pending: total - received,
        }
    }

    /// Sums the valid entries among `entries`. Entries with an invalid date are skipped.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Self {
        let (total, received) = entries
            .into_iter()
            .filter(|entry| entry.is_valid())
            .fold((Decimal::ZERO, Decimal::ZERO), |(total, received), entry| {
                let amount = entry.amount().value();
                match entry.status() {
                    Status::Received => (
                        total.saturating_add(amount),
                        received.saturating_add(amount),
                    ),
                    Status::Pending => (total.saturating_add(amount), received),
                }
            });
        Self::new(total, received)
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn received(&self) -> Decimal {
        self.received
    }

    pub fn pending(&self) -> Decimal {
        self.pending
    }
}

impl Add for CategoryTotals {
    type Output = CategoryTotals;

    fn add(self, rhs: Self) -> Self::Output {
        CategoryTotals {
            total: self.total.saturating_add(rhs.total),
            received: self.received.saturating_add(rhs.received),
            pending: self.pending.saturating_add(rhs.pending),
        }
    }
}

/// The totals of every category and the grand totals.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct LedgerTotals {
    categories: BTreeMap<Category, CategoryTotals>,
    grand: CategoryTotals,
    completion_percentage: Decimal,
}

impl LedgerTotals {
    /// Aggregates `entries`. Every category is present in the result, with zero totals if it has
    /// no entries.
    pub fn from_entries(entries: &[LedgerEntry]) -> Self {
        let categories: BTreeMap<Category, CategoryTotals> = Category::ALL
            .into_iter()
            .map(|category| {
                let totals = CategoryTotals::from_entries(
                    entries.iter().filter(|e| e.category() == category),
                );
                (category, totals)
            })
            .collect();
        let grand = categories
            .values()
            .copied()
            .fold(CategoryTotals::default(), Add::add);
        Self {
            categories,
            grand,
            completion_percentage: completion_percentage(&grand),
        }
    }

    /// The totals for `category`.
    pub fn category(&self, category: Category) -> CategoryTotals {
        self.categories.get(&category).copied().unwrap_or_default()
    }

    pub fn categories(&self) -> &BTreeMap<Category, CategoryTotals> {
        &self.categories
    }

    pub fn grand(&self) -> CategoryTotals {
        self.grand
    }

    /// `received / total * 100` over the grand totals, rounded to two places. Zero when there is
    /// nothing to receive.
    pub fn completion_percentage(&self) -> Decimal {
        self.completion_percentage
    }
}

/// Every category present with zero totals.
impl Default for LedgerTotals {
    fn default() -> Self {
        Self::from_entries(&[])
    }
}

fn completion_percentage(grand: &CategoryTotals) -> Decimal {
    // The ratio is at most one, so scaling it by a hundred cannot overflow.
    grand
        .received()
        .checked_div(grand.total())
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|percentage| percentage.round_dp(2))
        .unwrap_or_default()
}

/// The complete, immutable ledger for one project: entries, rejected payments and totals.
///
/// A snapshot is never patched. When any source collection changes, a new snapshot is built.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct LedgerSnapshot {
    entries: Vec<LedgerEntry>,
    rejected: Vec<RejectedEntry>,
    totals: LedgerTotals,
}

impl LedgerSnapshot {
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn rejected(&self) -> &[RejectedEntry] {
        &self.rejected
    }

    pub fn totals(&self) -> &LedgerTotals {
        &self.totals
    }
}

impl From<Normalized> for LedgerSnapshot {
    fn from(normalized: Normalized) -> Self {
        let totals = LedgerTotals::from_entries(&normalized.entries);
        Self {
            entries: normalized.entries,
            rejected: normalized.rejected,
            totals,
        }
    }
}

/// Normalizes the four source collections and aggregates them into a snapshot.
///
/// The four collections must all come from one complete fetch. Passing an empty map in place of a
/// collection that failed to load would silently understate the totals.
pub fn build_snapshot(
    general: &GeneralPayments,
    sites: &ParentRecords,
    workers: &ParentRecords,
    materials: &ParentRecords,
) -> LedgerSnapshot {
    let snapshot = LedgerSnapshot::from(normalize(general, sites, workers, materials));
    debug!(
        "Built ledger snapshot with {} entries and {} rejected payments, grand total {}",
        snapshot.entries.len(),
        snapshot.rejected.len(),
        snapshot.totals.grand.total()
    );
    snapshot
}
