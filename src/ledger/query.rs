//! Search and filter over a snapshot without touching it.

use crate::ledger::LedgerSnapshot;
use crate::model::{CategoryFilter, LedgerEntry, StatusFilter};
use serde::{Deserialize, Serialize};

/// User filter state for a ledger view.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerQuery {
    /// Case-insensitive text matched against any displayed field. Blank matches everything.
    pub search: String,
    pub status: StatusFilter,
    pub category: CategoryFilter,
}

impl LedgerQuery {
    pub fn new(search: impl Into<String>, status: StatusFilter, category: CategoryFilter) -> Self {
        Self {
            search: search.into(),
            status,
            category,
        }
    }

    /// Whether any filter is active.
    pub fn is_filtered(&self) -> bool {
        !self.search.trim().is_empty()
            || self.status != StatusFilter::All
            || self.category != CategoryFilter::All
    }
}

/// Why a filtered view came back empty.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// The project has no payments at all.
    NoEntries,
    /// Payments exist, but every one of them was rejected during normalization.
    AllRejected,
    /// The ledger has entries, but none match the filters.
    NoMatches,
}

impl EmptyReason {
    /// A message suitable for showing in place of an empty table.
    pub fn message(&self) -> &'static str {
        match self {
            EmptyReason::NoEntries => "No payments recorded for this project.",
            EmptyReason::AllRejected => {
                "Payments exist but none could be read; run 'ledger rejected' for details."
            }
            EmptyReason::NoMatches => "No payments match your search criteria.",
        }
    }
}

/// A filtered, unordered view borrowed from a snapshot.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Filtered<'a> {
    entries: Vec<&'a LedgerEntry>,
    empty_reason: Option<EmptyReason>,
}

impl<'a> Filtered<'a> {
    pub fn entries(&self) -> &[&'a LedgerEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<&'a LedgerEntry> {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `Some` exactly when the view is empty.
    pub fn empty_reason(&self) -> Option<EmptyReason> {
        self.empty_reason
    }
}

/// Applies `query` to `snapshot`. Search, status and category must all match.
pub fn query<'a>(snapshot: &'a LedgerSnapshot, query: &LedgerQuery) -> Filtered<'a> {
    let needle = query.search.trim().to_lowercase();
    let entries: Vec<&LedgerEntry> = snapshot
        .entries()
        .iter()
        .filter(|entry| query.status.matches(entry.status()))
        .filter(|entry| query.category.matches(entry.category()))
        .filter(|entry| needle.is_empty() || matches_search(entry, &needle))
        .collect();

    let empty_reason = if !entries.is_empty() {
        None
    } else if !snapshot.entries().is_empty() {
        Some(EmptyReason::NoMatches)
    } else if !snapshot.rejected().is_empty() {
        Some(EmptyReason::AllRejected)
    } else {
        Some(EmptyReason::NoEntries)
    };

    Filtered {
        entries,
        empty_reason,
    }
}

/// `needle` must already be lowercase.
fn matches_search(entry: &LedgerEntry, needle: &str) -> bool {
    let contains = |haystack: &str| haystack.to_lowercase().contains(needle);
    contains(entry.date().text())
        || contains(&entry.amount().plain())
        || contains(entry.mode())
        || contains(&entry.status().to_string())
        || contains(&entry.category().to_string())
        || entry.parent_name().is_some_and(contains)
        || entry.notes().is_some_and(contains)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::build_snapshot;
    use crate::model::{Category, Status};
    use rust_decimal::Decimal;
    use serde_json::json;

    fn fixture() -> LedgerSnapshot {
        build_snapshot(
            &serde_json::from_value(json!({
                "g1": {"amount": 1000, "date": "2024-01-10", "mode": "Bank Transfer",
                       "status": "Received", "notes": "Mobilisation advance"}
            }))
            .unwrap(),
            &serde_json::from_value(json!({
                "s1": {"name": "Site A", "payments": {
                    "p1": {"amount": 500, "date": "2024-01-11", "mode": "Cash", "status": "Pending"},
                    "p2": {"amount": 250, "date": "2024-01-12", "mode": "UPI", "status": "Received"}
                }},
                "s2": {"name": "Site B", "payments": {
                    "p1": {"amount": 75, "date": "2024-01-13", "mode": "Cash", "status": "Pending"}
                }}
            }))
            .unwrap(),
            &serde_json::from_value(json!({
                "w1": {"name": "Ravi", "payments": {
                    "p1": {"amount": 800, "date": "2024-01-14", "mode": "Cash", "status": "Received"}
                }}
            }))
            .unwrap(),
            &serde_json::from_value(json!({
                "m1": {"name": "Cement", "payments": {
                    "p1": {"amount": 1200, "date": "2024-01-15", "mode": "Cheque",
                           "status": "Pending", "notes": "for slab work"}
                }}
            }))
            .unwrap(),
        )
    }

    fn ids(filtered: &Filtered) -> Vec<(Category, String)> {
        filtered
            .entries()
            .iter()
            .map(|e| (e.category(), e.id().to_string()))
            .collect()
    }

    #[test]
    fn test_no_filters_returns_everything() {
        let snap = fixture();
        let filtered = query(&snap, &LedgerQuery::default());
        assert_eq!(filtered.entries().len(), 6);
        assert_eq!(filtered.empty_reason(), None);
    }

    #[test]
    fn test_search_parent_name_case_insensitive() {
        let snap = fixture();
        let filtered = query(&snap, &LedgerQuery::new("site a", StatusFilter::All, CategoryFilter::All));
        let parents: Vec<_> = filtered.entries().iter().map(|e| e.detail()).collect();
        assert_eq!(parents, vec!["Site A", "Site A"]);
        let only_sites = query(
            &snap,
            &LedgerQuery::new("SITE A", StatusFilter::All, CategoryFilter::Sites),
        );
        assert!(only_sites
            .entries()
            .iter()
            .all(|e| e.parent_name() == Some("Site A")));
        assert_eq!(only_sites.entries().len(), 2);
    }

    #[test]
    fn test_search_fields() {
        let snap = fixture();
        let by = |s: &str| ids(&query(&snap, &LedgerQuery::new(s, StatusFilter::All, CategoryFilter::All)));
        assert_eq!(by("13/01"), vec![(Category::Sites, "p1".to_string())]);
        assert_eq!(by("1200"), vec![(Category::Materials, "p1".to_string())]);
        assert_eq!(by("upi"), vec![(Category::Sites, "p2".to_string())]);
        assert_eq!(by("ravi"), vec![(Category::Workers, "p1".to_string())]);
        assert_eq!(by("mobilisation"), vec![(Category::General, "g1".to_string())]);
        assert_eq!(by("general"), vec![(Category::General, "g1".to_string())]);
        assert_eq!(by("materials").len(), 1);
        assert_eq!(by("received").len(), 3);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let snap = fixture();
        let filtered = query(
            &snap,
            &LedgerQuery::new("cash", StatusFilter::Pending, CategoryFilter::Sites),
        );
        assert_eq!(filtered.entries().len(), 2);
        assert!(filtered
            .entries()
            .iter()
            .all(|e| e.status() == Status::Pending && e.category() == Category::Sites));
    }

    #[test]
    fn test_category_filter_agrees_with_totals() {
        let snap = fixture();
        for category in Category::ALL {
            let filtered = query(
                &snap,
                &LedgerQuery::new("", StatusFilter::All, category.into()),
            );
            let sum: Decimal = filtered
                .entries()
                .iter()
                .filter(|e| e.is_valid())
                .map(|e| e.amount().value())
                .sum();
            assert_eq!(sum, snap.totals().category(category).total());
        }
    }

    #[test]
    fn test_empty_reasons() {
        let snap = fixture();
        let filtered = query(&snap, &LedgerQuery::new("zzz", StatusFilter::All, CategoryFilter::All));
        assert!(filtered.is_empty());
        assert_eq!(filtered.empty_reason(), Some(EmptyReason::NoMatches));

        let empty = LedgerSnapshot::default();
        assert_eq!(
            query(&empty, &LedgerQuery::default()).empty_reason(),
            Some(EmptyReason::NoEntries)
        );

        let all_bad = build_snapshot(
            &serde_json::from_value(json!({"g": {"amount": "n/a", "date": "2024-01-01"}})).unwrap(),
            &Default::default(),
            &Default::default(),
            &Default::default(),
        );
        assert_eq!(
            query(&all_bad, &LedgerQuery::default()).empty_reason(),
            Some(EmptyReason::AllRejected)
        );
    }

    #[test]
    fn test_query_does_not_mutate_snapshot() {
        let snap = fixture();
        let before = snap.clone();
        let _ = query(&snap, &LedgerQuery::new("cash", StatusFilter::Pending, CategoryFilter::All));
        assert_eq!(snap, before);
    }

    #[test]
    fn test_is_filtered() {
        assert!(!LedgerQuery::default().is_filtered());
        assert!(LedgerQuery::new(" x ", StatusFilter::All, CategoryFilter::All).is_filtered());
        assert!(LedgerQuery::new("", StatusFilter::Received, CategoryFilter::All).is_filtered());
    }
}
