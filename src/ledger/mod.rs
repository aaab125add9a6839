//! The ledger engine: normalization, aggregation, querying, ordering and report projection.
//!
//! Everything in this module is synchronous and free of side effects other than logging. Source
//! collections are fetched by the `store` module and handed over as a `LedgerSources`.

mod aggregate;
mod normalize;
mod order;
mod query;
mod report;

pub use aggregate::{build_snapshot, CategoryTotals, LedgerSnapshot, LedgerTotals};
pub use normalize::{normalize, Normalized};
pub use order::order;
pub use query::{query, EmptyReason, Filtered, LedgerQuery};
pub use report::{project, ReportRow, ReportSummary, ReportTable, HEADERS};

use crate::model::{GeneralPayments, ParentRecords};
use serde::{Deserialize, Serialize};

/// The four source collections of one project, fetched together.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSources {
    #[serde(rename = "payments")]
    pub general: GeneralPayments,
    pub sites: ParentRecords,
    pub workers: ParentRecords,
    pub materials: ParentRecords,
}

impl LedgerSources {
    /// Builds the snapshot for these collections.
    pub fn build_snapshot(&self) -> LedgerSnapshot {
        build_snapshot(&self.general, &self.sites, &self.workers, &self.materials)
    }
}
