//! Types that represent the core data model, such as `LedgerEntry` and `Category`.
mod amount;
mod category;
mod date;
mod entry;
mod status;

pub use amount::{format_grouped, Amount, AmountError, Grouping};
pub use category::{Category, CategoryFilter};
pub use date::{EntryDate, DISPLAY_FORMAT};
pub use entry::{
    GeneralPayments, Keyed, LedgerEntry, NormalizationFailure, Parent, ParentRecord,
    ParentRecords, PaymentDocument, RawPayment, RejectedEntry, PLACEHOLDER,
};
pub use status::{Status, StatusFilter};
