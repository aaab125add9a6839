//! Converts the four differently-shaped payment collections into `LedgerEntry` values.

use crate::model::{
    Amount, Category, EntryDate, GeneralPayments, LedgerEntry, NormalizationFailure, Parent,
    ParentRecords, PaymentDocument, RawPayment, RejectedEntry, Status,
};
use serde_json::Value;
use tracing::{trace, warn};

/// The result of normalization: entries for the ledger and the payments that failed.
///
/// An entry with an invalid date appears in both lists. An entry with an invalid amount appears
/// only in `rejected`.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Normalized {
    pub(crate) entries: Vec<LedgerEntry>,
    pub(crate) rejected: Vec<RejectedEntry>,
}

impl Normalized {
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn rejected(&self) -> &[RejectedEntry] {
        &self.rejected
    }
}

/// Normalizes general payments and the payments nested under sites, workers and materials.
///
/// A parent without a `payments` collection contributes nothing.
pub fn normalize(
    general: &GeneralPayments,
    sites: &ParentRecords,
    workers: &ParentRecords,
    materials: &ParentRecords,
) -> Normalized {
    let mut out = Normalized::default();

    for (id, document) in general {
        out.push_document(id, Category::General, None, document);
    }

    for (category, records) in [
        (Category::Sites, sites),
        (Category::Workers, workers),
        (Category::Materials, materials),
    ] {
        for (parent_id, record) in records {
            let Some(payments) = &record.payments else {
                trace!("{category} '{parent_id}' has no payments");
                continue;
            };
            let name = record
                .name()
                .or(category.parent_placeholder())
                .unwrap_or_default();
            let parent = Parent {
                id: parent_id.clone(),
                name: name.to_string(),
            };
            for (id, document) in payments {
                out.push_document(id, category, Some(&parent), document);
            }
        }
    }

    out
}

impl Normalized {
    fn push_document(
        &mut self,
        id: &str,
        category: Category,
        parent: Option<&Parent>,
        document: &PaymentDocument,
    ) {
        match document {
            PaymentDocument::Payment(raw) => self.push(id, category, parent, raw),
            PaymentDocument::Malformed(value) => {
                let rejected = RejectedEntry {
                    id: id.to_string(),
                    category,
                    parent: parent.cloned(),
                    raw: RawPayment::default(),
                    failures: vec![NormalizationFailure::NotADocument {
                        found: value.to_string(),
                    }],
                };
                warn!(
                    "{category} payment '{id}' excluded from totals: {}",
                    rejected.reasons()
                );
                self.rejected.push(rejected);
            }
        }
    }

    fn push(&mut self, id: &str, category: Category, parent: Option<&Parent>, raw: &RawPayment) {
        let mut failures = Vec::new();

        let amount = match Amount::from_value(raw.amount.as_ref()) {
            Ok(amount) => Some(amount),
            Err(error) => {
                failures.push(NormalizationFailure::InvalidAmount { error });
                None
            }
        };

        let date = EntryDate::from_value(raw.date.as_ref());
        if let EntryDate::Invalid { raw } = &date {
            failures.push(NormalizationFailure::InvalidDate { raw: raw.clone() });
        }

        let (status, recognized) = Status::from_value(raw.status.as_ref());
        if !recognized {
            let shown = raw
                .status
                .as_ref()
                .map(|value| value.to_string())
                .unwrap_or_default();
            warn!(
                "{category} payment '{id}' has unrecognized status {shown}, treating it as {status}"
            );
        }

        if !failures.is_empty() {
            let rejected = RejectedEntry {
                id: id.to_string(),
                category,
                parent: parent.cloned(),
                raw: raw.clone(),
                failures,
            };
            warn!(
                "{category} payment '{id}' excluded from totals: {}",
                rejected.reasons()
            );
            self.rejected.push(rejected);
        }

        if let Some(amount) = amount {
            self.entries.push(LedgerEntry {
                id: id.to_string(),
                category,
                parent: parent.cloned(),
                amount,
                date,
                mode: text(raw.mode.as_ref()).unwrap_or_default(),
                status,
                notes: text(raw.notes.as_ref()).filter(|s| !s.trim().is_empty()),
            });
        }
    }
}

/// Renders a scalar document field as text. Strings are taken as-is, numbers and booleans are
/// stringified, and anything else is treated as absent.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
