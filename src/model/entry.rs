//! Raw payment documents as stored under a project, and the normalized `LedgerEntry`.

use crate::model::{Amount, AmountError, Category, EntryDate, Status};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{btree_map, BTreeMap};
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use tracing::warn;

/// The text shown in place of absent notes or absent details.
pub const PLACEHOLDER: &str = "-";

/// A payment document exactly as the store holds it. Every field is kept as a raw JSON value
/// because documents are edited by hand-built forms and their types are not guaranteed.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPayment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Value>,
}

/// One child of a payments collection. Anything other than a JSON object is kept as `Malformed`
/// so that it can be reported without failing the rest of the collection.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PaymentDocument {
    Payment(RawPayment),
    Malformed(Value),
}

impl<'de> Deserialize<'de> for PaymentDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            value @ Value::Object(_) => serde_json::from_value(value)
                .map(PaymentDocument::Payment)
                .map_err(D::Error::custom),
            other => Ok(PaymentDocument::Malformed(other)),
        }
    }
}

/// Documents keyed by id.
///
/// The store exports a collection whose keys are all small integers as a JSON array, so an array
/// is accepted and keyed by index. `null` children are absent and skipped. Any other value is not
/// a collection and fails to deserialize.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Keyed<T>(BTreeMap<String, T>);

impl<T> Keyed<T> {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }
}

impl<T> Default for Keyed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for Keyed<T> {
    type Target = BTreeMap<String, T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a, T> IntoIterator for &'a Keyed<T> {
    type Item = (&'a String, &'a T);
    type IntoIter = btree_map::Iter<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T> FromIterator<(String, T)> for Keyed<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Keyed<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let children: Vec<(String, Value)> = match Value::deserialize(deserializer)? {
            Value::Object(map) => map.into_iter().collect(),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, value)| (index.to_string(), value))
                .collect(),
            other => {
                return Err(D::Error::custom(format!(
                    "expected a collection of documents, found {other}"
                )))
            }
        };
        children
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(id, value)| {
                serde_json::from_value(value)
                    .map(|document| (id, document))
                    .map_err(D::Error::custom)
            })
            .collect()
    }
}

/// A site, worker, or material document. Only the fields the ledger needs are read.
///
/// A parent that is not a JSON object, or whose `payments` is not a collection, is logged and read
/// as having no payments.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct ParentRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    /// Daily wage, only meaningful for workers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wage: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payments: Option<Keyed<PaymentDocument>>,
}

impl<'de> Deserialize<'de> for ParentRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = match Value::deserialize(deserializer)? {
            Value::Object(fields) => fields,
            other => {
                warn!("Ignoring a record that is not a document: {other}");
                return Ok(Self::default());
            }
        };
        let payments = match fields.remove("payments") {
            None | Some(Value::Null) => None,
            Some(value) => match serde_json::from_value(value) {
                Ok(payments) => Some(payments),
                Err(e) => {
                    warn!("Ignoring payments that cannot be read: {e}");
                    None
                }
            },
        };
        Ok(Self {
            name: fields.remove("name").filter(|v| !v.is_null()),
            wage: fields.remove("wage").filter(|v| !v.is_null()),
            payments,
        })
    }
}

impl ParentRecord {
    /// The `name` field if it is non-blank text.
    pub fn name(&self) -> Option<&str> {
        match &self.name {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}

/// General payments, keyed by payment id.
pub type GeneralPayments = Keyed<PaymentDocument>;

/// Sites, workers or materials, keyed by their document id.
pub type ParentRecords = Keyed<ParentRecord>;

/// The owner of a nested payment.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct Parent {
    pub id: String,
    pub name: String,
}

/// One normalized payment fact.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub(crate) id: String,
    pub(crate) category: Category,
    /// `None` exactly when `category` is `General`.
    pub(crate) parent: Option<Parent>,
    pub(crate) amount: Amount,
    pub(crate) date: EntryDate,
    pub(crate) mode: String,
    pub(crate) status: Status,
    pub(crate) notes: Option<String>,
}

impl LedgerEntry {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_ref().map(|p| p.id.as_str())
    }

    pub fn parent_name(&self) -> Option<&str> {
        self.parent.as_ref().map(|p| p.name.as_str())
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> &EntryDate {
        &self.date
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// The notes, or `-` when there are none.
    pub fn notes_or_placeholder(&self) -> &str {
        self.notes().unwrap_or(PLACEHOLDER)
    }

    /// The parent's name, or `-` for `General` payments.
    pub fn detail(&self) -> &str {
        self.parent_name().unwrap_or(PLACEHOLDER)
    }

    /// Whether the entry counts towards totals. Entries with an invalid date stay in the ledger so
    /// that they can be shown and exported, but they are not summed.
    pub fn is_valid(&self) -> bool {
        self.date.is_valid()
    }
}

/// Why a payment document could not be normalized cleanly.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "failure", rename_all = "snake_case")]
pub enum NormalizationFailure {
    InvalidAmount { error: AmountError },
    InvalidDate { raw: String },
    /// The payment is a bare value rather than a document.
    NotADocument { found: String },
}

impl Display for NormalizationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizationFailure::InvalidAmount { error } => Display::fmt(error, f),
            NormalizationFailure::InvalidDate { raw } if raw.is_empty() => {
                write!(f, "date is missing")
            }
            NormalizationFailure::InvalidDate { raw } => write!(f, "date '{raw}' is not valid"),
            NormalizationFailure::NotADocument { found } => {
                write!(f, "payment {found} is not a document")
            }
        }
    }
}

/// A payment excluded from totals, with its original fields and the reasons.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct RejectedEntry {
    pub(crate) id: String,
    pub(crate) category: Category,
    pub(crate) parent: Option<Parent>,
    pub(crate) raw: RawPayment,
    pub(crate) failures: Vec<NormalizationFailure>,
}

impl RejectedEntry {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn parent_name(&self) -> Option<&str> {
        self.parent.as_ref().map(|p| p.name.as_str())
    }

    pub fn raw(&self) -> &RawPayment {
        &self.raw
    }

    pub fn failures(&self) -> &[NormalizationFailure] {
        &self.failures
    }

    /// `true` when the entry is missing from the ledger entirely, rather than kept with a flag.
    pub fn is_dropped(&self) -> bool {
        self.failures
            .iter()
            .any(|f| {
                matches!(
                    f,
                    NormalizationFailure::InvalidAmount { .. }
                        | NormalizationFailure::NotADocument { .. }
                )
            })
    }

    /// All failure reasons joined for display.
    pub fn reasons(&self) -> String {
        self.failures
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
