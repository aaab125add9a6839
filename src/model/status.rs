//! Payment status and the status filter.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether a payment has been received. This is the only input to the received/pending split.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub enum Status {
    Received,
    #[default]
    Pending,
}

serde_plain::derive_display_from_serialize!(Status);
serde_plain::derive_fromstr_from_deserialize!(Status);

impl Status {
    /// Reads a raw status field. Returns the status and whether the raw text was recognized.
    ///
    /// `Received` (any case) is received. `Pending`, a missing field, or a blank field is pending.
    /// Anything else is also pending, but reported as unrecognized so the caller can log it.
    pub fn from_value(value: Option<&Value>) -> (Status, bool) {
        let text = match value {
            None | Some(Value::Null) => return (Status::Pending, true),
            Some(Value::String(s)) => s.trim().to_lowercase(),
            Some(other) => other.to_string(),
        };
        match text.as_str() {
            "received" => (Status::Received, true),
            "pending" | "" => (Status::Pending, true),
            _ => (Status::Pending, false),
        }
    }
}

/// Restricts a query to one status.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Received,
    Pending,
}

serde_plain::derive_display_from_serialize!(StatusFilter);
serde_plain::derive_fromstr_from_deserialize!(StatusFilter);

impl StatusFilter {
    pub fn matches(&self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Received => status == Status::Received,
            StatusFilter::Pending => status == Status::Pending,
        }
    }
}
