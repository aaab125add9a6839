//! Payment dates as they appear after normalization.
//!
//! Source documents write dates either as `DD/MM/YYYY` or in some generic machine format such as
//! ISO `YYYY-MM-DD`. Every date is resolved to a `NaiveDate` for ordering, and keeps a `DD/MM/YYYY`
//! display text. Dates that cannot be read are kept as `EntryDate::Invalid` with their raw text.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// The display format that every valid date is rendered in.
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y"];

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// A normalized payment date.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryDate {
    /// A real calendar date. `text` is the `DD/MM/YYYY` form shown to users.
    Valid { date: NaiveDate, text: String },
    /// The source date could not be interpreted. `raw` is what the source held.
    Invalid { raw: String },
}

impl EntryDate {
    /// Normalizes a raw document field.
    ///
    /// A string containing `/` is read as `DD/MM/YYYY` and its text kept unchanged. Anything else
    /// is parsed as a generic date and re-rendered as `DD/MM/YYYY`.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => Self::parse(s),
            None | Some(Value::Null) => EntryDate::Invalid { raw: String::new() },
            Some(other) => EntryDate::Invalid {
                raw: other.to_string(),
            },
        }
    }

    /// Normalizes a date string. See `from_value`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.contains('/') {
            return match NaiveDate::parse_from_str(trimmed, DISPLAY_FORMAT) {
                Ok(date) => EntryDate::Valid {
                    date,
                    text: trimmed.to_string(),
                },
                Err(_) => EntryDate::Invalid {
                    raw: raw.to_string(),
                },
            };
        }
        match parse_generic(trimmed) {
            Some(date) => EntryDate::Valid {
                date,
                text: date.format(DISPLAY_FORMAT).to_string(),
            },
            None => EntryDate::Invalid {
                raw: raw.to_string(),
            },
        }
    }

    /// The calendar date, if valid.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            EntryDate::Valid { date, .. } => Some(*date),
            EntryDate::Invalid { .. } => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, EntryDate::Valid { .. })
    }

    /// The text shown to users: `DD/MM/YYYY` for valid dates, the raw source text otherwise.
    pub fn text(&self) -> &str {
        match self {
            EntryDate::Valid { text, .. } => text,
            EntryDate::Invalid { raw } => raw,
        }
    }

    /// Newest first. Invalid dates compare after every valid date and equal to each other, so a
    /// stable sort keeps them in input order.
    pub fn cmp_newest_first(&self, other: &Self) -> Ordering {
        match (self.date(), other.date()) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl Display for EntryDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// Parses the date formats we accept for dates that are not written as `DD/MM/YYYY`.
fn parse_generic(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(date);
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}
