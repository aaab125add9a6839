//! Amount type for handling non-negative payment values.
//!
//! Payment documents store amounts either as JSON numbers or as strings, which may carry a currency
//! symbol and thousands separators. This module coerces both into a `Decimal` and refuses anything
//! that is not a real non-negative number, so a bad value can never turn into `NaN` or a phantom
//! zero inside a sum.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Currency symbols that may prefix an amount string.
const CURRENCY_SYMBOLS: &[char] = &['₹', '$'];

/// The largest amount a single payment may carry: 1,000,000,000,000,000.
///
/// Sums of any realistic number of payments under this ceiling stay far inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// How the integer part of an amount is grouped when displayed.
///
/// # Examples
///  - `Grouping::Western` -> `1,234,567.50`
///  - `Grouping::Indian` -> `12,34,567.50`
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    /// Groups of three digits.
    Western,
    /// The last three digits, then groups of two (lakh/crore).
    #[default]
    Indian,
}

serde_plain::derive_display_from_serialize!(Grouping);
serde_plain::derive_fromstr_from_deserialize!(Grouping);

/// A non-negative payment amount.
///
/// # Examples
///
/// ```
/// # use payment_ledger::model::{Amount, Grouping};
/// # use std::str::FromStr;
/// let amount = Amount::from_str("₹1,50,000").unwrap();
/// assert_eq!(amount.display(Grouping::Indian), "1,50,000.00");
/// assert_eq!(amount.display(Grouping::Western), "150,000.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Creates an `Amount`, refusing negative values and values above `MAX_AMOUNT`.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }
        if value > MAX_AMOUNT {
            return Err(AmountError::TooLarge(value));
        }
        Ok(Self(value))
    }

    /// Coerces a raw document field into an `Amount`. `None` and JSON `null` are missing values.
    pub fn from_value(value: Option<&Value>) -> Result<Self, AmountError> {
        match value {
            None | Some(Value::Null) => Err(AmountError::Missing),
            Some(Value::Number(n)) => {
                let s = n.to_string();
                let parsed = Decimal::from_str(&s)
                    .or_else(|_| Decimal::from_scientific(&s))
                    .map_err(|_| AmountError::NotNumeric(s.clone()))?;
                Amount::new(parsed)
            }
            Some(Value::String(s)) => Amount::from_str(s),
            Some(other) => Err(AmountError::NotNumeric(other.to_string())),
        }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// The plain decimal text, without trailing fractional zeros, e.g. `1000` or `12.5`.
    pub fn plain(&self) -> String {
        self.0.normalize().to_string()
    }

    /// Renders the amount with two fraction digits and the given digit grouping.
    pub fn display(&self, grouping: Grouping) -> String {
        format_grouped(self.0, grouping)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Missing);
        }

        let without_symbol = trimmed.trim_start_matches(CURRENCY_SYMBOLS).trim_start();
        let without_commas = without_symbol.replace(',', "");
        let value = Decimal::from_str(&without_commas)
            .map_err(|_| AmountError::NotNumeric(trimmed.to_string()))?;
        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.plain())
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

/// Renders any decimal (an amount or a total) with two fraction digits and grouping. The digits
/// come from the `Decimal` itself, so large totals are rendered exactly.
pub fn format_grouped(value: Decimal, grouping: Grouping) -> String {
    let fixed = format!("{:.2}", value.round_dp(2));
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));
    let grouped = match grouping {
        Grouping::Western => group_digits(int_part, 3),
        Grouping::Indian => group_indian(int_part),
    };
    format!("{sign}{grouped}.{frac_part}")
}

/// Inserts lakh/crore separators into a string of ASCII digits.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, last_three) = digits.split_at(digits.len() - 3);
    format!("{},{last_three}", group_digits(head, 2))
}

/// Separates a string of ASCII digits into groups of `size`, counted from the right.
fn group_digits(digits: &str, size: usize) -> String {
    let mut groups: Vec<&str> = Vec::new();
    let mut end = digits.len();
    while end > 0 {
        let start = end.saturating_sub(size);
        groups.push(&digits[start..end]);
        end = start;
    }
    groups.reverse();
    groups.join(",")
}

/// Why a raw amount could not be coerced.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AmountError {
    /// The field was absent, null, or blank.
    Missing,
    /// The field was present but is not a number.
    NotNumeric(String),
    /// The field parsed, but payments cannot be negative.
    Negative(Decimal),
    /// The field parsed, but exceeds `MAX_AMOUNT`.
    TooLarge(Decimal),
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Missing => write!(f, "amount is missing"),
            AmountError::NotNumeric(raw) => write!(f, "amount '{raw}' is not a number"),
            AmountError::Negative(value) => write!(f, "amount {value} is negative"),
            AmountError::TooLarge(value) => {
                write!(f, "amount {value} is larger than {MAX_AMOUNT}")
            }
        }
    }
}

impl std::error::Error for AmountError {}
