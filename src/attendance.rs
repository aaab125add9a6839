//! Daily attendance totals for workers.
//!
//! Attendance is recorded per day under `attendance/{YYYYMMDD}/{worker_id}`. The total for a day
//! counts the workers marked present and sums the daily wage of those that are known.

use crate::model::{Amount, AmountError, ParentRecords};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// The date format of attendance keys.
const KEY_FORMAT: &str = "%Y%m%d";

/// One worker's mark for one day.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceMark {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub present: Option<Value>,
}

impl AttendanceMark {
    /// Only a JSON `true` counts as present.
    pub fn is_present(&self) -> bool {
        matches!(self.present, Some(Value::Bool(true)))
    }
}

/// All marks for one day, keyed by worker id.
pub type AttendanceDay = BTreeMap<String, AttendanceMark>;

/// The attendance total for a day.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct AttendanceTotal {
    pub date: NaiveDate,
    /// The number of workers marked present.
    pub present: usize,
    /// The number of workers in the project.
    pub workers: usize,
    /// The sum of the daily wages of the present workers.
    pub amount: Decimal,
}

/// The key under `attendance/` that holds the marks for `date`, e.g. `20240305`.
pub fn attendance_key(date: NaiveDate) -> String {
    date.format(KEY_FORMAT).to_string()
}

/// Computes the attendance total for `date` from the day's marks and the workers collection.
///
/// A worker who is marked present but is not in `workers` counts towards `present` but adds
/// nothing to `amount`. A worker whose wage cannot be read is skipped.
pub fn daily_total(workers: &ParentRecords, day: &AttendanceDay, date: NaiveDate) -> AttendanceTotal {
    let mut present = 0;
    let mut amount = Decimal::ZERO;

    for (worker_id, _) in day.iter().filter(|(_, mark)| mark.is_present()) {
        present += 1;
        let Some(worker) = workers.get(worker_id) else {
            debug!("Worker '{worker_id}' is marked present but is not in the workers collection");
            continue;
        };
        match Amount::from_value(worker.wage.as_ref()) {
            Ok(wage) => amount = amount.saturating_add(wage.value()),
            Err(AmountError::Missing) => {
                debug!("Worker '{worker_id}' has no wage");
            }
            Err(e) => warn!("Skipping the wage of worker '{worker_id}': {e}"),
        }
    }

    AttendanceTotal {
        date,
        present,
        workers: workers.len(),
        amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_attendance_key() {
        assert_eq!(attendance_key(date()), "20240305");
    }

    #[test]
    fn test_daily_total() {
        let workers: ParentRecords = serde_json::from_value(json!({
            "w1": {"name": "Ravi", "wage": 800},
            "w2": {"name": "Anil", "wage": "650.50"},
            "w3": {"name": "Suresh", "wage": 700},
            "w4": {"name": "Manoj", "wage": "lots"}
        }))
        .unwrap();
        let day: AttendanceDay = serde_json::from_value(json!({
            "w1": {"present": true},
            "w2": {"present": true, "wage": 650.5},
            "w3": {"present": false},
            "w4": {"present": true},
            "ghost": {"present": true}
        }))
        .unwrap();

        let total = daily_total(&workers, &day, date());
        assert_eq!(total.date, date());
        assert_eq!(total.present, 4);
        assert_eq!(total.workers, 4);
        assert_eq!(total.amount, Decimal::new(145050, 2));
    }

    #[test]
    fn test_only_true_is_present() {
        let day: AttendanceDay = serde_json::from_value(json!({
            "a": {"present": "true"},
            "b": {"present": 1},
            "c": {}
        }))
        .unwrap();
        let total = daily_total(&ParentRecords::new(), &day, date());
        assert_eq!(total.present, 0);
        assert_eq!(total.amount, Decimal::ZERO);
    }
}
