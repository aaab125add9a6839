use crate::attendance::{daily_total, AttendanceTotal};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{format_grouped, DISPLAY_FORMAT};
use crate::store::{fetch_attendance, fetch_workers};
use crate::{Config, Result};
use chrono::NaiveDate;

/// Counts the workers marked present on `date` and sums their daily wages.
pub async fn attendance(config: Config, date: NaiveDate) -> Result<Out<AttendanceTotal>> {
    let store = config.store();
    let project_id = config.project_id();
    let (workers, day) = tokio::try_join!(
        fetch_workers(&store, project_id),
        fetch_attendance(&store, project_id, date),
    )
    .pub_result(ErrorType::Store)?;

    let total = daily_total(&workers, &day, date);
    let message = format!(
        "{}: {}/{} workers present, daily wages {}{}",
        date.format(DISPLAY_FORMAT),
        total.present,
        total.workers,
        config.currency_symbol(),
        format_grouped(total.amount, config.grouping())
    );
    Ok(Out::new(message, total))
}
