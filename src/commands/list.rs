//! The `list` and `export` commands, which share the query, order and projection pipeline.

use crate::args::{ExportArgs, ListArgs, OutputFormat, QueryArgs};
use crate::commands::{load, Out};
use crate::error::{ErrorType, IntoResult};
use crate::ledger::{
    order, project, query, EmptyReason, LedgerQuery, LedgerSnapshot, ReportTable,
};
use crate::{utils, Config, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;
use tracing::debug;

/// Listed rows in the requested output format.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rows {
    /// The projected report as JSON.
    Json(serde_json::Value),
    /// Markdown table as a single formatted string.
    Table(String),
    /// CSV data as a properly escaped string.
    Csv(String),
}

impl Debug for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => write!(f, "Rows::Json({:?})", v),
            Rows::Table(s) => write!(f, "Rows::Table({} chars)", s.len()),
            Rows::Csv(s) => write!(f, "Rows::Csv({} chars)", s.len()),
        }
    }
}

impl Display for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => {
                if let Ok(s) = serde_json::to_string_pretty(v) {
                    write!(f, "{}", s)
                } else {
                    write!(f, "{:?}", v)
                }
            }
            Rows::Table(s) => write!(f, "{}", s),
            Rows::Csv(s) => write!(f, "{}", s),
        }
    }
}

/// The structured output of `ledger export`.
#[derive(Debug, Clone, Serialize)]
pub struct Exported {
    pub path: PathBuf,
    pub rows: usize,
}

/// Lists the payments that match `args`, newest first, followed by the payment summary.
///
/// When nothing matches there are no rows, and the message says whether the project has no
/// payments, has only unreadable payments, or has payments that the filters excluded.
pub async fn list(config: Config, args: ListArgs) -> Result<Out<Rows>> {
    let loaded = load(&config).await?;
    let report = match report(&loaded.snapshot, args.query()) {
        Ok(report) => report.with_title(&loaded.project_name),
        Err(reason) => return Ok(Out::new_message(reason.message())),
    };

    let count = report.rows().len();
    let rows = match args.format() {
        OutputFormat::Table => {
            Rows::Table(report.to_table(config.grouping(), config.currency_symbol()))
        }
        OutputFormat::Csv => Rows::Csv(report.to_csv().pub_result(ErrorType::Internal)?),
        OutputFormat::Json => Rows::Json(
            serde_json::to_value(&report)
                .context("Unable to serialize the report")
                .pub_result(ErrorType::Internal)?,
        ),
    };
    Ok(Out::new(
        format!(
            "Listed {count} of {} payments",
            loaded.snapshot.entries().len()
        ),
        rows,
    ))
}

/// Writes the payments that match `args`, newest first, and the payment summary to a CSV file.
///
/// The file is written even when nothing matches, in which case it holds only the summary.
pub async fn export(config: Config, args: ExportArgs) -> Result<Out<Exported>> {
    let loaded = load(&config).await?;
    let today = chrono::Local::now().date_naive();
    let report = report(&loaded.snapshot, args.query())
        .unwrap_or_else(|_| project(&[], loaded.snapshot.totals()))
        .with_title(&loaded.project_name)
        .with_generated_on(today);

    let path = match args.output() {
        Some(output) => output.to_path_buf(),
        None => config.default_export_path(&loaded.project_name),
    };
    let csv = report.to_csv().pub_result(ErrorType::Internal)?;
    utils::write(&path, csv)
        .await
        .context("Unable to write the export file")
        .pub_result(ErrorType::Export)?;

    let rows = report.rows().len();
    Ok(Out::new(
        format!("Exported {rows} payments to {}", path.display()),
        Exported { path, rows },
    ))
}

/// Queries, orders and projects the snapshot, or says why nothing matched.
fn report(
    snapshot: &LedgerSnapshot,
    args: &QueryArgs,
) -> std::result::Result<ReportTable, EmptyReason> {
    let filtered = query(snapshot, &LedgerQuery::from(args));
    if let Some(reason) = filtered.empty_reason() {
        return Err(reason);
    }
    debug!("{} payments match the query", filtered.entries().len());
    let ordered = order(filtered.into_entries());
    Ok(project(&ordered, snapshot.totals()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryFilter, StatusFilter};
    use crate::test::TestEnv;
    use serde_json::json;

    fn all() -> QueryArgs {
        QueryArgs::default()
    }

    #[tokio::test]
    async fn test_list_table_is_newest_first() {
        let env = TestEnv::new().await;
        let out = list(env.config(), ListArgs::new(all(), OutputFormat::Table))
            .await
            .unwrap();
        assert_eq!(out.message(), "Listed 6 of 6 payments");
        let Some(Rows::Table(table)) = out.structure() else {
            panic!("expected a table, got {:?}", out.structure());
        };
        assert!(table.starts_with("# Riverside Tower Balance Sheet"));
        let positions: Vec<usize> = ["15/01/2024", "14/01/2024", "13/01/2024", "not-a-date"]
            .iter()
            .map(|d| table.find(&format!("| {d} |")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{table}");
        assert!(table.contains("| not-a-date | Sites | Unknown Site | ₹75.00 |"));
        assert!(table.contains("| 13/01/2024 | Materials | Cement | ₹1,200.00 | Cheque | Pending | slab |"));
    }

    #[tokio::test]
    async fn test_list_search_site_a() {
        let env = TestEnv::new().await;
        let args = ListArgs::new(
            QueryArgs::new("site a", StatusFilter::All, CategoryFilter::All),
            OutputFormat::Json,
        );
        let out = list(env.config(), args).await.unwrap();
        let Some(Rows::Json(value)) = out.structure() else {
            panic!("expected json, got {:?}", out.structure());
        };
        let rows = value["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r["detail"] == json!("Site A")));
        assert_eq!(rows[0]["date"], json!("15/01/2024"));
        assert_eq!(value["summary"]["grand"]["total"], json!("3750"));
    }

    #[tokio::test]
    async fn test_list_csv_filters() {
        let env = TestEnv::new().await;
        let args = ListArgs::new(
            QueryArgs::new("", StatusFilter::Received, CategoryFilter::All),
            OutputFormat::Csv,
        );
        let out = list(env.config(), args).await.unwrap();
        let Some(Rows::Csv(csv)) = out.structure() else {
            panic!("expected csv, got {:?}", out.structure());
        };
        let data_rows: Vec<&str> = csv
            .lines()
            .filter(|line| line.split(',').nth(5) == Some("Received"))
            .collect();
        assert_eq!(
            data_rows,
            vec![
                "14/01/2024,Workers,Ravi,800,Cash,Received,-",
                "12/01/2024,Sites,Site A,250,UPI,Received,-",
                "10/01/2024,General,-,1000,Bank Transfer,Received,Mobilisation advance",
            ]
        );
    }

    #[tokio::test]
    async fn test_list_no_matches() {
        let env = TestEnv::new().await;
        let args = ListArgs::new(
            QueryArgs::new("zzz", StatusFilter::All, CategoryFilter::All),
            OutputFormat::Table,
        );
        let out = list(env.config(), args).await.unwrap();
        assert!(out.structure().is_none());
        assert_eq!(out.message(), "No payments match your search criteria.");
    }

    #[tokio::test]
    async fn test_list_no_payments() {
        let env = TestEnv::new().await;
        env.set_project(json!({"name": "Empty", "sites": {"s1": {"name": "Site A"}}}))
            .await;
        let out = list(env.config(), ListArgs::new(all(), OutputFormat::Table))
            .await
            .unwrap();
        assert_eq!(out.message(), "No payments recorded for this project.");
    }

    #[tokio::test]
    async fn test_export_default_path() {
        let env = TestEnv::new().await;
        let out = export(env.config(), ExportArgs::new(all(), None))
            .await
            .unwrap();
        let exported = out.structure().unwrap();
        assert_eq!(exported.rows, 6);
        assert_eq!(
            exported.path,
            env.config()
                .root()
                .join("Riverside Tower_BalanceSheet.csv")
        );

        let content = utils::read(&exported.path).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Project,Riverside Tower");
        assert!(lines[1].starts_with("Generated On,"));
        assert_eq!(lines[2], "Date,Category,Details,Amount,Payment Mode,Status,Notes");
        assert_eq!(lines[3], "15/01/2024,Sites,Site A,500,Cash,Pending,-");
        assert!(content.contains("Total Amount,3750\n"));
        assert!(content.contains("Completion %,54.67\n"));
    }

    #[tokio::test]
    async fn test_export_filtered_to_output() {
        let env = TestEnv::new().await;
        let output = env.scratch_path("materials.csv");
        let args = ExportArgs::new(
            QueryArgs::new("", StatusFilter::All, CategoryFilter::Materials),
            Some(output.clone()),
        );
        let out = export(env.config(), args).await.unwrap();
        assert_eq!(out.structure().unwrap().rows, 1);
        let content = utils::read(&output).await.unwrap();
        assert!(content.contains("13/01/2024,Materials,Cement,1200,Cheque,Pending,slab"));
        assert!(content.contains("Total Amount,3750"));
    }

    #[tokio::test]
    async fn test_export_unwritable_is_export_error() {
        let env = TestEnv::new().await;
        let output = env.scratch_path("missing_dir").join("out.csv");
        let err = export(env.config(), ExportArgs::new(all(), Some(output)))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Export);
    }
}
