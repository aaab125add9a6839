//! Projects an ordered ledger view and its totals into an export-ready table, and renders that
//! table as CSV or as a markdown table.

use crate::error::Res;
use crate::ledger::{CategoryTotals, LedgerTotals};
use crate::model::{format_grouped, Category, Grouping, LedgerEntry, Status, DISPLAY_FORMAT};
use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Column headers of the report rows, in order.
pub const HEADERS: [&str; 7] = [
    "Date",
    "Category",
    "Details",
    "Amount",
    "Payment Mode",
    "Status",
    "Notes",
];

/// One exported payment.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ReportRow {
    pub date: String,
    pub category: Category,
    /// The parent name, or `-` for general payments.
    pub detail: String,
    pub amount: Decimal,
    pub mode: String,
    pub status: Status,
    /// The notes, or `-` when there are none.
    pub notes: String,
}

impl From<&LedgerEntry> for ReportRow {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            date: entry.date().text().to_string(),
            category: entry.category(),
            detail: entry.detail().to_string(),
            amount: entry.amount().value(),
            mode: entry.mode().to_string(),
            status: entry.status(),
            notes: entry.notes_or_placeholder().to_string(),
        }
    }
}

/// The summary block printed beneath the rows.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ReportSummary {
    pub grand: CategoryTotals,
    pub completion_percentage: Decimal,
    pub categories: BTreeMap<Category, CategoryTotals>,
}

impl From<&LedgerTotals> for ReportSummary {
    fn from(totals: &LedgerTotals) -> Self {
        Self {
            grand: totals.grand(),
            completion_percentage: totals.completion_percentage(),
            categories: totals.categories().clone(),
        }
    }
}

/// A projected report: optional metadata, the rows and the summary.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ReportTable {
    title: Option<String>,
    generated_on: Option<NaiveDate>,
    rows: Vec<ReportRow>,
    summary: ReportSummary,
}

/// Maps ordered entries and the snapshot's totals into a report. The summary is copied from
/// `totals` unchanged, so a filtered report still carries the whole ledger's totals.
pub fn project(entries: &[&LedgerEntry], totals: &LedgerTotals) -> ReportTable {
    ReportTable {
        title: None,
        generated_on: None,
        rows: entries.iter().map(|&entry| ReportRow::from(entry)).collect(),
        summary: ReportSummary::from(totals),
    }
}

impl ReportTable {
    /// Attaches a title, typically the project name.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attaches the date the report was generated.
    pub fn with_generated_on(mut self, date: NaiveDate) -> Self {
        self.generated_on = Some(date);
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn generated_on(&self) -> Option<NaiveDate> {
        self.generated_on
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }

    /// Renders the report as CSV with plain decimal amounts: metadata, the header and rows, then
    /// the summary block.
    pub fn to_csv(&self) -> Res<String> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        if let Some(title) = &self.title {
            writer.write_record(["Project", title.as_str()])?;
        }
        if let Some(date) = self.generated_on {
            writer.write_record([
                "Generated On".to_string(),
                date.format(DISPLAY_FORMAT).to_string(),
            ])?;
        }

        writer.write_record(HEADERS)?;
        for row in &self.rows {
            writer.write_record([
                row.date.clone(),
                row.category.to_string(),
                row.detail.clone(),
                plain(row.amount),
                row.mode.clone(),
                row.status.to_string(),
                row.notes.clone(),
            ])?;
        }

        let grand = self.summary.grand;
        writer.write_record(["Payment Summary"])?;
        writer.write_record(["Total Amount".to_string(), plain(grand.total())])?;
        writer.write_record(["Received".to_string(), plain(grand.received())])?;
        writer.write_record(["Pending".to_string(), plain(grand.pending())])?;
        writer.write_record([
            "Completion %".to_string(),
            plain(self.summary.completion_percentage),
        ])?;

        writer.write_record(["Category", "Total", "Received", "Pending"])?;
        for category in Category::ALL {
            let totals = self.category(category);
            writer.write_record([
                category.to_string(),
                plain(totals.total()),
                plain(totals.received()),
                plain(totals.pending()),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Unable to flush CSV output: {}", e.error()))?;
        String::from_utf8(bytes).context("CSV output is not valid UTF-8")
    }

    /// Renders the report as a markdown table followed by the payment summary and the
    /// category-wise breakdown. Amounts carry `symbol` and the requested digit grouping.
    pub fn to_table(&self, grouping: Grouping, symbol: &str) -> String {
        let money = |value: Decimal| format!("{symbol}{}", format_grouped(value, grouping));
        let mut lines: Vec<String> = Vec::new();

        if let Some(title) = &self.title {
            lines.push(format!("# {} Balance Sheet", escape(title)));
            lines.push(String::new());
        }
        if let Some(date) = self.generated_on {
            lines.push(format!("Generated on {}", date.format(DISPLAY_FORMAT)));
            lines.push(String::new());
        }

        lines.push(format!("| {} |", HEADERS.join(" | ")));
        lines.push(format!("|{}", " --- |".repeat(HEADERS.len())));
        lines.extend(self.rows.iter().map(|row| {
            format!(
                "| {} | {} | {} | {} | {} | {} | {} |",
                escape(&row.date),
                row.category,
                escape(&row.detail),
                money(row.amount),
                escape(&row.mode),
                row.status,
                escape(&row.notes),
            )
        }));

        let grand = self.summary.grand;
        lines.extend([
            String::new(),
            "## Payment Summary".to_string(),
            String::new(),
            format!("- Total Amount: {}", money(grand.total())),
            format!("- Received: {}", money(grand.received())),
            format!("- Pending: {}", money(grand.pending())),
            format!(
                "- Completion: {}%",
                self.summary.completion_percentage.round_dp(2)
            ),
        ]);

        lines.extend([
            String::new(),
            "## Category-wise Breakdown".to_string(),
            String::new(),
            "| Category | Total | Received | Pending |".to_string(),
            "| --- | --- | --- | --- |".to_string(),
        ]);
        lines.extend(Category::ALL.into_iter().map(|category| {
            let totals = self.category(category);
            format!(
                "| {category} | {} | {} | {} |",
                money(totals.total()),
                money(totals.received()),
                money(totals.pending()),
            )
        }));

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    fn category(&self, category: Category) -> CategoryTotals {
        self.summary
            .categories
            .get(&category)
            .copied()
            .unwrap_or_default()
    }
}

fn plain(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Makes free text safe inside a markdown table cell.
fn escape(s: &str) -> String {
    s.replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{build_snapshot, order, query, LedgerQuery, LedgerSnapshot};
    use crate::model::{CategoryFilter, StatusFilter};
    use serde_json::json;
    use std::str::FromStr;

    fn fixture() -> LedgerSnapshot {
        build_snapshot(
            &serde_json::from_value(json!({
                "g1": {"amount": 1000, "date": "2024-01-01", "mode": "Cash", "status": "Received"}
            }))
            .unwrap(),
            &serde_json::from_value(json!({
                "s1": {"name": "Site A", "payments": {
                    "p1": {"amount": "500", "date": "02/01/2024", "mode": "UPI",
                           "status": "Pending", "notes": "slab | columns"}
                }}
            }))
            .unwrap(),
            &Default::default(),
            &Default::default(),
        )
    }

    fn report(snap: &LedgerSnapshot) -> ReportTable {
        let ordered = order(query(snap, &LedgerQuery::default()).into_entries());
        project(&ordered, snap.totals())
    }

    #[test]
    fn test_rows() {
        let snap = fixture();
        let table = report(&snap);
        let rows = table.rows();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].date, "02/01/2024");
        assert_eq!(rows[0].category, Category::Sites);
        assert_eq!(rows[0].detail, "Site A");
        assert_eq!(rows[0].amount, Decimal::from(500));
        assert_eq!(rows[0].notes, "slab | columns");

        assert_eq!(rows[1].date, "01/01/2024");
        assert_eq!(rows[1].detail, "-");
        assert_eq!(rows[1].notes, "-");
        assert_eq!(rows[1].status, Status::Received);
    }

    #[test]
    fn test_summary_copies_totals() {
        let snap = fixture();
        let table = report(&snap);
        assert_eq!(table.summary().grand, snap.totals().grand());
        assert_eq!(
            table.summary().completion_percentage,
            Decimal::from_str("66.67").unwrap()
        );
        assert_eq!(&table.summary().categories, snap.totals().categories());
    }

    #[test]
    fn test_filtered_report_keeps_full_summary() {
        let snap = fixture();
        let filtered = query(
            &snap,
            &LedgerQuery::new("", StatusFilter::All, CategoryFilter::General),
        );
        let table = project(filtered.entries(), snap.totals());
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.summary().grand.total(), Decimal::from(1500));
    }

    #[test]
    fn test_to_csv() {
        let snap = fixture();
        let csv = report(&snap)
            .with_title("Tower, Block B")
            .with_generated_on(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
            .to_csv()
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Project,\"Tower, Block B\"",
                "Generated On,01/02/2024",
                "Date,Category,Details,Amount,Payment Mode,Status,Notes",
                "02/01/2024,Sites,Site A,500,UPI,Pending,slab | columns",
                "01/01/2024,General,-,1000,Cash,Received,-",
                "Payment Summary",
                "Total Amount,1500",
                "Received,1000",
                "Pending,500",
                "Completion %,66.67",
                "Category,Total,Received,Pending",
                "Sites,500,0,500",
                "Workers,0,0,0",
                "Materials,0,0,0",
                "General,1000,1000,0",
            ]
        );
    }

    #[test]
    fn test_to_table() {
        let snap = fixture();
        let table = report(&snap).with_title("Tower").to_table(Grouping::Indian, "₹");
        assert!(table.starts_with("# Tower Balance Sheet\n"));
        assert!(table.contains("| Date | Category | Details | Amount | Payment Mode | Status | Notes |"));
        assert!(table.contains("| 02/01/2024 | Sites | Site A | ₹500.00 | UPI | Pending | slab \\| columns |"));
        assert!(table.contains("- Total Amount: ₹1,500.00"));
        assert!(table.contains("- Completion: 66.67%"));
        assert!(table.contains("| General | ₹1,000.00 | ₹1,000.00 | ₹0.00 |"));
        let sites = table.find("| Sites |").unwrap();
        let general = table.find("| General |").unwrap();
        assert!(sites < general);
    }

    #[test]
    fn test_to_table_grouping() {
        let snap = build_snapshot(
            &serde_json::from_value(json!({
                "g1": {"amount": 1234567, "date": "2024-01-01", "status": "Received"}
            }))
            .unwrap(),
            &Default::default(),
            &Default::default(),
            &Default::default(),
        );
        let indian = report(&snap).to_table(Grouping::Indian, "₹");
        assert!(indian.contains("₹12,34,567.00"));
        let western = report(&snap).to_table(Grouping::Western, "$");
        assert!(western.contains("$1,234,567.00"));
    }

    #[test]
    fn test_empty_report() {
        let snap = LedgerSnapshot::default();
        let table = project(&[], snap.totals());
        assert!(table.rows().is_empty());
        assert_eq!(table.summary().categories.len(), 4);
        let csv = table.to_csv().unwrap();
        assert!(csv.contains("Completion %,0"));
        assert!(csv.contains("Materials,0,0,0"));
    }
}
