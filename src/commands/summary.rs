use crate::commands::{load, Out};
use crate::ledger::LedgerTotals;
use crate::model::{format_grouped, Category};
use crate::{Config, Result};
use rust_decimal::Decimal;
use serde::Serialize;

/// The structured output of `ledger summary`.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub project_id: String,
    pub project_name: String,
    /// The number of entries in the ledger, including those flagged with an invalid date.
    pub entries: usize,
    /// The number of payments excluded from totals.
    pub rejected: usize,
    pub totals: LedgerTotals,
}

/// Builds the ledger and reports its grand totals, completion percentage and per-category totals.
pub async fn summary(config: Config) -> Result<Out<Summary>> {
    let loaded = load(&config).await?;
    let snapshot = loaded.snapshot;
    let totals = snapshot.totals();
    let money = |value: Decimal| {
        format!(
            "{}{}",
            config.currency_symbol(),
            format_grouped(value, config.grouping())
        )
    };

    let grand = totals.grand();
    let mut lines = vec![
        format!("Balance sheet for {}", loaded.project_name),
        format!("  Total Amount: {}", money(grand.total())),
        format!("  Received:     {}", money(grand.received())),
        format!("  Pending:      {}", money(grand.pending())),
        format!("  Completion:   {}%", totals.completion_percentage()),
    ];
    lines.extend(Category::ALL.into_iter().map(|category| {
        let c = totals.category(category);
        format!(
            "  {category}: {} total ({} received, {} pending)",
            money(c.total()),
            money(c.received()),
            money(c.pending())
        )
    }));
    let mut counts = format!(
        "  {} payments, {} excluded from totals",
        snapshot.entries().len(),
        snapshot.rejected().len()
    );
    if !snapshot.rejected().is_empty() {
        counts.push_str(" (run 'ledger rejected' for details)");
    }
    lines.push(counts);
    let message = lines.join("\n");

    Ok(Out::new(
        message,
        Summary {
            project_id: config.project_id().to_string(),
            project_name: loaded.project_name,
            entries: snapshot.entries().len(),
            rejected: snapshot.rejected().len(),
            totals: totals.clone(),
        },
    ))
}
