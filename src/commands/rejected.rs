use crate::commands::{load, Out};
use crate::model::RejectedEntry;
use crate::{Config, Result};

/// Lists the payments that were excluded from totals, with the reasons.
///
/// Payments with an unreadable amount are missing from the ledger entirely. Payments with an
/// unreadable date are still listed by `ledger list`, after all dated payments.
pub async fn rejected(config: Config) -> Result<Out<Vec<RejectedEntry>>> {
    let loaded = load(&config).await?;
    let rejected = loaded.snapshot.rejected().to_vec();
    if rejected.is_empty() {
        return Ok(Out::new(
            "Every payment was read successfully, none are excluded from totals",
            rejected,
        ));
    }

    let mut message = format!("{} payments are excluded from totals:", rejected.len());
    for entry in &rejected {
        let owner = match entry.parent_name() {
            Some(name) => format!("{} '{name}'", entry.category()),
            None => entry.category().to_string(),
        };
        let kept = if entry.is_dropped() {
            "not listed"
        } else {
            "listed last"
        };
        message.push_str(&format!(
            "\n  {owner} payment '{}': {} ({kept})",
            entry.id(),
            entry.reasons()
        ));
    }
    Ok(Out::new(message, rejected))
}
