use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the ledger home directory and an initial `config.json` that points at `document` and
/// `project_id`.
///
/// # Arguments
/// - `ledger_home` - The directory that will be the ledger home, e.g. `$HOME/ledger`
/// - `document` - The JSON export of the document tree that holds the project records.
/// - `project_id` - The id of the project under `projects/` to report on.
///
/// # Errors
/// - Returns an error if the document does not exist or any file operations fail.
pub async fn init(ledger_home: &Path, document: &Path, project_id: &str) -> Result<Out<()>> {
    let config = Config::create(ledger_home, document, project_id)
        .await
        .context("Unable to create the ledger home directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the ledger config at {} for project '{}'",
        config.config_path().display(),
        config.project_id()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("export.json");
        utils::write(&doc, "{}").await.unwrap();
        let home = dir.path().join("home");

        let out = init(&home, &doc, "p1").await.unwrap();
        assert!(out.message().contains("'p1'"));
        assert!(home.join("config.json").is_file());
    }

    #[tokio::test]
    async fn test_init_missing_document_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = init(&dir.path().join("home"), &dir.path().join("nope.json"), "p1")
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}
