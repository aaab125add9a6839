//! Configuration file handling for the ledger.
//!
//! The configuration file is stored at `$LEDGER_HOME/config.json` and names the document export
//! to read, the project to report on, and how amounts are presented.

use crate::error::{ErrorType, IntoResult, Res};
use crate::model::Grouping;
use crate::store::JsonFileStore;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "ledger";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$LEDGER_HOME` and from there it loads `$LEDGER_HOME/config.json`. It provides the
/// resolved location of the document export and the presentation settings.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    document_path: PathBuf,
}

impl Config {
    /// Creates the ledger home directory and an initial `config.json` in it.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the ledger home, e.g. `$HOME/ledger`
    /// - `document` - A JSON export of the document tree that holds the project records. It is
    ///   stored in the config as an absolute path.
    /// - `project_id` - The id of the project under `projects/` to report on.
    ///
    /// # Errors
    /// - Returns an error if `document` is not a file, `project_id` is blank, or any file
    ///   operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        document: &Path,
        project_id: &str,
    ) -> Res<Self> {
        let project_id = project_id.trim();
        if project_id.is_empty() {
            bail!("The project id cannot be blank");
        }
        if !utils::is_file(document).await {
            bail!("The document file '{}' does not exist", document.display());
        }
        let document_path = utils::canonicalize(document).await?;

        // Create the directory if it does not exist
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the ledger home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);

        let config_file = ConfigFile {
            document_path: document_path.clone(),
            project_id: project_id.to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            document_path,
        })
    }

    /// This will
    /// - validate that the `ledger_home` exists and that the config file exists
    /// - load the config file
    /// - return the loaded configuration object
    ///
    /// The document file itself is not opened until the store is first read.
    pub async fn load(ledger_home: impl Into<PathBuf>) -> Result<Self> {
        Self::read(ledger_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn read(maybe_relative: PathBuf) -> Res<Self> {
        if !utils::is_dir(&maybe_relative).await {
            bail!(
                "The ledger home directory '{}' is missing, run 'ledger init' first",
                maybe_relative.display()
            );
        }
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if !utils::is_file(&config_path).await {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let document_path = resolve(&root, &config_file.document_path);

        Ok(Self {
            root,
            config_path,
            config_file,
            document_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The document export, resolved against the home directory if it was stored as a relative
    /// path.
    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    pub fn project_id(&self) -> &str {
        &self.config_file.project_id
    }

    pub fn currency_symbol(&self) -> &str {
        &self.config_file.currency_symbol
    }

    pub fn grouping(&self) -> Grouping {
        self.config_file.grouping
    }

    /// Replaces the configured grouping for this run only. The config file is not changed.
    pub fn with_grouping(mut self, grouping: Option<Grouping>) -> Self {
        if let Some(grouping) = grouping {
            self.config_file.grouping = grouping;
        }
        self
    }

    /// Opens the document store named by the config.
    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.document_path)
    }

    /// The default export destination for a project, `{project name}_BalanceSheet.csv` in the
    /// home directory.
    pub fn default_export_path(&self, project_name: &str) -> PathBuf {
        self.root
            .join(format!("{}_BalanceSheet.csv", file_name_safe(project_name)))
    }
}

/// Returns `p` unchanged if it is absolute, otherwise joins it to `root`.
fn resolve(root: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        return p.to_path_buf();
    }
    root.join(p)
}

/// Replaces characters that cannot appear in a file name.
fn file_name_safe(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "ledger",
///   "config_version": 1,
///   "document_path": "/home/me/exports/projects.json",
///   "project_id": "-NqR7x2c9kLm",
///   "currency_symbol": "₹",
///   "grouping": "indian"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "ledger"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Path to the JSON export of the document tree (relative to the home directory or absolute)
    document_path: PathBuf,

    /// The project under `projects/` to report on
    project_id: String,

    /// Prefix for displayed amounts
    #[serde(default = "default_currency_symbol")]
    currency_symbol: String,

    /// Digit grouping for displayed amounts
    #[serde(default)]
    grouping: Grouping,
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            document_path: PathBuf::new(),
            project_id: String::new(),
            currency_symbol: default_currency_symbol(),
            grouping: Grouping::default(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it is not a ledger config.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version == CONFIG_VERSION,
            "Unsupported config_version {} in config file, expected {}",
            config.config_version,
            CONFIG_VERSION
        );
        anyhow::ensure!(
            !config.project_id.trim().is_empty(),
            "The config file at {} has a blank project_id",
            path.display()
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn document(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("export.json");
        utils::write(&path, r#"{"projects": {}}"#).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("ledger_home");
        let doc = document(&dir).await;

        let config = Config::create(&home_dir, &doc, " p1 ").await.unwrap();

        assert_eq!(config.project_id(), "p1");
        assert_eq!(config.currency_symbol(), "₹");
        assert_eq!(config.grouping(), Grouping::Indian);
        assert!(config.document_path().is_absolute());
        assert!(config.config_path().is_file());
        assert!(config.root().is_dir());
    }

    #[tokio::test]
    async fn test_config_create_then_load() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("home");
        let doc = document(&dir).await;
        let created = Config::create(&home_dir, &doc, "p1").await.unwrap();
        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(created.config_file, loaded.config_file);
        assert_eq!(created.document_path(), loaded.document_path());
        assert_eq!(created.root(), loaded.root());
    }

    #[tokio::test]
    async fn test_config_create_missing_document() {
        let dir = TempDir::new().unwrap();
        let result = Config::create(dir.path().join("home"), &dir.path().join("nope.json"), "p1")
            .await;
        assert!(result.is_err());
        assert!(!dir.path().join("home").exists());
    }

    #[tokio::test]
    async fn test_config_create_blank_project() {
        let dir = TempDir::new().unwrap();
        let doc = document(&dir).await;
        assert!(Config::create(dir.path().join("home"), &doc, "  ")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert!(err.to_string().contains("ledger init"));
    }

    #[tokio::test]
    async fn test_load_minimal_config_with_relative_document() {
        let dir = TempDir::new().unwrap();
        let json = r#"{
            "app_name": "ledger",
            "config_version": 1,
            "document_path": "data/export.json",
            "project_id": "p9"
        }"#;
        utils::write(dir.path().join(CONFIG_JSON), json)
            .await
            .unwrap();

        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(config.currency_symbol(), "₹");
        assert_eq!(config.grouping(), Grouping::Indian);
        assert_eq!(
            config.document_path(),
            config.root().join("data").join("export.json")
        );
    }

    #[tokio::test]
    async fn test_load_rejects_other_app() {
        let dir = TempDir::new().unwrap();
        let json = r#"{
            "app_name": "invoicing",
            "config_version": 1,
            "document_path": "x.json",
            "project_id": "p9"
        }"#;
        utils::write(dir.path().join(CONFIG_JSON), json)
            .await
            .unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(format!("{err:#}").contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let original = ConfigFile {
            document_path: PathBuf::from("/tmp/export.json"),
            project_id: "abc".to_string(),
            currency_symbol: "$".to_string(),
            grouping: Grouping::Western,
            ..ConfigFile::default()
        };
        original.save(&path).await.unwrap();
        let loaded = ConfigFile::load(&path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_default_export_path() {
        let config = Config {
            root: PathBuf::from("/home/me/ledger"),
            config_path: PathBuf::from("/home/me/ledger/config.json"),
            config_file: ConfigFile::default(),
            document_path: PathBuf::from("/x.json"),
        };
        assert_eq!(
            config.default_export_path("Tower A/B"),
            PathBuf::from("/home/me/ledger/Tower A_B_BalanceSheet.csv")
        );
    }
}
