//! Implements `DocumentStore` over a JSON export of the whole document tree.

use crate::error::Res;
use crate::store::{lookup, DocumentStore};
use crate::utils;
use anyhow::Context;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::{debug, trace};

/// A `DocumentStore` backed by a JSON file. The file is read once, on first access, and every
/// later read is served from memory.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    root: OnceCell<Value>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            root: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn root(&self) -> Res<&Value> {
        self.root
            .get_or_try_init(|| async {
                debug!("Loading document tree from {}", self.path.display());
                let content = utils::read(&self.path).await?;
                serde_json::from_str::<Value>(&content).with_context(|| {
                    format!("The document file {} is not valid JSON", self.path.display())
                })
            })
            .await
    }
}

#[async_trait::async_trait]
impl DocumentStore for JsonFileStore {
    async fn get(&self, path: &str) -> Res<Option<Value>> {
        trace!("get for {path}");
        let root = self.root().await?;
        Ok(lookup(root, path).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_get() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.json");
        let tree = json!({"projects": {"p1": {"name": "Tower", "sites": {}}}});
        utils::write(&path, tree.to_string()).await.unwrap();

        let store = JsonFileStore::new(&path);
        assert_eq!(store.path(), path.as_path());
        assert_eq!(
            store.get("projects/p1/name").await.unwrap(),
            Some(json!("Tower"))
        );
        assert_eq!(store.get("projects/p1/sites").await.unwrap(), Some(json!({})));
        assert_eq!(store.get("projects/p2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_is_read_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.json");
        utils::write(&path, r#"{"a": 1}"#).await.unwrap();

        let store = JsonFileStore::new(&path);
        assert_eq!(store.get("a").await.unwrap(), Some(json!(1)));
        tokio::fs::remove_file(&path).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nope.json"));
        assert!(store.get("projects").await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.json");
        utils::write(&path, "{ not json").await.unwrap();
        let store = JsonFileStore::new(&path);
        let err = store.get("projects").await.unwrap_err();
        assert!(format!("{err:#}").contains("not valid JSON"));
    }
}
