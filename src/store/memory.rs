//! Implements `DocumentStore` over an in-memory document tree.
//!
//! Note: this is compiled even in the production build so that a ledger can be computed from data
//! that is already in memory, without a file on disk.

use crate::error::Res;
use crate::store::{lookup, DocumentStore};
use anyhow::bail;
use serde_json::Value;
use std::collections::BTreeSet;

/// A `DocumentStore` that holds its whole tree in memory. Paths can be marked as failing so that
/// callers can exercise their error handling.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    root: Value,
    failing: BTreeSet<String>,
}

impl MemoryStore {
    pub fn new(root: Value) -> Self {
        Self {
            root,
            failing: BTreeSet::new(),
        }
    }

    /// Makes every read of `path` fail.
    pub fn with_failure(mut self, path: impl Into<String>) -> Self {
        self.failing.insert(path.into());
        self
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Res<Option<Value>> {
        if self.failing.contains(path) {
            bail!("Read of '{path}' failed");
        }
        Ok(lookup(&self.root, path).cloned())
    }
}
