//! Command handlers for the ledger CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod attendance;
mod init;
mod list;
mod rejected;
mod summary;

use crate::error::{ErrorType, IntoResult};
use crate::ledger::LedgerSnapshot;
use crate::store::{fetch_project_name, fetch_sources};
use crate::Config;
use crate::Result;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use attendance::attendance;
pub use init::init;
pub use list::{export, list, Exported, Rows};
pub use rejected::rejected;
pub use summary::{summary, Summary};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// The project's display name and its freshly built snapshot.
struct Loaded {
    project_name: String,
    snapshot: LedgerSnapshot,
}

/// Reads the project name and the four payment collections, then builds the snapshot. If any read
/// fails no snapshot is built.
async fn load(config: &Config) -> Result<Loaded> {
    let store = config.store();
    let project_id = config.project_id();
    let (project_name, sources) = tokio::try_join!(
        fetch_project_name(&store, project_id),
        fetch_sources(&store, project_id),
    )
    .pub_result(ErrorType::Store)?;
    Ok(Loaded {
        project_name,
        snapshot: sources.build_snapshot(),
    })
}
