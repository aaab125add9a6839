//! Read access to the hierarchical document store that holds project records.
//!
//! The store is addressed by slash-separated paths such as `projects/p1/sites`. A path that does
//! not exist reads as `None`, which callers treat as an empty collection.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::attendance::{attendance_key, AttendanceDay};
use crate::error::Res;
use crate::ledger::LedgerSources;
use crate::model::{Category, GeneralPayments, ParentRecords};
use anyhow::Context;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

/// A read-only view of a document tree.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns the value at `path`, or `None` if nothing is stored there.
    async fn get(&self, path: &str) -> Res<Option<Value>>;
}

/// The path of a project record.
pub fn project_path(project_id: &str) -> String {
    format!("projects/{project_id}")
}

/// Fetches the four payment collections of a project concurrently.
///
/// Either all four collections are returned or an error is. A collection that is absent from the
/// store is empty; a collection that fails to load or is not a collection at all fails the whole
/// fetch. A single payment that is not a document does not fail the fetch, it is rejected during
/// normalization.
pub async fn fetch_sources(store: &dyn DocumentStore, project_id: &str) -> Res<LedgerSources> {
    let base = project_path(project_id);
    let general_path = format!("{base}/{}", Category::General.collection());
    let sites_path = format!("{base}/{}", Category::Sites.collection());
    let workers_path = format!("{base}/{}", Category::Workers.collection());
    let materials_path = format!("{base}/{}", Category::Materials.collection());

    let (general, sites, workers, materials) = tokio::try_join!(
        fetch_collection::<GeneralPayments>(store, &general_path),
        fetch_collection::<ParentRecords>(store, &sites_path),
        fetch_collection::<ParentRecords>(store, &workers_path),
        fetch_collection::<ParentRecords>(store, &materials_path),
    )
    .with_context(|| format!("Unable to fetch the payment collections of project '{project_id}'"))?;

    debug!(
        "Fetched project '{project_id}': {} general payments, {} sites, {} workers, {} materials",
        general.len(),
        sites.len(),
        workers.len(),
        materials.len()
    );

    Ok(LedgerSources {
        general,
        sites,
        workers,
        materials,
    })
}

/// Fetches the display name of a project, falling back to its id when the name is absent or blank.
pub async fn fetch_project_name(store: &dyn DocumentStore, project_id: &str) -> Res<String> {
    let path = format!("{}/name", project_path(project_id));
    let name = store
        .get(&path)
        .await
        .with_context(|| format!("Unable to fetch '{path}'"))?;
    Ok(match name {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => project_id.to_string(),
    })
}

/// Fetches the workers collection of a project.
pub async fn fetch_workers(store: &dyn DocumentStore, project_id: &str) -> Res<ParentRecords> {
    let path = format!(
        "{}/{}",
        project_path(project_id),
        Category::Workers.collection()
    );
    fetch_collection(store, &path).await
}

/// Fetches the attendance marks recorded for `date`.
pub async fn fetch_attendance(
    store: &dyn DocumentStore,
    project_id: &str,
    date: NaiveDate,
) -> Res<AttendanceDay> {
    let path = format!(
        "{}/attendance/{}",
        project_path(project_id),
        attendance_key(date)
    );
    fetch_collection(store, &path).await
}

/// Reads `path` and deserializes it. An absent or `null` value is `T::default()`.
async fn fetch_collection<T>(store: &dyn DocumentStore, path: &str) -> Res<T>
where
    T: DeserializeOwned + Default,
{
    trace!("Fetching '{path}'");
    match store
        .get(path)
        .await
        .with_context(|| format!("Unable to fetch '{path}'"))?
    {
        None | Some(Value::Null) => {
            trace!("'{path}' is absent, treating it as empty");
            Ok(T::default())
        }
        Some(value) => serde_json::from_value(value)
            .with_context(|| format!("The data at '{path}' is not in the expected format")),
    }
}

/// Walks `path` from `root`. Empty segments are ignored, so leading and trailing slashes do not
/// matter.
pub(crate) fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .try_fold(root, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}
