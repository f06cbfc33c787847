//! Keeps the hosted search index of pages in line with the primary store.
//!
//! The primary store stays the source of truth. The index is populated once
//! when it does not exist yet (bootstrap) and then patched record by record
//! as pages change. Nothing here is transactional with the store: a crash
//! between a page write and its sync call leaves the index stale, and the
//! bootstrap only repairs a missing index, not a stale one.

pub mod algolia;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::SyncError;
use crate::models::page::IndexedPage;

/// Name of the index holding page records.
pub const PAGES_INDEX: &str = "Pages";

/// An empty id would address the index itself rather than one record.
pub(crate) fn check_object_id(object_id: &str) -> Result<(), SyncError> {
    if object_id.is_empty() {
        return Err(SyncError::InvalidObjectId(object_id.to_string()));
    }
    Ok(())
}

/// Handle for an asynchronous job on the search service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Published,
    NotPublished,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    #[serde(default)]
    pub entries: u64,
}

/// Index configuration applied after the bootstrap export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSettings {
    pub searchable_attributes: Vec<String>,
    pub ranking: Vec<String>,
}

impl IndexSettings {
    /// Search titles and categories; break relevance ties by title, then category.
    pub fn pages() -> Self {
        Self {
            searchable_attributes: vec!["title".into(), "category".into()],
            ranking: vec!["words".into(), "desc(title)".into(), "desc(category)".into()],
        }
    }
}

/// Operations the synchronizer needs from a search service.
///
/// Every mutating call returns the id of the job it queued; the job is done
/// once [`SearchBackend::task_status`] reports it published.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn list_indexes(&self) -> Result<Vec<IndexInfo>, SyncError>;

    /// Bulk insert in a single request. Creates the index if needed.
    async fn add_objects(&self, index: &str, objects: &[IndexedPage]) -> Result<TaskId, SyncError>;

    async fn add_object(&self, index: &str, object: &IndexedPage) -> Result<TaskId, SyncError>;

    /// Replace the record with the same `objectID`, creating it if absent.
    async fn update_object(&self, index: &str, object: &IndexedPage) -> Result<TaskId, SyncError>;

    async fn delete_object(&self, index: &str, object_id: &str) -> Result<TaskId, SyncError>;

    async fn set_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<TaskId, SyncError>;

    async fn task_status(&self, index: &str, task: TaskId) -> Result<TaskStatus, SyncError>;
}
