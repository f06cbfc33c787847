use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::{check_object_id, IndexSettings, SearchBackend, TaskId, TaskStatus, PAGES_INDEX};
use crate::errors::SyncError;
use crate::models::page::{IndexedPage, Page};
use crate::store::PageSource;

/// How long to wait for a job on the search service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Status checks before giving up. At least one check is always made.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(250),
            max_attempts: 240,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The index already existed; nothing was written.
    AlreadyPresent,
    Exported { records: usize },
}

/// Mirrors page writes into the search index.
///
/// Every operation waits for the search service to publish its job before
/// returning and fails fast: nothing is retried. Callers treat failures as
/// non-fatal and log them.
pub struct IndexSynchronizer<B, S> {
    backend: Arc<B>,
    source: Arc<S>,
    index: String,
    poll: PollPolicy,
}

impl<B, S> Clone for IndexSynchronizer<B, S> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            source: Arc::clone(&self.source),
            index: self.index.clone(),
            poll: self.poll,
        }
    }
}

impl<B: SearchBackend, S: PageSource> IndexSynchronizer<B, S> {
    pub fn new(backend: Arc<B>, source: Arc<S>) -> Self {
        Self {
            backend,
            source,
            index: PAGES_INDEX.to_string(),
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    /// Export every page when the index does not exist yet.
    ///
    /// Only the existence of the index is checked, not its contents.
    pub async fn bootstrap_if_absent(&self) -> Result<BootstrapOutcome, SyncError> {
        self.bootstrap().await.map_err(SyncError::aborted)
    }

    async fn bootstrap(&self) -> Result<BootstrapOutcome, SyncError> {
        let indexes = self.backend.list_indexes().await?;
        if indexes.iter().any(|i| i.name == self.index) {
            debug!(index = %self.index, "search index present, skipping export");
            return Ok(BootstrapOutcome::AlreadyPresent);
        }

        info!(index = %self.index, "exporting page records to search index");

        let pages = self.source.list_pages().await?;
        let records: Vec<IndexedPage> = pages.iter().map(IndexedPage::from).collect();

        let task = self.backend.add_objects(&self.index, &records).await?;
        self.wait_for_task(task).await?;

        let task = self
            .backend
            .set_settings(&self.index, &IndexSettings::pages())
            .await?;
        self.wait_for_task(task).await?;

        info!(index = %self.index, records = records.len(), "finished export");
        Ok(BootstrapOutcome::Exported {
            records: records.len(),
        })
    }

    pub async fn add_record(&self, page: &Page) -> Result<(), SyncError> {
        let record = IndexedPage::from(page);
        check_object_id(&record.object_id)?;
        let task = self.backend.add_object(&self.index, &record).await?;
        self.wait_for_task(task).await?;
        debug!(index = %self.index, page_id = page.id, "indexed new page");
        Ok(())
    }

    /// Upsert by `objectID`.
    pub async fn update_record(&self, page: &Page) -> Result<(), SyncError> {
        let record = IndexedPage::from(page);
        check_object_id(&record.object_id)?;
        let task = self.backend.update_object(&self.index, &record).await?;
        self.wait_for_task(task).await?;
        debug!(index = %self.index, page_id = page.id, "reindexed page");
        Ok(())
    }

    /// Rejects an empty `object_id` before any request is made.
    pub async fn delete_record(&self, object_id: &str) -> Result<(), SyncError> {
        check_object_id(object_id)?;
        let task = self.backend.delete_object(&self.index, object_id).await?;
        self.wait_for_task(task).await?;
        debug!(index = %self.index, object_id, "removed page from index");
        Ok(())
    }

    async fn wait_for_task(&self, task: TaskId) -> Result<(), SyncError> {
        let attempts = self.poll.max_attempts.max(1);

        for attempt in 1..=attempts {
            match self.backend.task_status(&self.index, task).await? {
                TaskStatus::Published => {
                    debug!(index = %self.index, task = %task, attempt, "search task published");
                    return Ok(());
                }
                TaskStatus::NotPublished if attempt < attempts => {
                    tokio::time::sleep(self.poll.interval).await;
                }
                TaskStatus::NotPublished => {}
            }
        }

        Err(SyncError::TaskTimeout {
            task_id: task.0,
            attempts,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────
