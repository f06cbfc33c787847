use std::sync::Arc;
use tracing::{error, info};

use crate::errors::StoreError;
use crate::models::page::{NewPage, Page, PageUpdate};
use crate::search::sync::IndexSynchronizer;
use crate::search::SearchBackend;
use crate::store::PageRepository;

/// Page writes: the primary store first, then the search index.
///
/// The store is authoritative. A write that reached the store is reported as
/// a success even when indexing it fails; the failure is only logged.
pub struct PageCatalog<R, B> {
    repo: Arc<R>,
    sync: Option<IndexSynchronizer<B, R>>,
}

impl<R, B> Clone for PageCatalog<R, B> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            sync: self.sync.clone(),
        }
    }
}

impl<R: PageRepository, B: SearchBackend> PageCatalog<R, B> {
    pub fn new(repo: Arc<R>, sync: IndexSynchronizer<B, R>) -> Self {
        Self {
            repo,
            sync: Some(sync),
        }
    }

    /// Store-only catalog, used when no search credentials are configured.
    pub fn without_search(repo: Arc<R>) -> Self {
        Self { repo, sync: None }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub async fn create(&self, page: &NewPage) -> Result<Page, StoreError> {
        let created = self.repo.insert_page(page).await?;
        info!(page_id = created.id, slug = %created.page_slug, "page created");

        if let Some(sync) = &self.sync {
            if let Err(e) = sync.add_record(&created).await {
                error!(page_id = created.id, error = %e, "failed to index new page");
            }
        }
        Ok(created)
    }

    pub async fn update(&self, id: i32, update: &PageUpdate) -> Result<Option<Page>, StoreError> {
        let Some(updated) = self.repo.update_page(id, update).await? else {
            return Ok(None);
        };
        info!(page_id = id, "page updated");

        if let Some(sync) = &self.sync {
            if let Err(e) = sync.update_record(&updated).await {
                error!(page_id = id, error = %e, "failed to reindex page");
            }
        }
        Ok(Some(updated))
    }

    pub async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        if !self.repo.delete_page(id).await? {
            return Ok(false);
        }
        info!(page_id = id, "page deleted");

        if let Some(sync) = &self.sync {
            if let Err(e) = sync.delete_record(&id.to_string()).await {
                error!(page_id = id, error = %e, "failed to remove page from index");
            }
        }
        Ok(true)
    }
}
