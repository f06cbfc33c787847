pub mod postgres;

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::models::page::{NewPage, Page, PageUpdate};

/// Read access to every canonical page. Feeds the search index bootstrap.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn list_pages(&self) -> Result<Vec<Page>, StoreError>;
}

/// Page writes in the primary store.
#[async_trait]
pub trait PageRepository: PageSource {
    async fn insert_page(&self, page: &NewPage) -> Result<Page, StoreError>;

    /// Returns `None` when no page has this id.
    async fn update_page(&self, id: i32, update: &PageUpdate) -> Result<Option<Page>, StoreError>;

    /// Returns `false` when no page has this id.
    async fn delete_page(&self, id: i32) -> Result<bool, StoreError>;
}
