use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical page row, joined with its category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Page {
    pub id: i32,
    pub title: String,
    pub page_slug: String,
    pub category: String,
    pub category_slug: String,
    pub description: String,
    pub address: String,
    pub website: String,
    pub date_created: DateTime<Utc>,
}

/// Input for creating a page. The slug is derived from the title.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPage {
    pub title: String,
    pub category_id: i32,
    pub description: String,
    pub address: String,
    pub website: String,
}

/// Editable fields of an existing page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageUpdate {
    pub description: String,
    pub address: String,
    pub website: String,
}

/// What the search index holds for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedPage {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub title: String,
    pub category: String,
    pub category_slug: String,
    pub page_slug: String,
    pub description: String,
    pub address: String,
}

impl From<&Page> for IndexedPage {
    fn from(page: &Page) -> Self {
        Self {
            object_id: page.id.to_string(),
            title: page.title.clone(),
            category: page.category.clone(),
            category_slug: page.category_slug.clone(),
            page_slug: page.page_slug.clone(),
            description: page.description.clone(),
            address: page.address.clone(),
        }
    }
}
