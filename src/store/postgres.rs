use async_trait::async_trait;
use sqlx::PgPool;

use super::{PageRepository, PageSource};
use crate::errors::StoreError;
use crate::models::page::{NewPage, Page, PageUpdate};
use crate::util::gen_slug;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // -- Page Operations --

    pub async fn list_pages(&self) -> Result<Vec<Page>, StoreError> {
        let rows = sqlx::query_as::<_, Page>(
            r#"SELECT p.id, p.title, p.page_slug, c.name AS category, c.slug AS category_slug,
                      p.description, p.address, p.website, p.date_created
               FROM pages p
               JOIN categories c ON c.id = p.category_id
               ORDER BY p.id ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn insert_page(&self, page: &NewPage) -> Result<Page, StoreError> {
        let slug = gen_slug(&page.title);
        if slug.is_empty() {
            return Err(StoreError::InvalidTitle);
        }

        let row = sqlx::query_as::<_, Page>(
            r#"WITH p AS (
                   INSERT INTO pages (title, page_slug, category_id, description, address, website)
                   VALUES ($1, $2, $3, $4, $5, $6)
                   RETURNING id, title, page_slug, category_id, description, address, website, date_created
               )
               SELECT p.id, p.title, p.page_slug, c.name AS category, c.slug AS category_slug,
                      p.description, p.address, p.website, p.date_created
               FROM p
               JOIN categories c ON c.id = p.category_id"#,
        )
        .bind(page.title.trim())
        .bind(&slug)
        .bind(page.category_id)
        .bind(&page.description)
        .bind(&page.address)
        .bind(&page.website)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, page.category_id))?;

        Ok(row)
    }

    pub async fn update_page(
        &self,
        id: i32,
        update: &PageUpdate,
    ) -> Result<Option<Page>, StoreError> {
        let row = sqlx::query_as::<_, Page>(
            r#"WITH p AS (
                   UPDATE pages SET description = $2, address = $3, website = $4
                   WHERE id = $1
                   RETURNING id, title, page_slug, category_id, description, address, website, date_created
               )
               SELECT p.id, p.title, p.page_slug, c.name AS category, c.slug AS category_slug,
                      p.description, p.address, p.website, p.date_created
               FROM p
               JOIN categories c ON c.id = p.category_id"#,
        )
        .bind(id)
        .bind(&update.description)
        .bind(&update.address)
        .bind(&update.website)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_page(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn write_error(e: sqlx::Error, category_id: i32) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StoreError::PageAlreadyExists;
        }
        if db.is_foreign_key_violation() {
            return StoreError::UnknownCategory(category_id);
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl PageSource for PgStore {
    async fn list_pages(&self) -> Result<Vec<Page>, StoreError> {
        PgStore::list_pages(self).await
    }
}

#[async_trait]
impl PageRepository for PgStore {
    async fn insert_page(&self, page: &NewPage) -> Result<Page, StoreError> {
        PgStore::insert_page(self, page).await
    }

    async fn update_page(&self, id: i32, update: &PageUpdate) -> Result<Option<Page>, StoreError> {
        PgStore::update_page(self, id, update).await
    }

    async fn delete_page(&self, id: i32) -> Result<bool, StoreError> {
        PgStore::delete_page(self, id).await
    }
}
