//! In-memory search service and page store for unit tests.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{IndexInfo, IndexSettings, SearchBackend, TaskId, TaskStatus};
use crate::errors::{StoreError, SyncError};
use crate::models::page::{IndexedPage, NewPage, Page, PageUpdate};
use crate::store::{PageRepository, PageSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListIndexes,
    AddObjects(Vec<String>),
    AddObject(String),
    UpdateObject(String),
    DeleteObject(String),
    SetSettings,
    TaskStatus(u64),
}

impl Call {
    pub fn is_write(&self) -> bool {
        !matches!(self, Call::ListIndexes | Call::TaskStatus(_))
    }
}

#[derive(Default)]
struct State {
    indexes: HashSet<String>,
    records: HashMap<String, IndexedPage>,
    calls: Vec<Call>,
    next_task: u64,
    polls: HashMap<u64, u32>,
    settings: Option<IndexSettings>,
}

/// Records every call. Jobs report `notPublished` `pending_polls` times
/// before they are published.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
    pending_polls: u32,
    fail_on: Option<&'static str>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(self, name: &str) -> Self {
        self.state.lock().unwrap().indexes.insert(name.to_string());
        self
    }

    pub fn with_pending_polls(mut self, polls: u32) -> Self {
        self.pending_polls = polls;
        self
    }

    /// Make the named operation fail with a 500.
    pub fn failing_on(mut self, op: &'static str) -> Self {
        self.fail_on = Some(op);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    pub fn record(&self, object_id: &str) -> Option<IndexedPage> {
        self.state.lock().unwrap().records.get(object_id).cloned()
    }

    pub fn settings(&self) -> Option<IndexSettings> {
        self.state.lock().unwrap().settings.clone()
    }

    fn enter(&self, op: &'static str, call: Call) -> Result<(), SyncError> {
        self.state.lock().unwrap().calls.push(call);
        if self.fail_on == Some(op) {
            return Err(SyncError::Remote {
                status: 500,
                message: format!("{} exploded", op),
            });
        }
        Ok(())
    }

    fn queue(&self, index: &str) -> TaskId {
        let mut state = self.state.lock().unwrap();
        state.indexes.insert(index.to_string());
        state.next_task += 1;
        TaskId(state.next_task)
    }
}

#[async_trait]
impl SearchBackend for FakeBackend {
    async fn list_indexes(&self) -> Result<Vec<IndexInfo>, SyncError> {
        self.enter("list_indexes", Call::ListIndexes)?;
        let state = self.state.lock().unwrap();
        Ok(state
            .indexes
            .iter()
            .map(|name| IndexInfo {
                name: name.clone(),
                entries: state.records.len() as u64,
            })
            .collect())
    }

    async fn add_objects(&self, index: &str, objects: &[IndexedPage]) -> Result<TaskId, SyncError> {
        let ids = objects.iter().map(|o| o.object_id.clone()).collect();
        self.enter("add_objects", Call::AddObjects(ids))?;
        {
            let mut state = self.state.lock().unwrap();
            for o in objects {
                state.records.insert(o.object_id.clone(), o.clone());
            }
        }
        Ok(self.queue(index))
    }

    async fn add_object(&self, index: &str, object: &IndexedPage) -> Result<TaskId, SyncError> {
        self.enter("add_object", Call::AddObject(object.object_id.clone()))?;
        self.state
            .lock()
            .unwrap()
            .records
            .insert(object.object_id.clone(), object.clone());
        Ok(self.queue(index))
    }

    async fn update_object(&self, index: &str, object: &IndexedPage) -> Result<TaskId, SyncError> {
        self.enter("update_object", Call::UpdateObject(object.object_id.clone()))?;
        self.state
            .lock()
            .unwrap()
            .records
            .insert(object.object_id.clone(), object.clone());
        Ok(self.queue(index))
    }

    async fn delete_object(&self, index: &str, object_id: &str) -> Result<TaskId, SyncError> {
        self.enter("delete_object", Call::DeleteObject(object_id.to_string()))?;
        self.state.lock().unwrap().records.remove(object_id);
        Ok(self.queue(index))
    }

    async fn set_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<TaskId, SyncError> {
        self.enter("set_settings", Call::SetSettings)?;
        self.state.lock().unwrap().settings = Some(settings.clone());
        Ok(self.queue(index))
    }

    async fn task_status(&self, _index: &str, task: TaskId) -> Result<TaskStatus, SyncError> {
        self.enter("task_status", Call::TaskStatus(task.0))?;
        let mut state = self.state.lock().unwrap();
        let seen = state.polls.entry(task.0).or_insert(0);
        *seen += 1;
        if *seen > self.pending_polls {
            Ok(TaskStatus::Published)
        } else {
            Ok(TaskStatus::NotPublished)
        }
    }
}

pub fn page(id: i32, title: &str) -> Page {
    Page {
        id,
        title: title.to_string(),
        page_slug: crate::util::gen_slug(title),
        category: "Health".into(),
        category_slug: "health".into(),
        description: format!("About {}", title),
        address: String::new(),
        website: String::new(),
        date_created: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

/// Page store backed by a vector.
#[derive(Default)]
pub struct FakeStore {
    pages: Mutex<Vec<Page>>,
    broken: bool,
}

impl FakeStore {
    pub fn with_pages(pages: Vec<Page>) -> Self {
        Self {
            pages: Mutex::new(pages),
            broken: false,
        }
    }

    /// Every call fails.
    pub fn broken() -> Self {
        Self {
            pages: Mutex::new(Vec::new()),
            broken: true,
        }
    }

    pub fn pages(&self) -> Vec<Page> {
        self.pages.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.broken {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl PageSource for FakeStore {
    async fn list_pages(&self) -> Result<Vec<Page>, StoreError> {
        self.check()?;
        Ok(self.pages())
    }
}

#[async_trait]
impl PageRepository for FakeStore {
    async fn insert_page(&self, new: &NewPage) -> Result<Page, StoreError> {
        self.check()?;
        let mut pages = self.pages.lock().unwrap();
        let slug = crate::util::gen_slug(&new.title);
        if slug.is_empty() {
            return Err(StoreError::InvalidTitle);
        }
        if pages.iter().any(|p| p.page_slug == slug) {
            return Err(StoreError::PageAlreadyExists);
        }
        let id = pages.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let mut created = page(id, &new.title);
        created.description = new.description.clone();
        created.address = new.address.clone();
        created.website = new.website.clone();
        pages.push(created.clone());
        Ok(created)
    }

    async fn update_page(&self, id: i32, update: &PageUpdate) -> Result<Option<Page>, StoreError> {
        self.check()?;
        let mut pages = self.pages.lock().unwrap();
        Ok(pages.iter_mut().find(|p| p.id == id).map(|p| {
            p.description = update.description.clone();
            p.address = update.address.clone();
            p.website = update.website.clone();
            p.clone()
        }))
    }

    async fn delete_page(&self, id: i32) -> Result<bool, StoreError> {
        self.check()?;
        let mut pages = self.pages.lock().unwrap();
        let before = pages.len();
        pages.retain(|p| p.id != id);
        Ok(pages.len() < before)
    }
}
