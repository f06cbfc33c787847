//! Algolia REST client.
//!
//! Only the index-management calls the synchronizer needs. Authenticates
//! with the application id and admin API key headers; every write answers
//! with a `taskID` that is polled through the task endpoint.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use zeroize::Zeroizing;

use super::{check_object_id, IndexInfo, IndexSettings, SearchBackend, TaskId, TaskStatus};
use crate::config::SearchCredentials;
use crate::errors::SyncError;
use crate::models::page::IndexedPage;

const APP_ID_HEADER: &str = "x-algolia-application-id";
const API_KEY_HEADER: &str = "x-algolia-api-key";

pub struct AlgoliaClient {
    http: Client,
    base_url: Url,
    app_id: String,
    api_key: Zeroizing<String>,
}

impl std::fmt::Debug for AlgoliaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgoliaClient")
            .field("base_url", &self.base_url.as_str())
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

impl AlgoliaClient {
    /// Client for the hosted service at `https://{app_id}.algolia.net`.
    pub fn new(app_id: &str, api_key: &str) -> Result<Self, SyncError> {
        let base = format!("https://{}.algolia.net", app_id);
        Self::with_base_url(app_id, api_key, &base)
    }

    /// Client against an arbitrary host, e.g. a local mock.
    pub fn with_base_url(app_id: &str, api_key: &str, base_url: &str) -> Result<Self, SyncError> {
        if app_id.is_empty() || api_key.is_empty() {
            return Err(SyncError::MissingCredentials);
        }

        let base_url = Url::parse(base_url)
            .map_err(|e| SyncError::InvalidEndpoint(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::InvalidEndpoint(base_url.to_string()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("directory/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            app_id: app_id.to_string(),
            api_key: Zeroizing::new(api_key.to_string()),
        })
    }

    /// Build from configuration. Fails before any I/O when the admin
    /// credentials are missing.
    pub fn from_credentials(creds: &SearchCredentials) -> Result<Self, SyncError> {
        let (app_id, api_key) = creds.admin().ok_or(SyncError::MissingCredentials)?;
        Self::new(app_id, api_key)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SyncError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::InvalidEndpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(APP_ID_HEADER, &self.app_id)
            .header(API_KEY_HEADER, self.api_key.as_str())
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, SyncError> {
        let resp = req.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            tracing::debug!(status = %status, reason = %message, "search service rejected request");
            return Err(SyncError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let snippet: String = body.chars().take(200).collect();
            SyncError::Decode(format!("{} (body: {})", e, snippet))
        })
    }

    async fn task<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<TaskId, SyncError> {
        let mut req = self.request(method, self.endpoint(segments)?);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp: TaskResponse = self.send(req).await?;
        Ok(TaskId(resp.task_id))
    }
}

#[async_trait]
impl SearchBackend for AlgoliaClient {
    async fn list_indexes(&self) -> Result<Vec<IndexInfo>, SyncError> {
        let mut all = Vec::new();
        let mut page = 0u32;

        loop {
            let mut url = self.endpoint(&["1", "indexes"])?;
            url.query_pairs_mut().append_pair("page", &page.to_string());

            let resp: ListIndexesResponse = self.send(self.request(Method::GET, url)).await?;
            all.extend(resp.items);

            page += 1;
            if page >= resp.nb_pages {
                break;
            }
        }

        Ok(all)
    }

    async fn add_objects(&self, index: &str, objects: &[IndexedPage]) -> Result<TaskId, SyncError> {
        for object in objects {
            check_object_id(&object.object_id)?;
        }
        let batch = BatchRequest {
            requests: objects
                .iter()
                .map(|body| BatchOperation {
                    action: "addObject",
                    body,
                })
                .collect(),
        };
        self.task(Method::POST, &["1", "indexes", index, "batch"], Some(&batch))
            .await
    }

    async fn add_object(&self, index: &str, object: &IndexedPage) -> Result<TaskId, SyncError> {
        self.add_objects(index, std::slice::from_ref(object)).await
    }

    async fn update_object(&self, index: &str, object: &IndexedPage) -> Result<TaskId, SyncError> {
        check_object_id(&object.object_id)?;
        self.task(
            Method::PUT,
            &["1", "indexes", index, object.object_id.as_str()],
            Some(object),
        )
        .await
    }

    async fn delete_object(&self, index: &str, object_id: &str) -> Result<TaskId, SyncError> {
        check_object_id(object_id)?;
        self.task::<()>(Method::DELETE, &["1", "indexes", index, object_id], None)
            .await
    }

    async fn set_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<TaskId, SyncError> {
        self.task(
            Method::PUT,
            &["1", "indexes", index, "settings"],
            Some(settings),
        )
        .await
    }

    async fn task_status(&self, index: &str, task: TaskId) -> Result<TaskStatus, SyncError> {
        let task_id = task.0.to_string();
        let url = self.endpoint(&["1", "indexes", index, "task", task_id.as_str()])?;
        let resp: TaskStatusResponse = self.send(self.request(Method::GET, url)).await?;
        Ok(match resp.status.as_str() {
            "published" => TaskStatus::Published,
            _ => TaskStatus::NotPublished,
        })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct TaskResponse {
    #[serde(rename = "taskID")]
    task_id: u64,
}

#[derive(Deserialize)]
struct TaskStatusResponse {
    status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListIndexesResponse {
    #[serde(default)]
    items: Vec<IndexInfo>,
    #[serde(default)]
    nb_pages: u32,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    requests: Vec<BatchOperation<'a>>,
}

#[derive(Serialize)]
struct BatchOperation<'a> {
    action: &'static str,
    body: &'a IndexedPage,
}

// ── Tests ──────────────────────────────────────────────────────
