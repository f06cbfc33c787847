use thiserror::Error;

/// Failures talking to the search service or feeding it.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("missing search service credentials")]
    MissingCredentials,

    #[error("export aborted: {0}")]
    ExportAborted(Box<SyncError>),

    #[error("invalid object id: {0:?}")]
    InvalidObjectId(String),

    #[error("invalid search service endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search service returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("unexpected search service response: {0}")]
    Decode(String),

    #[error("task {task_id} not published after {attempts} polls")]
    TaskTimeout { task_id: u64, attempts: u32 },

    #[error("page store error: {0}")]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Wrap a bootstrap step failure.
    pub fn aborted(cause: SyncError) -> Self {
        match cause {
            already @ SyncError::ExportAborted(_) => already,
            other => SyncError::ExportAborted(Box::new(other)),
        }
    }
}

/// Failures issuing a secret link.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("server secret is empty")]
    EmptySecret,

    #[error("invalid key derivation parameters: {0}")]
    InvalidParams(String),

    #[error("key derivation failed: {0}")]
    Derivation(String),
}

/// Failures in the primary page store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a page with this category and title already exists")]
    PageAlreadyExists,

    #[error("invalid page title")]
    InvalidTitle,

    #[error("unknown category: {0}")]
    UnknownCategory(i32),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
