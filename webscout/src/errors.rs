//! Error types for webscout.
//!
//! Errors fall into two groups:
//!
//! 1. **Task-local** errors ([`ScoutError::FetchFailure`], [`ScoutError::StreamRead`])
//!    abandon a single URL. The worker reports them and moves on; they never
//!    reach the aggregate total.
//! 2. **Everything else** is raised before or around the pool itself, e.g. a
//!    configuration error, which stops the process before any worker starts.
//!
//! ```rust,ignore
//! match matcher.count(body) {
//!     Ok(count) => results.send(TaskCount { count }),
//!     Err(e) if e.is_task_local() => report.task_failed(url, &e),
//!     Err(e) => return Err(e),
//! }
//! ```
use thiserror::Error;

/// Result type for webscout operations
pub type ScoutResult<T> = Result<T, ScoutError>;

/// Errors that can occur while configuring or running the pool
#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Fetch failed for {url}: {message}")]
    FetchFailure { url: String, message: String },
    #[error("Stream read failed: {0}")]
    StreamRead(#[source] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("Worker roster is closed")]
    RosterClosed,
    #[error("Pool thread panicked: {0}")]
    ThreadPanicked(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ScoutError {
    pub fn fetch_failure(url: impl Into<String>, message: impl ToString) -> Self {
        Self::FetchFailure {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn stream_read(source: std::io::Error) -> Self {
        Self::StreamRead(source)
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn http_client(msg: impl ToString) -> Self {
        Self::HttpClient(msg.to_string())
    }

    /// Builds a `ThreadPanicked` from the payload returned by `JoinHandle::join`
    pub fn thread_panicked(thread: &str, payload: Box<dyn std::any::Any + Send>) -> Self {
        let detail = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::ThreadPanicked(format!("{}: {}", thread, detail))
    }

    /// Whether the error only affects the task that raised it
    pub fn is_task_local(&self) -> bool {
        matches!(self, Self::FetchFailure { .. } | Self::StreamRead(_))
    }
}
