pub mod config;
pub mod errors;
pub mod fetch;
pub mod pool;
pub mod report;
pub mod results;
pub mod search;
pub mod source;

pub use config::{ConfigOverrides, ScoutConfig};
pub use errors::{ScoutError, ScoutResult};
pub use fetch::{Body, Fetch, HttpFetcher};
pub use pool::PoolController;
pub use report::{ConsoleReport, Report};
pub use results::{PoolSummary, TaskCount, WorkerStats};
pub use search::WordMatcher;
pub use source::spawn_line_source;
