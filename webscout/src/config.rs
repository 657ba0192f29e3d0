use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{ScoutError, ScoutResult};
use crate::search::matcher::DEFAULT_CHUNK_SIZE;

/// Largest accepted `max_workers`; the pool's channels are sized from it
pub const MAX_WORKERS: usize = 65_536;

/// Largest accepted `chunk_size` (64 MiB); each worker allocates one window
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Configuration for a webscout run.
///
/// # Configuration Locations
///
/// The configuration can be loaded from multiple locations in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.webscout.yaml` in the current directory
/// 3. Global `$HOME/.config/webscout/config.yaml`
///
/// # Configuration Format
///
/// ```yaml
/// # Upper bound on simultaneous downloads
/// max_workers: 8
///
/// # Word to count; its title-case variant is counted too
/// word: "rust"
///
/// # Bytes read from a response body per read call
/// chunk_size: 32768
///
/// # Per-request timeout (humantime syntax)
/// fetch_timeout: "10s"
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
///
/// Command-line arguments take precedence over file values, see
/// [`ScoutConfig::merge_with_cli`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// Maximum number of workers the pool may grow to
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Word to look for in every response body
    #[serde(default = "default_word")]
    pub word: String,

    /// Read size used by the streaming matcher
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Timeout for a single fetch, e.g. "10s" or "1m 30s"
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Values supplied on the command line; `None` keeps the file value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_workers: Option<usize>,
    pub word: Option<String>,
    pub chunk_size: Option<usize>,
    pub fetch_timeout: Option<String>,
    pub log_level: Option<String>,
}

fn default_max_workers() -> usize {
    5
}

fn default_word() -> String {
    "go".to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_fetch_timeout() -> String {
    "10s".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            word: default_word(),
            chunk_size: default_chunk_size(),
            fetch_timeout: default_fetch_timeout(),
            log_level: default_log_level(),
        }
    }
}

impl ScoutConfig {
    /// Loads configuration from the default locations plus an explicit file
    pub fn load_from(config_path: Option<&Path>) -> ScoutResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let defaults = [
            dirs::config_dir().map(|p| p.join("webscout/config.yaml")),
            Some(PathBuf::from(".webscout.yaml")),
        ];

        for path in defaults.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicitly requested file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli: ConfigOverrides) -> Self {
        if let Some(max_workers) = cli.max_workers {
            self.max_workers = max_workers;
        }
        if let Some(word) = cli.word {
            self.word = word;
        }
        if let Some(chunk_size) = cli.chunk_size {
            self.chunk_size = chunk_size;
        }
        if let Some(fetch_timeout) = cli.fetch_timeout {
            self.fetch_timeout = fetch_timeout;
        }
        if let Some(log_level) = cli.log_level {
            self.log_level = log_level;
        }
        self
    }

    /// Parses `fetch_timeout`
    pub fn fetch_timeout(&self) -> ScoutResult<Duration> {
        humantime::parse_duration(&self.fetch_timeout).map_err(|e| {
            ScoutError::config_error(format!(
                "invalid fetch_timeout '{}': {}",
                self.fetch_timeout, e
            ))
        })
    }

    /// Rejects values the pool cannot start with
    pub fn validate(&self) -> ScoutResult<()> {
        if self.max_workers == 0 {
            return Err(ScoutError::config_error(
                "max_workers must be a positive integer",
            ));
        }
        if self.max_workers > MAX_WORKERS {
            return Err(ScoutError::config_error(format!(
                "max_workers must be at most {}, got {}",
                MAX_WORKERS, self.max_workers
            )));
        }
        if self.word.is_empty() {
            return Err(ScoutError::config_error("word must not be empty"));
        }
        if self.chunk_size == 0 {
            return Err(ScoutError::config_error(
                "chunk_size must be a positive integer",
            ));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(ScoutError::config_error(format!(
                "chunk_size must be at most {}, got {}",
                MAX_CHUNK_SIZE, self.chunk_size
            )));
        }
        if self.fetch_timeout()?.is_zero() {
            return Err(ScoutError::config_error("fetch_timeout must be non-zero"));
        }
        Ok(())
    }
}
