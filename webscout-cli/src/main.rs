use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use webscout::{pool, spawn_line_source, ConfigOverrides, ScoutConfig, ScoutError};

type Result<T> = std::result::Result<T, ScoutError>;

/// Reads URLs (one per line) and counts a word in every downloaded page
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Maximum number of simultaneous downloads
    #[arg(short = 'k', long = "workers")]
    workers: Option<usize>,

    /// The word to look for in the pages
    #[arg(short = 'q', long)]
    word: Option<String>,

    /// Timeout for each download (e.g. 10s, 1m 30s)
    #[arg(long)]
    timeout: Option<String>,

    /// Bytes read from a response per call
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Read URLs from a file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            max_workers: self.workers,
            word: self.word.clone(),
            chunk_size: self.chunk_size,
            fetch_timeout: self.timeout.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = ScoutConfig::load_from(cli.config.as_deref())?.merge_with_cli(cli.overrides());
    init_logging(&config.log_level);
    config.validate()?;
    info!(
        "Counting '{}' with up to {} workers (timeout {}, chunk size {})",
        config.word, config.max_workers, config.fetch_timeout, config.chunk_size
    );

    let tasks = match &cli.input {
        Some(path) => {
            debug!("Reading URLs from {}", path.display());
            spawn_line_source(BufReader::new(File::open(path)?))?
        }
        None => {
            debug!("Reading URLs from stdin");
            spawn_line_source(BufReader::new(io::stdin()))?
        }
    };

    // Returns after the last worker has finished and the total is printed
    let summary = pool::run(&config, tasks)?;
    debug!(
        "{} tasks processed by {} workers",
        summary.tasks_processed(),
        summary.workers_spawned
    );
    Ok(())
}

/// Logs go to stderr; stdout carries the counts
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
