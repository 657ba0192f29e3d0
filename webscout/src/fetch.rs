//! Downloading task bodies.
//!
//! Workers only see the [`Fetch`] trait. [`HttpFetcher`] is the production
//! implementation; tests inject closures or in-memory fakes instead.
use reqwest::blocking::Client;
use std::io::Read;
use std::time::Duration;
use tracing::debug;

use crate::errors::{ScoutError, ScoutResult};

/// A body stream handed to the matcher. Dropping it releases the connection.
pub type Body = Box<dyn Read + Send>;

/// Turns a task identifier into a readable body
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &str) -> ScoutResult<Body>;
}

impl<F> Fetch for F
where
    F: Fn(&str) -> ScoutResult<Body> + Send + Sync,
{
    fn fetch(&self, url: &str) -> ScoutResult<Body> {
        self(url)
    }
}

/// HTTP GET with a per-request timeout
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> ScoutResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("webscout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ScoutError::http_client)?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> ScoutResult<Body> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ScoutError::fetch_failure(url, e))?;

        // The body is scanned whatever the status; error pages count too
        let status = response.status();
        if !status.is_success() {
            debug!("{} answered with status {}", url, status);
        }

        Ok(Box::new(response))
    }
}
