//! Client for the upstream scrape API that supplies raw procurement records.
//!
//! The API takes a company name and answers with a JSON array of record
//! objects. This crate only moves bytes: it never interprets the records,
//! which is the job of `tenderstat-core`. Saved responses can be written to
//! and read back from disk for offline runs.

mod files;

use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};
use tenderstat_shared::{Result, SourceConfig, TenderStatError};
use tracing::{debug, info, instrument, warn};
use url::Url;

pub use files::{default_save_name, load_file, save_file};

/// Path of the scrape endpoint, relative to the configured API base URL.
const SCRAPE_PATH: &str = "scrape";

/// Maximum response size we accept (64 MB).
const MAX_RESPONSE_SIZE: u64 = 64 * 1024 * 1024;

/// User-Agent string for scrape requests.
const USER_AGENT: &str = concat!("tenderstat/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// SourceClient
// ---------------------------------------------------------------------------

/// HTTP client bound to one scrape endpoint.
#[derive(Debug, Clone)]
pub struct SourceClient {
    client: Client,
    endpoint: Url,
    max_attempts: u32,
    retry_delay: Duration,
}

impl SourceClient {
    /// Build a client from runtime source configuration.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let endpoint = scrape_endpoint(&config.api_url)?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TenderStatError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            max_attempts: config.max_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// The full URL records are requested from.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch the raw records for `company`.
    ///
    /// Transport errors and 5xx responses are retried up to the configured
    /// number of attempts. 4xx responses and undecodable bodies fail
    /// immediately.
    #[instrument(skip_all, fields(company = %company, endpoint = %self.endpoint))]
    pub async fn fetch(&self, company: &str) -> Result<Value> {
        let company = company.trim();
        if company.is_empty() {
            return Err(TenderStatError::validation("company name must not be empty"));
        }

        let mut attempt = 1;
        loop {
            match self.fetch_once(company).await {
                Ok(body) => {
                    info!(
                        attempt,
                        records = body.as_array().map(Vec::len),
                        "records fetched"
                    );
                    return Ok(body);
                }
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "fetch attempt failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, company: &str) -> Result<Value> {
        let url = self.endpoint.as_str();
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "companyName": company }))
            .send()
            .await
            .map_err(|e| TenderStatError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TenderStatError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(len) = response.content_length() {
            if len > MAX_RESPONSE_SIZE {
                return Err(TenderStatError::validation(format!(
                    "{url}: response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"
                )));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| TenderStatError::Network(format!("{url}: failed to read body: {e}")))?;
        debug!(bytes = body.len(), "response received");

        serde_json::from_str(&body)
            .map_err(|e| TenderStatError::parse(format!("{url}: response is not JSON: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve `<api_url>/scrape`, keeping any base path the API is mounted under.
fn scrape_endpoint(api_url: &str) -> Result<Url> {
    let mut base = Url::parse(api_url)
        .map_err(|e| TenderStatError::config(format!("invalid API URL '{api_url}': {e}")))?;

    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(SCRAPE_PATH)
        .map_err(|e| TenderStatError::config(format!("invalid API URL '{api_url}': {e}")))
}
