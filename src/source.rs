//! Retailer listing sources.
//!
//! A [`ListingSource`] produces the raw listings of one retailer. Two
//! kinds exist: an HTTP JSON feed and a local JSON file. Both return the
//! same [`RawListing`] shape, which the collector then sanitizes.
//!
//! # Payload
//!
//! Either a bare array or an object with a `products` array:
//!
//! ```json
//! [{ "name": "Bananas", "price": "R19.99", "availability": "In stock",
//!    "category": "Fresh Produce", "unit": "per kg" }]
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use sakkie_core::listing::RawListing;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{FileSourceConfig, HttpSourceConfig, SourceConfig};

#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Source kind (`"http"` or `"file"`).
    fn kind(&self) -> &str;

    /// Where the listings come from, for logs.
    fn location(&self) -> String;

    /// Fetch every raw listing the source currently offers.
    async fn fetch(&self) -> Result<Vec<RawListing>>;
}

/// Build the shared HTTP client used for every retailer in a run.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json,text/html;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .context("Failed to build HTTP client")
}

pub fn build_source(config: &SourceConfig, client: &reqwest::Client) -> Box<dyn ListingSource> {
    match config {
        SourceConfig::Http(http) => Box::new(HttpSource::new(http, client.clone())),
        SourceConfig::File(file) => Box::new(FileSource::new(file)),
    }
}

pub struct HttpSource {
    client: reqwest::Client,
    url: String,
    user_agent: String,
}

impl HttpSource {
    pub fn new(config: &HttpSourceConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            url: config.url(),
            user_agent: config.user_agent.clone(),
        }
    }
}

#[async_trait]
impl ListingSource for HttpSource {
    fn kind(&self) -> &str {
        "http"
    }

    fn location(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Vec<RawListing>> {
        let body = self
            .client
            .get(&self.url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .with_context(|| format!("GET {} failed", self.url))?
            .error_for_status()
            .with_context(|| format!("GET {} returned an error status", self.url))?
            .text()
            .await
            .with_context(|| format!("Failed to read body from {}", self.url))?;

        parse_listings(&body).with_context(|| format!("Unexpected payload from {}", self.url))
    }
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(config: &FileSourceConfig) -> Self {
        Self {
            path: config.path.clone(),
        }
    }
}

#[async_trait]
impl ListingSource for FileSource {
    fn kind(&self) -> &str {
        "file"
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<RawListing>> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read listings file: {}", self.path.display()))?;

        parse_listings(&body)
            .with_context(|| format!("Unexpected payload in {}", self.path.display()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListingPayload {
    List(Vec<RawListing>),
    Wrapped { products: Vec<RawListing> },
}

pub fn parse_listings(body: &str) -> Result<Vec<RawListing>> {
    let payload: ListingPayload = serde_json::from_str(body)?;
    Ok(match payload {
        ListingPayload::List(items) => items,
        ListingPayload::Wrapped { products } => products,
    })
}
