//! TOML configuration.
//!
//! The configuration is parsed once at startup and handed to each stage
//! by reference; nothing reads it from ambient state.
//!
//! ```toml
//! [storage]
//! data_dir = "./data"
//! output_dir = "./public"
//!
//! [collector]
//! requests_per_second = 0.5
//! retailer_pause_ms = 2000
//!
//! [[retailers]]
//! key = "checkers"
//! name = "Checkers"
//! [retailers.source]
//! kind = "http"
//! base_url = "https://www.checkers.co.za"
//! search_endpoint = "/search"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub retailers: Vec<RetailerConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Where the presentation data file is written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./public")
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectorConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,
    #[serde(default = "default_retailer_pause_ms")]
    pub retailer_pause_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            retailer_pause_ms: default_retailer_pause_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CollectorConfig {
    pub fn retailer_pause(&self) -> Duration {
        Duration::from_millis(self.retailer_pause_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_requests_per_second() -> f64 {
    0.5
}
fn default_retailer_pause_ms() -> u64 {
    2000
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct AggregatorConfig {
    #[serde(default = "default_max_products")]
    pub max_products: usize,
    #[serde(default = "default_top_deals")]
    pub top_deals: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_products: default_max_products(),
            top_deals: default_top_deals(),
        }
    }
}

fn default_max_products() -> usize {
    sakkie_core::presentation::DEFAULT_PRODUCT_LIMIT
}
fn default_top_deals() -> usize {
    sakkie_core::report::DEFAULT_TOP_DEALS
}

/// One tracked retailer.
#[derive(Debug, Deserialize, Clone)]
pub struct RetailerConfig {
    /// Directory name under `data_dir` (e.g. `pick_n_pay`).
    pub key: String,
    /// Display name stored on every record (e.g. `Pick n Pay`).
    pub name: String,
    pub source: SourceConfig,
}

/// Where a retailer's raw listings come from.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Http(HttpSourceConfig),
    File(FileSourceConfig),
}

impl SourceConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceConfig::Http(_) => "http",
            SourceConfig::File(_) => "file",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpSourceConfig {
    pub base_url: String,
    #[serde(default)]
    pub search_endpoint: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpSourceConfig {
    pub fn url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.search_endpoint
        )
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct FileSourceConfig {
    pub path: PathBuf,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.retailers.is_empty() {
        bail!("at least one [[retailers]] entry is required");
    }

    let mut seen = HashSet::new();
    for retailer in &config.retailers {
        if retailer.key.trim().is_empty() {
            bail!("retailers.key must not be empty");
        }
        if retailer.name.trim().is_empty() {
            bail!("retailers.name must not be empty (key '{}')", retailer.key);
        }
        if !seen.insert(retailer.key.as_str()) {
            bail!("duplicate retailer key: '{}'", retailer.key);
        }
    }

    crate::rate_limit::min_interval(config.collector.requests_per_second)
        .context("invalid collector.requests_per_second")?;

    if config.aggregator.max_products == 0 {
        bail!("aggregator.max_products must be >= 1");
    }

    Ok(())
}
