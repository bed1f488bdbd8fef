//! Collection stage.
//!
//! Walks the configured retailers one at a time: wait for the rate
//! limiter, fetch raw listings, shape them into records, validate the
//! batch, and write it as today's flat file. A retailer that fails to
//! fetch or validate is logged and skipped; the others carry on.
//!
//! After the last retailer a run summary (counts and price statistics)
//! is written next to the retailer directories.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sakkie_core::listing::shape_listing;
use sakkie_core::models::ProductRecord;
use sakkie_core::stats::summarize;
use sakkie_core::validate::validate_batch;
use std::path::PathBuf;

use crate::config::{Config, RetailerConfig};
use crate::rate_limit::RateLimiter;
use crate::source::{build_client, build_source};
use crate::store;

/// How many validation messages are echoed to the log per batch.
const LOGGED_ERRORS: usize = 10;

/// What happened to one retailer during a collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetailerStatus {
    Written { path: PathBuf, count: usize },
    Empty,
    FetchFailed { reason: String },
    Invalid { errors_path: PathBuf, issues: usize },
}

#[derive(Debug, Clone)]
pub struct RetailerOutcome {
    pub key: String,
    pub name: String,
    pub status: RetailerStatus,
}

#[derive(Debug, Default)]
pub struct CollectOutcome {
    /// Every record that was validated and written, in retailer order.
    pub records: Vec<ProductRecord>,
    pub retailers: Vec<RetailerOutcome>,
    pub summary_path: PathBuf,
}

pub struct Collector<'a> {
    config: &'a Config,
    client: reqwest::Client,
    limiter: RateLimiter,
    run_date: NaiveDate,
}

impl<'a> Collector<'a> {
    pub fn new(config: &'a Config, run_date: NaiveDate) -> Result<Self> {
        Ok(Self {
            config,
            client: build_client(config.collector.timeout())?,
            limiter: RateLimiter::new(config.collector.requests_per_second)?,
            run_date,
        })
    }

    /// Fetch and shape one retailer's listings.
    ///
    /// Listings without a usable price are dropped here with a warning.
    pub async fn collect_retailer(
        &mut self,
        retailer: &RetailerConfig,
    ) -> Result<Vec<ProductRecord>> {
        let source = build_source(&retailer.source, &self.client);
        tracing::info!(
            retailer = %retailer.name,
            source = source.kind(),
            location = %source.location(),
            "fetching listings"
        );

        self.limiter.wait().await;
        let fetched = source.fetch().await;
        self.limiter.finish();
        let listings = fetched?;

        let observed_at = Utc::now();
        let mut records = Vec::with_capacity(listings.len());
        for listing in &listings {
            match shape_listing(listing, &retailer.name, observed_at) {
                Ok(record) => records.push(record),
                Err(rejected) => {
                    tracing::warn!(retailer = %retailer.name, "skipping listing: {}", rejected)
                }
            }
        }

        tracing::info!(
            retailer = %retailer.name,
            listings = listings.len(),
            records = records.len(),
            "shaped listings"
        );
        Ok(records)
    }

    /// Run every configured retailer in order.
    pub async fn run(&mut self) -> Result<CollectOutcome> {
        let config = self.config;
        let data_dir = &config.storage.data_dir;
        let pause = config.collector.retailer_pause();
        let mut outcome = CollectOutcome::default();

        for (i, retailer) in config.retailers.iter().enumerate() {
            if i > 0 && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }

            let status = match self.collect_retailer(retailer).await {
                Err(e) => {
                    tracing::warn!(retailer = %retailer.name, "fetch failed: {:#}", e);
                    RetailerStatus::FetchFailed {
                        reason: format!("{:#}", e),
                    }
                }
                Ok(records) if records.is_empty() => {
                    tracing::warn!(retailer = %retailer.name, "no products collected");
                    RetailerStatus::Empty
                }
                Ok(records) => {
                    let report = validate_batch(&records);
                    if report.is_valid() {
                        let path = store::prices_path(data_dir, &retailer.key, self.run_date);
                        store::write_prices(&path, &records)?;
                        tracing::info!(
                            retailer = %retailer.name,
                            count = records.len(),
                            path = %path.display(),
                            "saved price file"
                        );
                        let count = records.len();
                        outcome.records.extend(records);
                        RetailerStatus::Written { path, count }
                    } else {
                        let messages = report.messages();
                        for message in messages.iter().take(LOGGED_ERRORS) {
                            tracing::warn!(retailer = %retailer.name, "{}", message);
                        }
                        let errors_path =
                            store::errors_path(data_dir, &retailer.key, self.run_date);
                        store::write_errors(&errors_path, &messages)?;
                        tracing::error!(
                            retailer = %retailer.name,
                            issues = messages.len(),
                            path = %errors_path.display(),
                            "validation failed, batch not saved"
                        );
                        RetailerStatus::Invalid {
                            errors_path,
                            issues: messages.len(),
                        }
                    }
                }
            };

            outcome.retailers.push(RetailerOutcome {
                key: retailer.key.clone(),
                name: retailer.name.clone(),
                status,
            });
        }

        let summary = summarize(&outcome.records, Utc::now());
        outcome.summary_path = store::summary_path(data_dir, self.run_date);
        store::write_json(&outcome.summary_path, &summary)?;
        tracing::info!(path = %outcome.summary_path.display(), "summary report saved");

        Ok(outcome)
    }
}

/// `sakkie collect`: run the collector and print a per-retailer summary.
pub async fn run_collect(config: &Config, run_date: NaiveDate) -> Result<CollectOutcome> {
    let mut collector = Collector::new(config, run_date)?;
    let outcome = collector.run().await?;
    print_outcome(&outcome);
    Ok(outcome)
}

fn print_outcome(outcome: &CollectOutcome) {
    println!("collect");
    for r in &outcome.retailers {
        match &r.status {
            RetailerStatus::Written { count, .. } => {
                println!("  {}: {} products", r.name, count)
            }
            RetailerStatus::Empty => println!("  {}: no products", r.name),
            RetailerStatus::FetchFailed { .. } => println!("  {}: fetch failed", r.name),
            RetailerStatus::Invalid { issues, .. } => {
                println!("  {}: invalid ({} issues)", r.name, issues)
            }
        }
    }
    println!("  total products: {}", outcome.records.len());
    println!("  summary: {}", outcome.summary_path.display());
    println!("ok");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(dir: &std::path::Path, feeds: &[(&str, &str, &str)]) -> Config {
        let mut text = format!(
            "[storage]\ndata_dir = \"{}\"\n\n[collector]\nrequests_per_second = 1000.0\nretailer_pause_ms = 0\n",
            dir.join("data").display()
        );
        for (key, name, body) in feeds {
            let path = dir.join(format!("{}.json", key));
            std::fs::write(&path, body).unwrap();
            text.push_str(&format!(
                "\n[[retailers]]\nkey = \"{}\"\nname = \"{}\"\n[retailers.source]\nkind = \"file\"\npath = \"{}\"\n",
                key,
                name,
                path.display()
            ));
        }
        toml::from_str(&text).unwrap()
    }

    fn run_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test]
    async fn unpriced_listings_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(
            dir.path(),
            &[(
                "checkers",
                "Checkers",
                r#"[{"name":"Bananas","price":"R19.99"},{"name":"Mystery","price":"POA"}]"#,
            )],
        );

        let mut collector = Collector::new(&config, run_date()).unwrap();
        let records = collector
            .collect_retailer(&config.retailers[0])
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].retailer, "Checkers");
        assert_eq!(records[0].category, "General");
    }

    #[tokio::test]
    async fn run_reports_each_retailer() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(
            dir.path(),
            &[
                ("checkers", "Checkers", r#"[{"name":"Bananas","price":"R19.99"}]"#),
                ("spar", "SPAR", "[]"),
                ("shoprite", "Shoprite", r#"[{"name":"","price":"R5.00"}]"#),
            ],
        );

        let mut collector = Collector::new(&config, run_date()).unwrap();
        let outcome = collector.run().await.unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert!(matches!(
            outcome.retailers[0].status,
            RetailerStatus::Written { count: 1, .. }
        ));
        assert_eq!(outcome.retailers[1].status, RetailerStatus::Empty);
        assert!(matches!(
            outcome.retailers[2].status,
            RetailerStatus::Invalid { issues: 1, .. }
        ));
        assert!(outcome.summary_path.exists());
        assert!(store::prices_path(&config.storage.data_dir, "checkers", run_date()).exists());
    }
}
