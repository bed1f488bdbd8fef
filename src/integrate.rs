//! Aggregation stage.
//!
//! Loads the latest price file of every configured retailer, validates
//! each batch, merges the valid ones and hands the union to the core
//! best-price computation. Two artifacts come out of a run:
//!
//! - `<output_dir>/price-data.json`, the storefront payload
//! - `<data_dir>/integration_report_<date>.json`, the top savings
//!
//! Batches that fail validation are excluded and their messages written
//! next to the offending file.

use anyhow::{bail, Result};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sakkie_core::aggregate::find_best_prices;
use sakkie_core::models::ProductRecord;
use sakkie_core::presentation::build_presentation;
use sakkie_core::report::build_report;
use sakkie_core::validate::validate_batch;
use std::path::{Path, PathBuf};

use crate::config::{Config, RetailerConfig};
use crate::store;

#[derive(Debug)]
pub struct IntegrateOutcome {
    pub retailers_merged: usize,
    pub records: usize,
    pub products: usize,
    pub avg_savings: Decimal,
    pub presentation_path: PathBuf,
    pub report_path: PathBuf,
}

/// Load one retailer's latest batch if it exists and validates.
fn load_latest(data_dir: &Path, retailer: &RetailerConfig) -> Result<Option<Vec<ProductRecord>>> {
    let dir = store::retailer_dir(data_dir, &retailer.key);
    let Some(path) = store::latest_price_file(&dir)? else {
        tracing::warn!(retailer = %retailer.name, dir = %dir.display(), "no price files found");
        return Ok(None);
    };

    let batch = match store::load_prices(&path) {
        Ok(batch) => batch,
        Err(e) => {
            tracing::warn!(retailer = %retailer.name, "skipping unreadable file: {:#}", e);
            return Ok(None);
        }
    };

    let mut report = validate_batch(&batch.records);
    report.extend(batch.issues);
    if !report.is_valid() {
        let messages = report.messages();
        let errors_path = store::load_errors_path(&path);
        store::write_errors(&errors_path, &messages)?;
        tracing::error!(
            retailer = %retailer.name,
            file = %path.display(),
            issues = messages.len(),
            "validation failed, batch excluded"
        );
        return Ok(None);
    }

    tracing::info!(
        retailer = %retailer.name,
        file = %path.display(),
        records = batch.records.len(),
        "loaded price file"
    );
    Ok(Some(batch.records))
}

/// Merge, aggregate and write both artifacts.
///
/// Fails when no retailer contributed a valid batch.
pub fn integrate(config: &Config, run_date: NaiveDate) -> Result<IntegrateOutcome> {
    let data_dir = &config.storage.data_dir;

    let mut merged = Vec::new();
    let mut retailers_merged = 0;
    for retailer in &config.retailers {
        if let Some(records) = load_latest(data_dir, retailer)? {
            retailers_merged += 1;
            merged.extend(records);
        }
    }

    if merged.is_empty() {
        bail!("No product data found to integrate");
    }

    let results = find_best_prices(&merged);
    tracing::info!(
        records = merged.len(),
        products = results.len(),
        "computed best prices"
    );

    let now = Utc::now();
    let presentation = build_presentation(&results, config.aggregator.max_products, now);
    let presentation_path = store::presentation_path(&config.storage.output_dir);
    store::write_json(&presentation_path, &presentation)?;

    let avg_savings = presentation.summary.avg_savings;
    let report = build_report(
        &results,
        presentation.summary,
        config.aggregator.top_deals,
        now,
    );
    let report_path = store::report_path(data_dir, run_date);
    store::write_json(&report_path, &report)?;

    Ok(IntegrateOutcome {
        retailers_merged,
        records: merged.len(),
        products: results.len(),
        avg_savings,
        presentation_path,
        report_path,
    })
}

/// `sakkie aggregate`.
pub fn run_aggregate(config: &Config, run_date: NaiveDate) -> Result<IntegrateOutcome> {
    let outcome = integrate(config, run_date)?;

    println!("aggregate");
    println!(
        "  retailers merged: {}/{}",
        outcome.retailers_merged,
        config.retailers.len()
    );
    println!("  records: {}", outcome.records);
    println!("  products: {}", outcome.products);
    println!("  average savings: R{}", outcome.avg_savings);
    println!("  presentation: {}", outcome.presentation_path.display());
    println!("  report: {}", outcome.report_path.display());
    println!("ok");

    Ok(outcome)
}
