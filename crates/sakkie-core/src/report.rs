//! Integration report: the biggest savings opportunities of a run.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{BestPriceResult, PriceRange};
use crate::presentation::PresentationSummary;

pub const DEFAULT_TOP_DEALS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrationReport {
    pub integration_date: DateTime<Utc>,
    pub summary: PresentationSummary,
    pub best_deals: Vec<Deal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deal {
    /// Normalized product name.
    pub product: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub best_price: Decimal,
    pub best_retailer: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub savings: Decimal,
    pub price_range: PriceRange,
}

/// The `n` groups with the largest savings, highest first.
///
/// Groups with no savings are left out. Equal savings keep aggregation
/// order.
pub fn top_deals(results: &[BestPriceResult], n: usize) -> Vec<Deal> {
    let mut ranked: Vec<&BestPriceResult> = results.iter().collect();
    ranked.sort_by(|a, b| b.savings.cmp(&a.savings));

    ranked
        .into_iter()
        .take(n)
        .filter(|r| r.savings > Decimal::ZERO)
        .map(|r| Deal {
            product: r.normalized_name.clone(),
            best_price: r.best_price,
            best_retailer: r.best_record().retailer.clone(),
            savings: r.savings,
            price_range: r.price_range,
        })
        .collect()
}

pub fn build_report(
    results: &[BestPriceResult],
    summary: PresentationSummary,
    n: usize,
    integration_date: DateTime<Utc>,
) -> IntegrationReport {
    IntegrationReport {
        integration_date,
        summary,
        best_deals: top_deals(results, n),
    }
}
