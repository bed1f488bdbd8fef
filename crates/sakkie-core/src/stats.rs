//! Run summary for a collection pass: counts per retailer and category,
//! plus simple price statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::ProductRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub extraction_date: DateTime<Utc>,
    pub total_products: usize,
    pub retailers: BTreeMap<String, usize>,
    pub categories: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_statistics: Option<PriceStatistics>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceStatistics {
    #[serde(with = "rust_decimal::serde::float")]
    pub min_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max_price: Decimal,
    /// Mean, rounded to cents.
    #[serde(with = "rust_decimal::serde::float")]
    pub average_price: Decimal,
    /// Upper median: `sorted[len / 2]`.
    #[serde(with = "rust_decimal::serde::float")]
    pub median_price: Decimal,
}

pub fn summarize(records: &[ProductRecord], extraction_date: DateTime<Utc>) -> RunSummary {
    let mut retailers = BTreeMap::new();
    let mut categories = BTreeMap::new();
    for record in records {
        *retailers.entry(record.retailer.clone()).or_insert(0) += 1;
        *categories.entry(record.category.clone()).or_insert(0) += 1;
    }

    let prices: Vec<Decimal> = records
        .iter()
        .filter_map(|r| r.current_price)
        .filter(|p| *p > Decimal::ZERO)
        .collect();

    RunSummary {
        extraction_date,
        total_products: records.len(),
        retailers,
        categories,
        price_statistics: price_statistics(prices),
    }
}

pub fn price_statistics(mut prices: Vec<Decimal>) -> Option<PriceStatistics> {
    if prices.is_empty() {
        return None;
    }
    prices.sort();

    let average = mean(&prices)?.round_dp(2);

    Some(PriceStatistics {
        min_price: prices[0],
        max_price: prices[prices.len() - 1],
        average_price: average,
        median_price: prices[prices.len() / 2],
    })
}

/// Arithmetic mean without panicking on overflow.
///
/// When the running total would leave the `Decimal` range, each value is
/// divided by the count before summing. `None` for empty input or when
/// even that overflows.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let count = Decimal::from(values.len());

    let total = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v));
    match total {
        Some(total) => total.checked_div(count),
        None => values.iter().try_fold(Decimal::ZERO, |acc, v| {
            acc.checked_add(v.checked_div(count)?)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Availability;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rec(retailer: &str, category: &str, price: Option<&str>) -> ProductRecord {
        ProductRecord {
            product_id: "id".to_string(),
            product_name: "Item".to_string(),
            current_price: price.map(dec),
            availability_status: Availability::InStock,
            last_updated: None,
            retailer: retailer.to_string(),
            category: category.to_string(),
            unit: "each".to_string(),
            image_url: String::new(),
        }
    }

    #[test]
    fn counts_by_retailer_and_category() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
        let records = vec![
            rec("Checkers", "Dairy", Some("22.99")),
            rec("Checkers", "Bakery", Some("15.99")),
            rec("SPAR", "Dairy", Some("23.99")),
        ];
        let summary = summarize(&records, at);
        assert_eq!(summary.total_products, 3);
        assert_eq!(summary.retailers["Checkers"], 2);
        assert_eq!(summary.retailers["SPAR"], 1);
        assert_eq!(summary.categories["Dairy"], 2);
        assert_eq!(summary.categories["Bakery"], 1);

        let stats = summary.price_statistics.unwrap();
        assert_eq!(stats.min_price, dec("15.99"));
        assert_eq!(stats.max_price, dec("23.99"));
        assert_eq!(stats.average_price, dec("20.99"));
        assert_eq!(stats.median_price, dec("22.99"));
    }

    #[test]
    fn median_is_upper_middle_for_even_counts() {
        let stats = price_statistics(vec![dec("4"), dec("1"), dec("3"), dec("2")]).unwrap();
        assert_eq!(stats.median_price, dec("3"));
        assert_eq!(stats.average_price, dec("2.50"));
    }

    #[test]
    fn average_is_rounded_to_cents() {
        let stats = price_statistics(vec![dec("1"), dec("1"), dec("2")]).unwrap();
        assert_eq!(stats.average_price, dec("1.33"));
    }

    #[test]
    fn huge_prices_do_not_overflow_the_average() {
        let big = dec("50000000000000000000000000000");
        let stats = price_statistics(vec![big, big]).unwrap();
        assert_eq!(stats.average_price, big);
        assert_eq!(stats.max_price, big);

        let at = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
        let records = vec![
            rec("Checkers", "Dairy", Some("50000000000000000000000000000")),
            rec("SPAR", "Dairy", Some("50000000000000000000000000000")),
            rec("SPAR", "Dairy", Some("12.99")),
        ];
        let summary = summarize(&records, at);
        assert!(summary.price_statistics.is_some());
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[dec("1.5"), dec("2.5")]), Some(dec("2")));
    }

    #[test]
    fn no_prices_means_no_statistics() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
        let summary = summarize(&[], at);
        assert_eq!(summary.total_products, 0);
        assert!(summary.price_statistics.is_none());

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("price_statistics").is_none());
    }
}
