//! Best-price selection across retailers.
//!
//! # Algorithm
//!
//! 1. Key each record by [`normalize_name`] of its product name.
//! 2. Partition records into groups by key, keeping encounter order both
//!    within a group and across groups. Records without a price are
//!    skipped.
//! 3. The best record of a group is the one with the lowest price. On an
//!    exact tie the first record encountered wins; the group is never
//!    re-sorted.
//! 4. Savings and the price range only consider prices strictly above
//!    zero. With fewer than two such prices savings are zero and the range
//!    collapses to a single value (or to zero when there are none).
//!
//! The whole pass is a deterministic fold: the same input always yields
//! the same results in the same order.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::models::{BestPriceResult, PriceRange, ProductRecord};
use crate::sanitize::normalize_name;

/// Records sharing one normalized product name.
///
/// Only built by [`group_records`], so a group is never empty and every
/// member carries a price.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductGroup {
    key: String,
    records: Vec<ProductRecord>,
}

impl ProductGroup {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }
}

/// Partition priced records by normalized name, in first-encounter order.
pub fn group_records(records: &[ProductRecord]) -> Vec<ProductGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<ProductGroup> = Vec::new();

    for record in records {
        if record.current_price.is_none() {
            continue;
        }
        let key = normalize_name(&record.product_name);
        match index.get(&key) {
            Some(&pos) => groups[pos].records.push(record.clone()),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(ProductGroup {
                    key,
                    records: vec![record.clone()],
                });
            }
        }
    }

    groups
}

/// Select the best price for one group.
pub fn select_best(group: ProductGroup) -> BestPriceResult {
    let mut best: Option<(usize, Decimal)> = None;
    for (i, price) in group
        .records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.current_price.map(|p| (i, p)))
    {
        // Strict comparison keeps the first record on ties.
        if best.map_or(true, |(_, best_price)| price < best_price) {
            best = Some((i, price));
        }
    }
    let (best_index, best_price) = best.unwrap_or((0, Decimal::ZERO));

    let positive: Vec<Decimal> = group
        .records
        .iter()
        .filter_map(|r| r.current_price)
        .filter(|p| *p > Decimal::ZERO)
        .collect();

    let price_range = match (positive.iter().min(), positive.iter().max()) {
        (Some(&min), Some(&max)) => PriceRange { min, max },
        _ => PriceRange::default(),
    };

    let savings = if positive.len() > 1 {
        price_range.max - price_range.min
    } else {
        Decimal::ZERO
    };

    BestPriceResult {
        normalized_name: group.key,
        best_index,
        best_price,
        all_records: group.records,
        savings,
        price_range,
    }
}

/// Find the best price for every distinct normalized product name.
pub fn find_best_prices(records: &[ProductRecord]) -> Vec<BestPriceResult> {
    group_records(records).into_iter().map(select_best).collect()
}
