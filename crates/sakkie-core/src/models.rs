//! Core data models shared by the collector and the aggregator.
//!
//! A [`ProductRecord`] is one observation of one product at one retailer
//! during one run. Records are built once (by the collector, or by the
//! flat-file loader) and never mutated afterwards.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stock status of a product at a retailer.
///
/// The wire form is the snake_case token (`in_stock`, `low_stock`,
/// `out_of_stock`, `unknown`), which is what the flat files carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    LowStock,
    OutOfStock,
    Unknown,
}

impl Availability {
    pub const ALL: [Availability; 4] = [
        Availability::InStock,
        Availability::LowStock,
        Availability::OutOfStock,
        Availability::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::InStock => "in_stock",
            Availability::LowStock => "low_stock",
            Availability::OutOfStock => "out_of_stock",
            Availability::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored availability token is not one of the four
/// known values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown availability status: '{0}'")]
pub struct AvailabilityParseError(pub String);

impl FromStr for Availability {
    type Err = AvailabilityParseError;

    /// Strict parse of the wire token. Free text from a retailer goes
    /// through [`crate::sanitize::classify_availability`] instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Availability::ALL
            .into_iter()
            .find(|a| a.as_str() == s.trim())
            .ok_or_else(|| AvailabilityParseError(s.to_string()))
    }
}

/// One product observation at one retailer.
///
/// `current_price` and `last_updated` are optional because they are parsed
/// at the boundary: a value that fails to parse is nulled rather than
/// failing the whole record. Validation decides whether a batch carrying
/// such records may be merged.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub product_id: String,
    pub product_name: String,
    pub current_price: Option<Decimal>,
    pub availability_status: Availability,
    pub last_updated: Option<DateTime<Utc>>,
    /// Retailer display name (e.g. `"Pick n Pay"`).
    pub retailer: String,
    pub category: String,
    pub unit: String,
    pub image_url: String,
}

/// Lowest and highest positive price seen in a product group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PriceRange {
    #[serde(with = "rust_decimal::serde::float")]
    pub min: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max: Decimal,
}

impl PriceRange {
    pub fn single(price: Decimal) -> Self {
        Self {
            min: price,
            max: price,
        }
    }
}

/// Best-price selection for one normalized product name.
#[derive(Debug, Clone, PartialEq)]
pub struct BestPriceResult {
    pub normalized_name: String,
    /// Index of the cheapest record within `all_records`.
    pub best_index: usize,
    pub best_price: Decimal,
    /// Every record in the group, in encounter order.
    pub all_records: Vec<ProductRecord>,
    /// `max - min` over positive prices; zero when fewer than two exist.
    pub savings: Decimal,
    pub price_range: PriceRange,
}

impl BestPriceResult {
    pub fn best_record(&self) -> &ProductRecord {
        &self.all_records[self.best_index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_round_trips_wire_tokens() {
        for a in Availability::ALL {
            assert_eq!(a.as_str().parse::<Availability>(), Ok(a));
        }
    }

    #[test]
    fn availability_rejects_free_text() {
        let err = "In Stock".parse::<Availability>().unwrap_err();
        assert_eq!(err, AvailabilityParseError("In Stock".to_string()));
        assert!("low-stock".parse::<Availability>().is_err());
    }

    #[test]
    fn availability_serializes_snake_case() {
        let json = serde_json::to_string(&Availability::OutOfStock).unwrap();
        assert_eq!(json, "\"out_of_stock\"");
    }
}
