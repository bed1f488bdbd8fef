//! Raw retailer listings and their conversion into [`ProductRecord`]s.
//!
//! A listing is whatever a retailer source hands back before cleanup:
//! prices may be strings or numbers, most fields are optional. Shaping a
//! listing applies the [`sanitize`](crate::sanitize) rules and either
//! yields a record or says why the listing was dropped.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::models::ProductRecord;
use crate::sanitize::{
    classify_availability, generate_product_id, sanitize_price, sanitize_text,
};

pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_UNIT: &str = "each";

/// A listing as delivered by a retailer source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawListing {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(alias = "product_name")]
    pub name: String,
    #[serde(default)]
    pub price: Option<RawPrice>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, alias = "image_url")]
    pub image: Option<String>,
}

/// Price as found upstream: free text (`"R24.99"`) or a bare JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(serde_json::Number),
    Text(String),
}

impl RawPrice {
    pub fn as_text(&self) -> String {
        match self {
            RawPrice::Number(n) => n.to_string(),
            RawPrice::Text(s) => s.clone(),
        }
    }
}

/// Why a listing did not become a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingRejected {
    #[error("'{name}': no price in {raw:?}")]
    NoPrice { name: String, raw: Option<String> },
}

/// Shape a raw listing into a record for `retailer`.
///
/// `observed_at` becomes `last_updated` and seeds the generated product id
/// when the listing has none. A listing without a usable price is
/// rejected; every other field falls back to a default.
pub fn shape_listing(
    raw: &RawListing,
    retailer: &str,
    observed_at: DateTime<Utc>,
) -> Result<ProductRecord, ListingRejected> {
    let product_name = sanitize_text(&raw.name);

    let raw_price = raw.price.as_ref().map(RawPrice::as_text);
    let current_price = raw_price
        .as_deref()
        .and_then(sanitize_price)
        .ok_or_else(|| ListingRejected::NoPrice {
            name: product_name.clone(),
            raw: raw_price.clone(),
        })?;

    let product_id = raw
        .id
        .as_deref()
        .map(sanitize_text)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| generate_product_id(retailer, &product_name, observed_at.timestamp()));

    Ok(ProductRecord {
        product_id,
        product_name,
        current_price: Some(current_price),
        availability_status: classify_availability(raw.availability.as_deref().unwrap_or("")),
        last_updated: Some(observed_at),
        retailer: retailer.to_string(),
        category: text_or(raw.category.as_deref(), DEFAULT_CATEGORY),
        unit: text_or(raw.unit.as_deref(), DEFAULT_UNIT),
        image_url: raw
            .image
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
    })
}

fn text_or(value: Option<&str>, default: &str) -> String {
    let cleaned = value.map(sanitize_text).unwrap_or_default();
    if cleaned.is_empty() {
        default.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Availability;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn observed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap()
    }

    fn parse(json: &str) -> RawListing {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn shapes_text_price_listing() {
        let raw = parse(
            r#"{"id":"chk-1","name":"  Bananas ","price":"R19.99","availability":"In stock",
                "category":"Fresh Produce","unit":"per kg","image":"https://img/b.jpg"}"#,
        );
        let rec = shape_listing(&raw, "Checkers", observed()).unwrap();
        assert_eq!(rec.product_id, "chk-1");
        assert_eq!(rec.product_name, "Bananas");
        assert_eq!(rec.current_price, Some(Decimal::from_str("19.99").unwrap()));
        assert_eq!(rec.availability_status, Availability::InStock);
        assert_eq!(rec.retailer, "Checkers");
        assert_eq!(rec.category, "Fresh Produce");
        assert_eq!(rec.unit, "per kg");
        assert_eq!(rec.image_url, "https://img/b.jpg");
        assert_eq!(rec.last_updated, Some(observed()));
    }

    #[test]
    fn shapes_numeric_price_and_defaults() {
        let raw = parse(r#"{"name":"White Bread","price":15.99}"#);
        let rec = shape_listing(&raw, "Shoprite", observed()).unwrap();
        assert_eq!(rec.current_price, Some(Decimal::from_str("15.99").unwrap()));
        assert_eq!(rec.category, DEFAULT_CATEGORY);
        assert_eq!(rec.unit, DEFAULT_UNIT);
        assert_eq!(rec.image_url, "");
        assert_eq!(
            rec.product_id,
            format!("shoprite-white-bread-{}", observed().timestamp())
        );
    }

    #[test]
    fn rejects_listing_without_price() {
        let raw = parse(r#"{"name":"Premium Coffee","price":"Call for price"}"#);
        let err = shape_listing(&raw, "Woolworths", observed()).unwrap_err();
        assert_eq!(
            err,
            ListingRejected::NoPrice {
                name: "Premium Coffee".to_string(),
                raw: Some("Call for price".to_string()),
            }
        );

        let missing = parse(r#"{"name":"Premium Coffee"}"#);
        assert!(shape_listing(&missing, "Woolworths", observed()).is_err());
    }

    #[test]
    fn accepts_flat_file_field_names() {
        let raw = parse(r#"{"product_name":"Tea","price":"R32","image_url":"x.jpg"}"#);
        let rec = shape_listing(&raw, "SPAR", observed()).unwrap();
        assert_eq!(rec.product_name, "Tea");
        assert_eq!(rec.image_url, "x.jpg");
    }
}
