//! Presentation adapter.
//!
//! Maps [`BestPriceResult`]s onto the data shape the storefront consumes:
//! a `products` array with synthetic sequential ids and a `prices` array
//! carrying retailer metadata. This is a pure transform; writing the
//! result somewhere is the caller's business.
//!
//! Field names are camelCase on the wire to match the consumer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::BestPriceResult;
use crate::stats::mean;

/// Brand metadata for a known retailer, keyed by display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetailerBrand {
    pub name: &'static str,
    pub id: &'static str,
    pub color: &'static str,
}

pub const RETAILER_BRANDS: [RetailerBrand; 5] = [
    RetailerBrand {
        name: "Checkers",
        id: "checkers",
        color: "#00A651",
    },
    RetailerBrand {
        name: "Pick n Pay",
        id: "pick-n-pay",
        color: "#E31837",
    },
    RetailerBrand {
        name: "Woolworths",
        id: "woolworths",
        color: "#00A86B",
    },
    RetailerBrand {
        name: "Shoprite",
        id: "shoprite",
        color: "#FF6B35",
    },
    RetailerBrand {
        name: "SPAR",
        id: "spar",
        color: "#006B3F",
    },
];

pub const UNKNOWN_RETAILER_ID: &str = "unknown";
pub const DEFAULT_RETAILER_COLOR: &str = "#6B7280";
pub const DEFAULT_PRODUCT_LIMIT: usize = 20;

const BARCODE_PREFIX: &str = "600123456789";
const IMAGE_QUERY: &str = "auto=compress&cs=tinysrgb&w=300&h=200&fit=crop";
const LOGO_QUERY: &str = "auto=compress&cs=tinysrgb&w=100&h=100&fit=crop";

pub fn retailer_brand(name: &str) -> Option<&'static RetailerBrand> {
    RETAILER_BRANDS.iter().find(|b| b.name == name)
}

pub fn retailer_id(name: &str) -> &'static str {
    retailer_brand(name).map_or(UNKNOWN_RETAILER_ID, |b| b.id)
}

pub fn retailer_color(name: &str) -> &'static str {
    retailer_brand(name).map_or(DEFAULT_RETAILER_COLOR, |b| b.color)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationData {
    pub products: Vec<ProductEntry>,
    pub prices: Vec<PriceEntry>,
    pub last_updated: DateTime<Utc>,
    pub summary: PresentationSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductEntry {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub barcode: String,
    pub image: String,
    pub unit: String,
    pub unit_size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEntry {
    pub id: String,
    pub product_id: String,
    pub retailer: RetailerEntry,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub on_sale: bool,
    pub last_updated: Option<DateTime<Utc>>,
    /// Availability token with `_` replaced by `-` (e.g. `in-stock`).
    pub availability: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetailerEntry {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub color: String,
    pub locations: Vec<LocationEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationEntry {
    pub id: String,
    pub name: String,
    pub address: String,
    pub distance: f64,
    pub coordinates: [f64; 2],
    pub opening_hours: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationSummary {
    pub total_products: usize,
    pub total_prices: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_savings: Decimal,
}

/// Mean savings over every group, unrounded. Zero for no groups.
pub fn average_savings(results: &[BestPriceResult]) -> Decimal {
    let savings: Vec<Decimal> = results.iter().map(|r| r.savings).collect();
    mean(&savings).unwrap_or(Decimal::ZERO)
}

/// Build the storefront payload from the first `max_products` groups.
///
/// Product ids count from 1. Price ids are `{productId}-{n}` where `n`
/// counts every price entry emitted so far, across all products.
/// `avgSavings` is computed over all groups, not only the emitted ones.
pub fn build_presentation(
    results: &[BestPriceResult],
    max_products: usize,
    generated_at: DateTime<Utc>,
) -> PresentationData {
    let mut products = Vec::new();
    let mut prices = Vec::new();
    let mut price_seq: usize = 1;

    for (product_seq, result) in (1usize..).zip(results.iter().take(max_products)) {
        let best = result.best_record();
        let product_id = product_seq.to_string();

        let image = if best.image_url.is_empty() {
            format!(
                "https://images.pexels.com/photos/{}/product.jpg?{}",
                300_000 + product_seq,
                IMAGE_QUERY
            )
        } else {
            best.image_url.clone()
        };

        products.push(ProductEntry {
            id: product_id.clone(),
            name: best.product_name.clone(),
            brand: "Generic".to_string(),
            category: best.category.clone(),
            barcode: format!("{}{}", BARCODE_PREFIX, product_seq),
            image,
            unit: "each".to_string(),
            unit_size: best.unit.clone(),
        });

        for record in &result.all_records {
            let brand_id = retailer_id(&record.retailer);
            prices.push(PriceEntry {
                id: format!("{}-{}", product_id, price_seq),
                product_id: product_id.clone(),
                retailer: RetailerEntry {
                    id: brand_id.to_string(),
                    name: record.retailer.clone(),
                    logo: format!(
                        "https://images.pexels.com/photos/{}/logo.jpg?{}",
                        400_000 + price_seq,
                        LOGO_QUERY
                    ),
                    color: retailer_color(&record.retailer).to_string(),
                    locations: vec![default_location(brand_id, &record.retailer)],
                },
                price: record.current_price.unwrap_or_default(),
                on_sale: false,
                last_updated: record.last_updated,
                availability: record.availability_status.as_str().replace('_', "-"),
            });
            price_seq += 1;
        }
    }

    let summary = PresentationSummary {
        total_products: products.len(),
        total_prices: prices.len(),
        avg_savings: average_savings(results),
    };

    PresentationData {
        products,
        prices,
        last_updated: generated_at,
        summary,
    }
}

fn default_location(retailer_id: &str, retailer_name: &str) -> LocationEntry {
    LocationEntry {
        id: format!("{}-1", retailer_id),
        name: format!("{} Centurion", retailer_name),
        address: "Centurion Mall, Centurion".to_string(),
        distance: 2.3,
        coordinates: [-25.8553, 28.1881],
        opening_hours: "Mon-Sun: 8:00-21:00".to_string(),
    }
}
