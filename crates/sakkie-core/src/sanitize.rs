//! Best-effort cleanup of retailer-supplied text.
//!
//! Retailer pages and feeds are inconsistent: prices arrive as `"R24.99"`,
//! `"R 1,299.00"` or `"Call for price"`, names carry stray whitespace, and
//! stock status is free text. These helpers turn that into the typed
//! fields of a [`ProductRecord`](crate::models::ProductRecord). None of
//! them fail; unusable input becomes `None` or a default.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::models::Availability;

/// Maximum length (in characters) of any sanitized free-text field.
pub const MAX_TEXT_LEN: usize = 200;

/// Keyword rules, checked in order.
const AVAILABILITY_RULES: [(&[&str], Availability); 3] = [
    (&["in stock", "available", "yes"], Availability::InStock),
    (&["low stock", "limited", "few left"], Availability::LowStock),
    (&["out of stock", "unavailable", "sold out"], Availability::OutOfStock),
];

fn price_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"R?\s*(\d+(?:\.\d{2})?)").expect("price pattern is a valid regex")
    })
}

/// Extract the first currency-like numeric token from `text`.
///
/// Thousands separators are dropped before matching, so `"R1,299.00"`
/// parses as `1299.00`. Returns `None` when no digits are present.
///
/// ```rust
/// use sakkie_core::sanitize::sanitize_price;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(sanitize_price("R24.99"), Some(Decimal::from_str("24.99").unwrap()));
/// assert_eq!(sanitize_price("Call for price"), None);
/// ```
pub fn sanitize_price(text: &str) -> Option<Decimal> {
    if text.trim().is_empty() {
        return None;
    }
    let cleaned = text.replace(',', "");
    let caps = price_pattern().captures(&cleaned)?;
    Decimal::from_str(caps.get(1)?.as_str()).ok()
}

/// Collapse whitespace runs to a single space, trim, and cap the length at
/// [`MAX_TEXT_LEN`] characters.
pub fn sanitize_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_TEXT_LEN {
        collapsed
    } else {
        collapsed.chars().take(MAX_TEXT_LEN).collect()
    }
}

/// Map free-text stock information onto an [`Availability`].
///
/// Keyword membership on the lowercased text, in-stock terms first,
/// then low stock, then out of stock. `"unavailable"` contains
/// `"available"` and so reads as in stock. Anything unrecognized
/// (including empty text) is treated as in stock.
pub fn classify_availability(text: &str) -> Availability {
    let text = text.to_lowercase();
    AVAILABILITY_RULES
        .iter()
        .find(|(terms, _)| terms.iter().any(|t| text.contains(t)))
        .map(|(_, status)| *status)
        .unwrap_or(Availability::InStock)
}

/// Grouping key for a product name: lowercase, trimmed, with internal
/// whitespace runs collapsed.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Build a product id for listings that do not carry one:
/// `{retailer}-{name}-{unix_ts}` with every character outside `[a-z0-9]`
/// replaced by `-`.
pub fn generate_product_id(retailer: &str, product_name: &str, unix_ts: i64) -> String {
    format!(
        "{}-{}-{}",
        slug(retailer),
        slug(product_name),
        unix_ts
    )
}

fn slug(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .collect()
}
