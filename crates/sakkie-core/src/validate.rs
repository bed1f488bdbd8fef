//! Batch integrity checks run before a retailer's records are published.
//!
//! Validation is advisory: it never aborts a run. A batch that fails is
//! kept out of the merge and its messages are persisted by the caller.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::ProductRecord;

/// A single integrity problem, addressed by the record's position in its
/// batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("Product {index}: Missing product name")]
    MissingName { index: usize },
    #[error("Product {index}: Invalid price: {}", display_price(.price))]
    InvalidPrice {
        index: usize,
        price: Option<Decimal>,
    },
    #[error("Product {index}: Missing retailer")]
    MissingRetailer { index: usize },
    #[error("Product {index}: Invalid availability status: {status}")]
    InvalidAvailability { index: usize, status: String },
}

fn display_price(price: &Option<Decimal>) -> String {
    match price {
        Some(p) => p.to_string(),
        None => "None".to_string(),
    }
}

/// Outcome of validating one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
    }

    /// Append issues found elsewhere (e.g. while loading a flat file).
    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.errors.extend(issues);
    }

    /// One human-readable line per issue, in batch order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Check every record of a batch.
///
/// Per record: non-empty name, price present and strictly positive,
/// non-empty retailer. Availability is already constrained by its type;
/// stored tokens outside the enum are reported by the loader as
/// [`ValidationIssue::InvalidAvailability`].
pub fn validate_batch(records: &[ProductRecord]) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (index, record) in records.iter().enumerate() {
        if record.product_name.trim().is_empty() {
            report.push(ValidationIssue::MissingName { index });
        }

        match record.current_price {
            Some(price) if price > Decimal::ZERO => {}
            price => report.push(ValidationIssue::InvalidPrice { index, price }),
        }

        if record.retailer.trim().is_empty() {
            report.push(ValidationIssue::MissingRetailer { index });
        }
    }

    report
}
