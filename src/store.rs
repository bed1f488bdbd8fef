//! Flat-file storage.
//!
//! Everything a run produces lives under `data_dir`:
//!
//! ```text
//! data/
//! ├── checkers/
//! │   ├── 2026-10-18_prices.csv
//! │   ├── 2026-10-19_prices.csv
//! │   └── errors_2026-10-19.txt
//! ├── extraction_summary_2026-10-19.json
//! └── integration_report_2026-10-19.json
//! ```
//!
//! Price files are dated by name, one per retailer per day. Writing a
//! date's file never touches other dates.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use sakkie_core::models::{Availability, ProductRecord};
use sakkie_core::validate::ValidationIssue;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const PRICES_SUFFIX: &str = "_prices.csv";
pub const PRESENTATION_FILE: &str = "price-data.json";

pub fn retailer_dir(data_dir: &Path, key: &str) -> PathBuf {
    data_dir.join(key)
}

pub fn prices_path(data_dir: &Path, key: &str, date: NaiveDate) -> PathBuf {
    retailer_dir(data_dir, key).join(format!("{}{}", date.format("%Y-%m-%d"), PRICES_SUFFIX))
}

pub fn errors_path(data_dir: &Path, key: &str, date: NaiveDate) -> PathBuf {
    retailer_dir(data_dir, key).join(format!("errors_{}.txt", date.format("%Y-%m-%d")))
}

/// Error file for a stored batch that failed validation on load:
/// `2026-10-18_prices.csv` → `2026-10-18_prices.errors.txt`.
pub fn load_errors_path(prices_file: &Path) -> PathBuf {
    prices_file.with_extension("errors.txt")
}

pub fn summary_path(data_dir: &Path, date: NaiveDate) -> PathBuf {
    data_dir.join(format!("extraction_summary_{}.json", date.format("%Y-%m-%d")))
}

pub fn report_path(data_dir: &Path, date: NaiveDate) -> PathBuf {
    data_dir.join(format!("integration_report_{}.json", date.format("%Y-%m-%d")))
}

pub fn presentation_path(output_dir: &Path) -> PathBuf {
    output_dir.join(PRESENTATION_FILE)
}

/// One CSV row. Every column is text here; typing happens in
/// [`PriceRow::into_record`].
#[derive(Debug, Serialize, Deserialize)]
struct PriceRow {
    product_id: String,
    product_name: String,
    current_price: String,
    availability_status: String,
    last_updated: String,
    retailer: String,
    category: String,
    unit: String,
    image_url: String,
}

impl PriceRow {
    fn from_record(record: &ProductRecord) -> Self {
        Self {
            product_id: record.product_id.clone(),
            product_name: record.product_name.clone(),
            current_price: record
                .current_price
                .map(|p| p.to_string())
                .unwrap_or_default(),
            availability_status: record.availability_status.to_string(),
            last_updated: record
                .last_updated
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default(),
            retailer: record.retailer.clone(),
            category: record.category.clone(),
            unit: record.unit.clone(),
            image_url: record.image_url.clone(),
        }
    }

    /// Unparseable price or timestamp become `None`. An unknown
    /// availability token is reported and stored as `Unknown`.
    fn into_record(self, index: usize) -> (ProductRecord, Option<ValidationIssue>) {
        let current_price = Decimal::from_str(self.current_price.trim()).ok();
        let last_updated = DateTime::parse_from_rfc3339(self.last_updated.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc));

        let (availability_status, issue) = match self.availability_status.parse::<Availability>()
        {
            Ok(a) => (a, None),
            Err(_) => (
                Availability::Unknown,
                Some(ValidationIssue::InvalidAvailability {
                    index,
                    status: self.availability_status.clone(),
                }),
            ),
        };

        let record = ProductRecord {
            product_id: self.product_id,
            product_name: self.product_name,
            current_price,
            availability_status,
            last_updated,
            retailer: self.retailer,
            category: self.category,
            unit: self.unit,
            image_url: self.image_url,
        };
        (record, issue)
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Write a batch as CSV with a header row, replacing any file at `path`.
pub fn write_prices(path: &Path, records: &[ProductRecord]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for record in records {
        writer.serialize(PriceRow::from_record(record))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Records read back from a price file, plus row-level problems that
/// validation should see.
#[derive(Debug, Default)]
pub struct LoadedBatch {
    pub records: Vec<ProductRecord>,
    pub issues: Vec<ValidationIssue>,
}

pub fn load_prices(path: &Path) -> Result<LoadedBatch> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut batch = LoadedBatch::default();
    for (index, row) in reader.deserialize::<PriceRow>().enumerate() {
        let row = row.with_context(|| format!("Bad row {} in {}", index + 1, path.display()))?;
        let (record, issue) = row.into_record(index);
        batch.records.push(record);
        batch.issues.extend(issue);
    }
    Ok(batch)
}

/// Run date encoded in a price file name (`2026-10-19_prices.csv`).
pub fn price_file_date(path: &Path) -> Option<NaiveDate> {
    let stem = path.file_name()?.to_str()?.strip_suffix(PRICES_SUFFIX)?;
    NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
}

/// All dated price files in a retailer directory, oldest first.
///
/// Only names of the form `<YYYY-MM-DD>_prices.csv` count. A missing
/// directory yields an empty list.
pub fn list_price_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
    {
        let path = entry?.path();
        if let Some(date) = price_file_date(&path) {
            if path.is_file() {
                files.push((date, path));
            }
        }
    }
    files.sort();
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

pub fn latest_price_file(dir: &Path) -> Result<Option<PathBuf>> {
    Ok(list_price_files(dir)?.pop())
}

/// Persist validation messages, one per line.
pub fn write_errors(path: &Path, messages: &[String]) -> Result<()> {
    ensure_parent(path)?;
    std::fs::write(path, messages.join("\n"))
        .with_context(|| format!("Failed to write {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(name: &str, price: &str) -> ProductRecord {
        ProductRecord {
            product_id: format!("checkers-{}", name.to_lowercase()),
            product_name: name.to_string(),
            current_price: Some(Decimal::from_str(price).unwrap()),
            availability_status: Availability::LowStock,
            last_updated: Some(Utc.with_ymd_and_hms(2026, 10, 19, 7, 30, 0).unwrap()),
            retailer: "Checkers".to_string(),
            category: "Fresh Produce".to_string(),
            unit: "per kg".to_string(),
            image_url: "https://img.example/bananas, ripe.jpg".to_string(),
        }
    }

    #[test]
    fn dated_paths() {
        let data = Path::new("/data");
        let d = date("2026-10-19");
        assert_eq!(
            prices_path(data, "pick_n_pay", d),
            PathBuf::from("/data/pick_n_pay/2026-10-19_prices.csv")
        );
        assert_eq!(
            errors_path(data, "spar", d),
            PathBuf::from("/data/spar/errors_2026-10-19.txt")
        );
        assert_eq!(
            summary_path(data, d),
            PathBuf::from("/data/extraction_summary_2026-10-19.json")
        );
        assert_eq!(
            load_errors_path(Path::new("/data/spar/2026-10-18_prices.csv")),
            PathBuf::from("/data/spar/2026-10-18_prices.errors.txt")
        );
    }

    #[test]
    fn written_batch_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = prices_path(dir.path(), "checkers", date("2026-10-19"));
        let records = vec![record("Bananas", "19.99"), record("Large Eggs", "34.99")];

        write_prices(&path, &records).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(
            "product_id,product_name,current_price,availability_status,last_updated,retailer,category,unit,image_url"
        ));

        let batch = load_prices(&path).unwrap();
        assert!(batch.issues.is_empty());
        assert_eq!(batch.records, records);
    }

    #[test]
    fn bad_fields_are_nulled_or_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2026-10-19_prices.csv");
        std::fs::write(
            &path,
            "product_id,product_name,current_price,availability_status,last_updated,retailer,category,unit,image_url\n\
             a,Bananas,abc,in_stock,yesterday,Checkers,Fresh Produce,per kg,\n\
             b,Milk,22.99,maybe,2026-10-19T07:30:00Z,Checkers,Dairy,1L,\n",
        )
        .unwrap();

        let batch = load_prices(&path).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].current_price, None);
        assert_eq!(batch.records[0].last_updated, None);
        assert_eq!(batch.records[1].availability_status, Availability::Unknown);
        assert_eq!(
            batch.issues,
            vec![ValidationIssue::InvalidAvailability {
                index: 1,
                status: "maybe".to_string()
            }]
        );
    }

    #[test]
    fn latest_file_is_picked_by_date_in_name() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "2026-10-19_prices.csv",
            "2026-09-30_prices.csv",
            "2026-10-02_prices.csv",
            "errors_2026-10-20.txt",
            "notes.csv",
            "manual_prices.csv",
            "2026-13-01_prices.csv",
        ] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        let files = list_price_files(dir.path()).unwrap();
        assert_eq!(files.len(), 3);
        assert_eq!(
            latest_price_file(dir.path()).unwrap(),
            Some(dir.path().join("2026-10-19_prices.csv"))
        );
    }

    #[test]
    fn price_file_date_requires_iso_date_stem() {
        assert_eq!(
            price_file_date(Path::new("/data/spar/2026-10-19_prices.csv")),
            Some(date("2026-10-19"))
        );
        assert_eq!(price_file_date(Path::new("/data/spar/manual_prices.csv")), None);
        assert_eq!(price_file_date(Path::new("/data/spar/2026-10-19_prices.txt")), None);
    }

    #[test]
    fn missing_directory_has_no_files() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(latest_price_file(&dir.path().join("nope")).unwrap(), None);
    }

    #[test]
    fn writing_a_date_leaves_other_dates_alone() {
        let dir = tempfile::tempdir().unwrap();
        let old = prices_path(dir.path(), "checkers", date("2026-10-18"));
        let new = prices_path(dir.path(), "checkers", date("2026-10-19"));
        write_prices(&old, &[record("Bananas", "19.99")]).unwrap();
        write_prices(&new, &[record("Bananas", "18.49")]).unwrap();

        let old_batch = load_prices(&old).unwrap();
        assert_eq!(
            old_batch.records[0].current_price,
            Some(Decimal::from_str("19.99").unwrap())
        );
    }
}
