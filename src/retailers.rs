//! `sakkie retailers`: what is configured and what is on disk.

use anyhow::Result;

use crate::config::Config;
use crate::store;

/// Stored price files for one retailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetailerFiles {
    pub key: String,
    pub name: String,
    pub source: &'static str,
    pub files: usize,
    /// File name of the newest dated price file.
    pub latest: Option<String>,
}

pub fn retailer_files(config: &Config) -> Result<Vec<RetailerFiles>> {
    let mut rows = Vec::with_capacity(config.retailers.len());
    for retailer in &config.retailers {
        let dir = store::retailer_dir(&config.storage.data_dir, &retailer.key);
        let files = store::list_price_files(&dir)?;
        let latest = files
            .last()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned());
        rows.push(RetailerFiles {
            key: retailer.key.clone(),
            name: retailer.name.clone(),
            source: retailer.source.kind(),
            files: files.len(),
            latest,
        });
    }
    Ok(rows)
}

pub fn print_retailer_files(rows: &[RetailerFiles]) {
    println!(
        "{:<16} {:<16} {:<8} {:<6} LATEST",
        "KEY", "NAME", "SOURCE", "FILES"
    );
    for row in rows {
        println!(
            "{:<16} {:<16} {:<8} {:<6} {}",
            row.key,
            row.name,
            row.source,
            row.files,
            row.latest.as_deref().unwrap_or("-")
        );
    }
}

pub fn list_retailers(config: &Config) -> Result<()> {
    print_retailer_files(&retailer_files(config)?);
    Ok(())
}
