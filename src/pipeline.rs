//! `sakkie run`: collect, aggregate, then check what landed on disk.

use anyhow::Result;
use chrono::NaiveDate;

use crate::collect::run_collect;
use crate::config::Config;
use crate::integrate::run_aggregate;
use crate::retailers::{print_retailer_files, retailer_files};

pub async fn run_pipeline(config: &Config, run_date: NaiveDate) -> Result<()> {
    tracing::info!(date = %run_date, "starting pipeline");

    run_collect(config, run_date).await?;
    run_aggregate(config, run_date)?;

    println!("verify");
    let rows = retailer_files(config)?;
    for row in rows.iter().filter(|r| r.files == 0) {
        tracing::warn!(retailer = %row.name, "no price files on disk");
    }
    print_retailer_files(&rows);
    println!("ok");

    tracing::info!("pipeline completed");
    Ok(())
}
