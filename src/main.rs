//! # Sakkie CLI (`sakkie`)
//!
//! ```bash
//! sakkie --config ./config/sakkie.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sakkie collect` | Fetch listings from every retailer and write today's price files |
//! | `sakkie aggregate` | Merge the latest price files and write the comparison data |
//! | `sakkie run` | Collect, aggregate, then list stored files |
//! | `sakkie retailers` | List configured retailers and their stored files |
//!
//! Logs go to stderr (`RUST_LOG` overrides the default `info` level);
//! command results go to stdout.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use sakkie::{collect, config, integrate, pipeline, retailers};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Sakkie: grocery price collection and comparison.
#[derive(Parser)]
#[command(
    name = "sakkie",
    about = "Sakkie: collect grocery prices per retailer and find the cheapest offer",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/sakkie.toml")]
    config: PathBuf,

    /// Run date used in file names (YYYY-MM-DD). Defaults to today.
    #[arg(long, global = true)]
    date: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, sanitize and validate listings; write one price file per retailer.
    Collect,

    /// Merge the latest price file of each retailer and compute best prices.
    ///
    /// Writes the storefront data file and the integration report. Fails
    /// when no retailer has a valid price file.
    Aggregate,

    /// Collect, then aggregate, then list stored price files.
    Run,

    /// List configured retailers with their stored price files.
    Retailers,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let cfg = config::load_config(&cli.config)?;
    let run_date = cli.date.unwrap_or_else(|| Local::now().date_naive());

    match cli.command {
        Commands::Collect => {
            collect::run_collect(&cfg, run_date).await?;
        }
        Commands::Aggregate => {
            integrate::run_aggregate(&cfg, run_date)?;
        }
        Commands::Run => {
            pipeline::run_pipeline(&cfg, run_date).await?;
        }
        Commands::Retailers => {
            retailers::list_retailers(&cfg)?;
        }
    }

    Ok(())
}
