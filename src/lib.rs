//! # Sakkie
//!
//! Grocery price tracking for South African retailers.
//!
//! Sakkie collects product listings from each configured retailer, keeps
//! one dated flat file per retailer per day, and aggregates the latest
//! files into a cheapest-price comparison for a storefront.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌─────────────┐   ┌──────────────────┐
//! │  Sources   │──▶│ Collector  │──▶│ Flat files  │──▶│    Aggregator    │
//! │ HTTP/File  │   │ sanitize + │   │ data/<key>/ │   │ best price +     │
//! └────────────┘   │ validate   │   │ <date>.csv  │   │ presentation     │
//!                  └────────────┘   └─────────────┘   └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! sakkie collect      # fetch every retailer, write today's files
//! sakkie aggregate    # merge latest files, write price-data.json
//! sakkie run          # both, plus a check of stored files
//! sakkie retailers    # list retailers and their stored files
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`source`] | HTTP and file listing sources |
//! | [`rate_limit`] | Request pacing |
//! | [`store`] | Dated CSV files and JSON reports |
//! | [`collect`] | Collection stage |
//! | [`integrate`] | Aggregation stage |
//! | [`pipeline`] | Collect, aggregate and verify |
//! | [`retailers`] | Stored file listing |
//!
//! Pure record types and algorithms live in the `sakkie-core` crate.

pub mod collect;
pub mod config;
pub mod integrate;
pub mod pipeline;
pub mod rate_limit;
pub mod retailers;
pub mod source;
pub mod store;
