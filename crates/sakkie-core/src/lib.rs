//! # Sakkie Core
//!
//! Pure logic for Sakkie: price records, listing sanitization, batch
//! validation, best-price aggregation, run statistics, and the shapes
//! handed to the presentation layer.
//!
//! This crate contains no tokio, HTTP, or filesystem I/O. Everything here
//! is a deterministic transform over in-memory records so the whole
//! normalization and selection core can be tested without a network.

pub mod aggregate;
pub mod listing;
pub mod models;
pub mod presentation;
pub mod report;
pub mod sanitize;
pub mod stats;
pub mod validate;
