//! Record normalization and aggregation pipeline for tenderstat.
//!
//! This crate is pure and synchronous: it never performs I/O. It turns one
//! batch of upstream procurement records into cleaned per-category tables and
//! tidy aggregate tables (see [`pipeline::run_json`]).

pub mod aggregate;
pub mod classify;
pub mod clean;
pub mod currency;
pub mod pipeline;
pub mod winners;
pub mod year;

pub use aggregate::{Aggregates, CategoryTables};
pub use pipeline::{NoDataReason, PipelineOutcome, PipelineResult, RunReport, run, run_fetched, run_json};
