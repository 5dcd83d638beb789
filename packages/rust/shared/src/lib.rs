//! Shared types, error model, and configuration for tenderstat.
//!
//! This crate is the foundation depended on by all other tenderstat crates.
//! It provides:
//! - [`TenderStatError`]: the unified error type
//! - Domain types ([`RawRecord`], [`CleanedRecord`], [`AggregateRow`], [`Category`])
//! - Configuration ([`AppConfig`], [`PipelinePolicy`], [`SourceConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CategoryLabels, PipelineConfig, PipelinePolicy, SourceConfig, SourceSection,
    config_dir, config_file_path, init_config, load_config, load_config_from, validate_config,
};
pub use error::{Result, TenderStatError};
pub use types::{
    AggregateRow, Category, CleanedRecord, CountRow, ParsedRecords, RawField, RawRecord,
    RecordId, RejectReason, RejectedElement, ValueRow, Winner, WinnerField, parse_records,
};
