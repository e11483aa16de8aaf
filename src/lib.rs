// Lead Normalizer - Core Library
// Agency licensing extracts → one normalized lead table → relational store

pub mod coerce;
pub mod config;
pub mod data_quality;
pub mod db;
pub mod deduplication;
pub mod error;
pub mod loader;
pub mod logging;
pub mod pipeline;
pub mod secrets;
pub mod sources;
pub mod table;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use data_quality::{RunSummary, SourceSummary};
pub use db::{LeadSink, LoadRun, SqliteSink, TARGET_TABLE};
pub use deduplication::{flag_duplicates, DUPLICATE_COLUMNS};
pub use error::PipelineError;
pub use loader::{discover_csv_files, load_csv_table, LoadedTable};
pub use pipeline::run;
pub use secrets::{DatabaseCredentials, FileSecretStore, SecretStore};
pub use sources::{
    get_normalizer, NevadaNormalizer, OklahomaNormalizer, SourceNormalizer, SourceType,
    TexasNormalizer,
};
pub use table::{Table, Value};
