// ⚙️ Pipeline configuration
// Fixed values for the batch run; nothing is read from flags or the environment

use crate::db::TARGET_TABLE;
use crate::sources::SourceType;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "../data/";
pub const DEFAULT_SECRETS_DIR: &str = "../secrets/";
pub const DEFAULT_DATABASE_DIR: &str = "../db/";
pub const DEFAULT_SECRET_ID: &str = "test_secret_name";
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding the agency CSV exports
    pub data_dir: PathBuf,
    /// Root of the file-backed secret store
    pub secrets_dir: PathBuf,
    /// Where the SQLite lead store lives
    pub database_dir: PathBuf,
    pub secret_id: String,
    pub region: String,
    pub target_table: String,
}

impl PipelineConfig {
    /// Same configuration, reading inputs from another directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_secrets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.secrets_dir = dir.into();
        self
    }

    pub fn with_database_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.database_dir = dir.into();
        self
    }

    /// Path of a source's fixed export file
    pub fn source_path(&self, source: SourceType) -> PathBuf {
        self.data_dir.join(source.file_name())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            secrets_dir: PathBuf::from(DEFAULT_SECRETS_DIR),
            database_dir: PathBuf::from(DEFAULT_DATABASE_DIR),
            secret_id: DEFAULT_SECRET_ID.to_string(),
            region: DEFAULT_REGION.to_string(),
            target_table: TARGET_TABLE.to_string(),
        }
    }
}
