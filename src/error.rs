// ⚠️ Pipeline errors
// Domain failures that abort a run. I/O and process-boundary errors stay in anyhow.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source discovery found nothing to process
    #[error("no CSV files to process in {}.. aborting", .dir.display())]
    NoInputFiles { dir: PathBuf },

    /// A column the normalizer relies on is not in the table
    #[error("column not found: {column}")]
    MissingColumn { column: String },

    /// Numeric coercion is all-or-nothing per column
    #[error("unable to parse {value:?} as a number in column {column} (row {row})")]
    NumericCoercion {
        column: String,
        row: usize,
        value: String,
    },

    /// Date coercion is all-or-nothing per column
    #[error("unable to parse {value:?} as a date in column {column} (row {row})")]
    DateCoercion {
        column: String,
        row: usize,
        value: String,
    },

    /// License type/number split needs exactly one hyphen
    #[error("expected exactly one '-' in license value {value:?} (row {row})")]
    LicenseSplit { row: usize, value: String },

    /// Secret payload did not decode into database credentials
    #[error("secret {secret_id} is not a valid credential bundle: {source}")]
    InvalidSecret {
        secret_id: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
