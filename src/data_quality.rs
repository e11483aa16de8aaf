// ✅ Data quality summary - what each source contributed to a run

use crate::deduplication::count_flagged;
use crate::loader::LoadedTable;
use crate::sources::SourceType;
use crate::table::Table;
use serde::{Deserialize, Serialize};

// ============================================================================
// SOURCE SUMMARY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSummary {
    pub source: SourceType,
    pub source_file: String,
    pub rows: usize,
    pub skipped_rows: usize,
    pub duplicate_phone: usize,
    pub duplicate_address1: usize,
    pub checksum: String,
}

impl SourceSummary {
    /// Summarize one normalized table against the file it was loaded from
    pub fn new(source: SourceType, loaded: &LoadedTable, normalized: &Table) -> Self {
        SourceSummary {
            source,
            source_file: loaded.source_file.clone(),
            rows: normalized.len(),
            skipped_rows: loaded.skipped_rows,
            duplicate_phone: count_flagged(normalized, "phone"),
            duplicate_address1: count_flagged(normalized, "address1"),
            checksum: loaded.checksum.clone(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} rows ({} skipped) | {} duplicate phones, {} duplicate addresses",
            self.source.name(),
            self.rows,
            self.skipped_rows,
            self.duplicate_phone,
            self.duplicate_address1
        )
    }
}

// ============================================================================
// RUN SUMMARY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub files_found: usize,
    pub sources: Vec<SourceSummary>,
    pub unified_rows: usize,
    pub unified_columns: usize,
    pub rows_written: usize,
}

impl RunSummary {
    pub fn summary(&self) -> String {
        format!(
            "{} files found, {} leads unified across {} columns, {} written",
            self.files_found, self.unified_rows, self.unified_columns, self.rows_written
        )
    }

    pub fn total_duplicates(&self) -> usize {
        self.sources
            .iter()
            .map(|s| s.duplicate_phone + s.duplicate_address1)
            .sum()
    }
}

/// Provenance blob stored with the run
pub fn provenance(sources: &[SourceSummary]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for s in sources {
        map.insert(
            s.source.code().to_string(),
            serde_json::json!({
                "file": s.source_file,
                "rows": s.rows,
                "skipped_rows": s.skipped_rows,
                "sha256": s.checksum,
            }),
        );
    }
    serde_json::Value::Object(map)
}
