// 📂 Source discovery + lenient CSV loading
// Malformed rows are skipped, never fatal

use crate::error::PipelineError;
use crate::table::{Table, Value};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// A raw table plus what the loader learned while reading it
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    pub source_file: String,
    pub skipped_rows: usize,
    /// SHA-256 of the file bytes (hex)
    pub checksum: String,
}

/// List the `.csv` files (case-insensitive) in a directory, sorted by name.
///
/// Fails with `NoInputFiles` when there are none, so nothing downstream runs
/// against missing inputs.
pub fn discover_csv_files(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory: {}", dir.display()))?;

    let mut csv_files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.to_lowercase().ends_with(".csv") {
            csv_files.push(name);
        }
    }
    csv_files.sort();

    if csv_files.is_empty() {
        return Err(PipelineError::NoInputFiles {
            dir: dir.to_path_buf(),
        }
        .into());
    }

    println!("Found {} CSV files for processing", csv_files.len());
    Ok(csv_files)
}

/// Read a CSV file with a header row into a raw table.
///
/// Rows whose field count differs from the header, or that fail to parse,
/// are dropped and counted. Empty cells and missing-value markers such as
/// `N/A` or `NULL` load as null.
pub fn load_csv_table(path: &Path) -> Result<LoadedTable> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let checksum = format!("{:x}", Sha256::digest(&bytes));
    let source_file = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown.csv")
        .to_string();

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header in {}", source_file))?
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();

    let mut table = Table::new(infer_column_names(&headers));
    let width = table.columns().len();
    let mut skipped_rows = 0;

    for (line_num, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!(file = %source_file, line = line_num + 2, error = %e, "skipping unparseable row");
                skipped_rows += 1;
                continue;
            }
        };

        if record.len() != width {
            debug!(
                file = %source_file,
                line = line_num + 2, // +2 because: 1-indexed + header row
                expected = width,
                found = record.len(),
                "skipping row with wrong field count"
            );
            skipped_rows += 1;
            continue;
        }

        table.push_row(record.iter().map(Value::from_cell).collect());
    }

    info!(
        file = %source_file,
        rows = table.len(),
        skipped = skipped_rows,
        "loaded source table"
    );

    Ok(LoadedTable {
        table,
        source_file,
        skipped_rows,
        checksum,
    })
}

/// Header names the way a dataframe reader infers them: blank names become
/// `Unnamed: <idx>`, repeats get `.1`, `.2`, ... suffixes.
fn infer_column_names(headers: &[String]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(headers.len());

    for (idx, header) in headers.iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            header.clone()
        };

        let seen = counts.entry(base.clone()).or_insert(0);
        let name = if *seen == 0 {
            base
        } else {
            format!("{}.{}", base, seen)
        };
        *seen += 1;
        names.push(name);
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_discover_csv_files_case_insensitive() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "b.CSV", "a\n1\n");
        write_file(&dir, "a.csv", "a\n1\n");
        write_file(&dir, "notes.txt", "hello");

        let files = discover_csv_files(dir.path()).unwrap();
        assert_eq!(files, vec!["a.csv".to_string(), "b.CSV".to_string()]);
    }

    #[test]
    fn test_discover_empty_dir_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "readme.md", "nothing here");

        let err = discover_csv_files(dir.path()).unwrap_err();
        let pipeline_err = err.downcast_ref::<PipelineError>();
        assert!(matches!(pipeline_err, Some(PipelineError::NoInputFiles { .. })));
    }

    #[test]
    fn test_load_skips_malformed_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "source.csv",
            "Name,Phone,City\nAcme,555-1234,Reno\nBroken,row\nGlobex,,Tulsa\nToo,many,fields,here\n",
        );

        let loaded = load_csv_table(&path).unwrap();

        assert_eq!(loaded.table.len(), 2);
        assert_eq!(loaded.skipped_rows, 2);
        assert_eq!(loaded.source_file, "source.csv");
        assert_eq!(loaded.checksum.len(), 64);
        assert_eq!(loaded.table.get(1, "Phone"), Some(&Value::Null));
        assert_eq!(loaded.table.get(1, "City"), Some(&Value::text("Tulsa")));
    }

    #[test]
    fn test_load_keeps_quoted_crlf() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "ok.csv",
            "Company,Primary Caregiver\r\n\"Tiny Tots\",\"Jane Doe\r\nDirector\"\r\n",
        );

        let loaded = load_csv_table(&path).unwrap();
        assert_eq!(
            loaded.table.get(0, "Primary Caregiver"),
            Some(&Value::text("Jane Doe\r\nDirector"))
        );
    }

    #[test]
    fn test_infer_column_names() {
        let headers = vec![
            "".to_string(),
            "Name".to_string(),
            "Name".to_string(),
            " ".to_string(),
        ];
        assert_eq!(
            infer_column_names(&headers),
            vec!["Unnamed: 0", "Name", "Name.1", "Unnamed: 3"]
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_csv_table(&dir.path().join("missing.csv")).is_err());
    }

    #[test]
    fn test_missing_value_markers_load_as_null() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "tx.csv",
            "Name,Capacity,Phone
Lone Star,N/A,NULL
Bluebonnet,12,#N/A
Pecan,nan,None
",
        );

        let loaded = load_csv_table(&path).unwrap();

        assert_eq!(loaded.table.get(0, "Capacity"), Some(&Value::Null));
        assert_eq!(loaded.table.get(0, "Phone"), Some(&Value::Null));
        assert_eq!(loaded.table.get(1, "Capacity"), Some(&Value::text("12")));
        assert_eq!(loaded.table.get(1, "Phone"), Some(&Value::Null));
        assert_eq!(loaded.table.get(2, "Capacity"), Some(&Value::Null));
        assert_eq!(loaded.table.get(2, "Phone"), Some(&Value::Null));
    }
}
