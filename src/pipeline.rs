// 🚚 Lead pipeline - discovery → load → normalize → unify → persist
// Strictly forward, single pass, no retries

use crate::config::PipelineConfig;
use crate::data_quality::{provenance, RunSummary, SourceSummary};
use crate::db::{LeadSink, LoadRun};
use crate::loader::{discover_csv_files, load_csv_table, LoadedTable};
use crate::secrets::SecretStore;
use crate::sources::{get_normalizer, SourceType};
use crate::table::Table;
use anyhow::{Context, Result};
use tracing::info;

/// Run every stage once, in order.
///
/// Discovery failing (no CSV files) stops the run before anything is loaded.
/// Any coercion failure aborts the run; nothing is persisted in that case.
pub fn run<S, K>(config: &PipelineConfig, secrets: &S, sink: &mut K) -> Result<RunSummary>
where
    S: SecretStore + ?Sized,
    K: LeadSink + ?Sized,
{
    // 1. Source discovery
    let files = discover_csv_files(config.data_dir())?;

    // 2. Load the three known exports
    let loaded = load_sources(config)?;
    println!("Read in all CSV files");

    // 3 + 4. Normalize and flag duplicates, per source
    let (normalized, summaries) = normalize_sources(loaded)?;

    // 5. Unify
    println!("Combining dataframes into 1 before saving to database");
    let unified = Table::concat(normalized);
    info!(rows = unified.len(), columns = unified.columns().len(), "unified lead table");

    // 6. Persist
    let credentials = secrets
        .fetch_credentials(&config.secret_id, &config.region)
        .context("Failed to fetch database credentials")?;
    let run = LoadRun::new(provenance(&summaries));
    let rows_written = sink
        .write(&unified, &credentials, &run)
        .context("Failed to save leads")?;
    println!("Saved to database");

    Ok(RunSummary {
        run_id: run.run_id,
        files_found: files.len(),
        sources: summaries,
        unified_rows: unified.len(),
        unified_columns: unified.columns().len(),
        rows_written,
    })
}

/// Read each source's fixed export file
pub fn load_sources(config: &PipelineConfig) -> Result<Vec<(SourceType, LoadedTable)>> {
    SourceType::ALL
        .iter()
        .map(|source| {
            let path = config.source_path(*source);
            load_csv_table(&path)
                .with_context(|| format!("Failed to load {} data", source.name()))
                .map(|loaded| (*source, loaded))
        })
        .collect()
}

/// Normalize each raw table independently. Every table is owned by its
/// normalizer, so no source sees another source's rows.
pub fn normalize_sources(
    loaded: Vec<(SourceType, LoadedTable)>,
) -> Result<(Vec<Table>, Vec<SourceSummary>)> {
    let mut tables = Vec::with_capacity(loaded.len());
    let mut summaries = Vec::with_capacity(loaded.len());

    for (source, mut loaded_table) in loaded {
        println!("Standardizing {} data", source.name());

        let raw = std::mem::take(&mut loaded_table.table);
        let table = get_normalizer(source)
            .normalize(raw)
            .with_context(|| format!("Failed to standardize {} data", source.name()))?;

        let summary = SourceSummary::new(source, &loaded_table, &table);
        println!("✓ {}", summary.summary());

        summaries.push(summary);
        tables.push(table);
    }

    Ok((tables, summaries))
}
