use anyhow::Result;

use lead_normalizer::logging::init_logging;
use lead_normalizer::{run, FileSecretStore, PipelineConfig, SqliteSink};

fn main() -> Result<()> {
    init_logging();

    let config = PipelineConfig::default();
    let secrets = FileSecretStore::new(&config.secrets_dir);
    let mut sink = SqliteSink::new(&config.database_dir, &config.target_table);

    let summary = run(&config, &secrets, &mut sink)?;

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ {}", summary.summary());
    println!("   Duplicates flagged: {}", summary.total_duplicates());
    println!("   Run: {}", summary.run_id);

    Ok(())
}
