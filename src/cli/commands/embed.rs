//! Embed command: the embedding regeneration job.

use std::path::PathBuf;

use super::open_store;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::ingest::regenerate_embeddings;
use crate::providers::create_providers;

pub fn execute(
    db: Option<&PathBuf>,
    force: bool,
    batch_size: Option<usize>,
    json: bool,
) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;
    rt.block_on(execute_async(db, force, batch_size, json))
}

async fn execute_async(
    db: Option<&PathBuf>,
    force: bool,
    batch_size: Option<usize>,
    json: bool,
) -> Result<()> {
    let settings = Settings::from_env()?;
    let providers = create_providers(&settings);
    let mut store = open_store(db)?;

    let info = providers.embedder.info();
    if !json {
        println!("Embedding provider: {} ({})", info.name, info.model);
    }

    let stats = regenerate_embeddings(&mut store, &providers.embedder, force, batch_size).await?;

    if json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        println!("Embedding run complete.");
        println!("  Processed: {}", stats.processed);
        println!("  Skipped:   {}", stats.skipped);
        println!("  Failed:    {}", stats.failed);
    }
    Ok(())
}
