//! Load command: CSV catalog ingestion.

use std::path::{Path, PathBuf};

use colored::Colorize;

use super::open_store;
use crate::error::Result;
use crate::ingest::load_into_store;

pub fn execute(db: Option<&PathBuf>, csv: &Path, json: bool) -> Result<()> {
    let mut store = open_store(db)?;
    let stats = load_into_store(&mut store, csv)?;

    if json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        println!("Loaded {} assessments from {}", stats.loaded, csv.display());
        if stats.skipped > 0 {
            println!("  {} malformed rows skipped", stats.skipped.to_string().yellow());
        }
        if stats.errors > 0 {
            println!("  {} rows failed to upsert", stats.errors.to_string().red());
        }
        println!("Run `assessrec embed` to generate embeddings.");
    }
    Ok(())
}
