//! Init command: create the catalog database.

use std::path::PathBuf;

use crate::catalog::CatalogStore;
use crate::config::resolve_db_path;
use crate::error::{Error, Result};

pub fn execute(db: Option<&PathBuf>, force: bool, json: bool) -> Result<()> {
    let path = resolve_db_path(db.map(PathBuf::as_path))
        .ok_or_else(|| Error::Config("cannot resolve a database path".into()))?;

    if path.exists() {
        if !force {
            return Err(Error::AlreadyInitialized { path });
        }
        std::fs::remove_file(&path)?;
    }

    CatalogStore::open(&path)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "initialized": true, "path": path })
        );
    } else {
        println!("Initialized catalog at {}", path.display());
        println!("Next: assessrec load <catalog.csv> && assessrec embed");
    }
    Ok(())
}
