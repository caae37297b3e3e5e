//! Command implementations.

pub mod catalog;
pub mod completions;
pub mod embed;
pub mod evaluate;
pub mod init;
pub mod load;
pub mod recommend;

use std::path::PathBuf;

use crate::catalog::CatalogStore;
use crate::config::{resolve_data_dir, resolve_db_path, Settings};
use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use crate::providers::create_providers;

/// Open the catalog database, failing when it was never initialized.
pub(crate) fn open_store(db: Option<&PathBuf>) -> Result<CatalogStore> {
    let path = resolve_db_path(db.map(PathBuf::as_path)).ok_or(Error::NotInitialized)?;
    if !path.exists() {
        return Err(Error::NotInitialized);
    }
    CatalogStore::open(&path)
}

/// Build the serving pipeline from environment settings.
pub(crate) fn build_pipeline(db: Option<&PathBuf>) -> Result<Pipeline> {
    let settings = Settings::from_env()?;
    let store = open_store(db)?;
    let providers = create_providers(&settings);
    Ok(Pipeline::new(store, providers, settings))
}

/// Resolve the evaluation data directory.
pub(crate) fn data_dir(explicit: Option<&PathBuf>) -> Result<PathBuf> {
    resolve_data_dir(explicit.map(PathBuf::as_path))
        .ok_or_else(|| Error::Config("cannot resolve a data directory".into()))
}
