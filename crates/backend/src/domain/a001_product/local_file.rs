//! Local fallback persistence: the whole store as one JSON file,
//! written wholesale after every mutation. There is no partial-write
//! protection; the file is small and the write is a single syscall.

use std::fs;
use std::path::Path;

use super::ProductStore;

/// Write the whole store to `path`, creating parent directories as needed
pub fn save(path: &Path, store: &ProductStore) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(store)?;
    fs::write(path, json)?;
    tracing::debug!("Saved {} products to {}", store.len(), path.display());
    Ok(())
}

/// Load the store from `path`. A missing file is an empty store, not an
/// error; a corrupt file is surfaced to the caller.
pub fn load(path: &Path) -> anyhow::Result<ProductStore> {
    if !path.exists() {
        tracing::info!("No local data file at {}, starting empty", path.display());
        return Ok(ProductStore::new());
    }
    let contents = fs::read_to_string(path)?;
    let store: ProductStore = serde_json::from_str(&contents)?;
    tracing::info!("Loaded {} products from {}", store.len(), path.display());
    Ok(store)
}
