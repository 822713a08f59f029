//! Loaders for the two standalone name tables. Both share the same contract:
//! trim, drop empties, bulk insert with duplicates silently absorbed, report
//! the resulting table count.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::database::repo::CollectionStore;
use crate::ingest::source::{self, NameRow};

pub fn load_mediums(store: &mut CollectionStore, path: &Path) -> Result<usize> {
    let names = read_names(path)?;
    let count = store.bulk_insert_mediums(&names)?;
    info!("Loaded medium categories: {} total", count);
    Ok(count)
}

/// The artist export currently carries only a name column. `period_style`
/// stays NULL here; the schema supports it for sources that provide one.
pub fn load_artists(store: &mut CollectionStore, path: &Path) -> Result<usize> {
    let names = read_names(path)?;
    let count = store.bulk_insert_artists(&names)?;
    info!("Loaded artists: {} total", count);
    Ok(count)
}

fn read_names(path: &Path) -> Result<Vec<String>> {
    let mut reader = source::open_reader(path)?;
    let mut names = Vec::new();
    for row in reader.deserialize::<NameRow>() {
        let row = row.with_context(|| format!("Malformed record in {}", path.display()))?;
        let name = row.name.trim();
        if !name.is_empty() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}
