//! Two-pass artwork loader.
//!
//! Pass 1 walks the CSV once: each row's creator name and comma-separated
//! medium list are resolved against in-memory snapshots of the tables the
//! earlier stages filled, scalars are converted, and the resulting records
//! are accumulated for one batch insert. Pass 2 writes the artwork↔medium
//! links after the artworks exist in the store, as a single transaction.
//!
//! Rows are independent: a blank or unknown creator skips the row, an
//! unmatched medium token is dropped, and any conversion error is logged
//! with the row's Object ID and skipped. Nothing row-level ever aborts the
//! batch.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use indicatif::ProgressBar;
use tracing::{info, warn};

use crate::database::repo::{ArtworkRecord, CollectionStore};
use crate::ingest::source::{self, ArtworkRow};
use crate::ingest::LoadError;

const TITLE_FALLBACK: &str = "Untitled";

#[derive(Debug, Default)]
pub struct ArtworkStageReport {
    pub created: usize,
    pub linked: usize,
    pub skipped_rows: usize,
}

pub fn load_artworks(store: &mut CollectionStore, path: &Path) -> Result<ArtworkStageReport> {
    // Artists and mediums are fully loaded before this stage starts, so the
    // snapshots cannot go stale during the pass.
    let artists = store.artist_lookup()?;
    let mediums = store.medium_lookup()?;

    let mut reader = source::open_reader(path)?;

    let mut artworks: Vec<ArtworkRecord> = Vec::new();
    let mut medium_links: HashMap<i64, Vec<i64>> = HashMap::new();
    let mut skipped_rows = 0;

    let progress = ProgressBar::new_spinner();
    progress.set_message("Processing artwork rows");

    for result in reader.deserialize::<ArtworkRow>() {
        progress.tick();
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping unreadable artwork row: {}", e);
                skipped_rows += 1;
                continue;
            }
        };

        // No resolvable creator, no artwork. This covers blank names too.
        let Some(&artist_id) = artists.get(row.artist_display_name.trim()) else {
            skipped_rows += 1;
            continue;
        };

        match convert_row(&row, artist_id, &mediums) {
            Ok((record, medium_ids)) => {
                if !medium_ids.is_empty() {
                    medium_links.insert(record.object_id, medium_ids);
                }
                artworks.push(record);
            }
            Err(e) => {
                warn!("Error processing artwork ID {}: {}", row.object_id, e);
                skipped_rows += 1;
            }
        }
    }
    progress.finish_and_clear();

    // One batch, plain INSERT. A duplicate object_id fails the stage.
    store
        .bulk_insert_artworks(&artworks)
        .map_err(LoadError::Integrity)?;
    let created = store.table_count("artworks")?;
    info!("Loaded artworks: {} total ({} rows skipped)", created, skipped_rows);

    // The artworks are durable now, so the link rows have something to
    // reference. One transaction; a mid-way failure rolls back cleanly.
    let linked = store.replace_medium_links(&medium_links)?;
    info!("Linked mediums for {} artworks", linked);

    Ok(ArtworkStageReport {
        created,
        linked,
        skipped_rows,
    })
}

fn convert_row(
    row: &ArtworkRow,
    artist_id: i64,
    mediums: &HashMap<String, i64>,
) -> Result<(ArtworkRecord, Vec<i64>)> {
    let object_id: i64 = row.object_id.trim().parse()?;

    let record = ArtworkRecord {
        object_id,
        title: resolve_title(&row.title, &row.object_name),
        department: row.department.trim().to_string(),
        end_date_year: parse_end_year(&row.object_end_date),
        artist_id: Some(artist_id),
    };

    Ok((record, resolve_mediums(&row.medium, mediums)))
}

/// Title, falling back to the object name, falling back to "Untitled".
/// First non-empty wins.
fn resolve_title(title: &str, object_name: &str) -> String {
    let title = title.trim();
    if !title.is_empty() {
        return title.to_string();
    }
    let object_name = object_name.trim();
    if !object_name.is_empty() {
        return object_name.to_string();
    }
    TITLE_FALLBACK.to_string()
}

/// Only a purely numeric end date becomes a year. Anything else ("ca. 1750",
/// "1510-1520", blank) is unset, never zero.
fn parse_end_year(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Splits the free-text medium field on commas and resolves each token
/// against the loaded medium categories. Unmatched tokens are dropped, not
/// errors; repeated tokens collapse to one link.
fn resolve_mediums(raw: &str, mediums: &HashMap<String, i64>) -> Vec<i64> {
    let mut ids = Vec::new();
    for token in raw.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some(&id) = mediums.get(token) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    fn write_csv(tag: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("lehman_artworks_{}_{}.csv", tag, std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    const HEADER: &str = "Object ID,Artist Display Name,Title,Object Name,Department,Medium,Object End Date\n";

    fn seeded_store() -> CollectionStore {
        let mut store = CollectionStore::open_in_memory().unwrap();
        store
            .bulk_insert_artists(&["J. Doe".to_string(), "R. Roe".to_string()])
            .unwrap();
        store
            .bulk_insert_mediums(&["Glass".to_string(), "Gold leaf".to_string()])
            .unwrap();
        store
    }

    #[test]
    fn end_year_requires_pure_digits() {
        assert_eq!(parse_end_year("1750"), Some(1750));
        assert_eq!(parse_end_year(" 1990 "), Some(1990));
        assert_eq!(parse_end_year("ca. 1750"), None);
        assert_eq!(parse_end_year("1510-1520"), None);
        assert_eq!(parse_end_year("-5"), None);
        assert_eq!(parse_end_year(""), None);
    }

    #[test]
    fn title_falls_back_to_object_name_then_untitled() {
        assert_eq!(resolve_title("Portrait", "Vase"), "Portrait");
        assert_eq!(resolve_title("", "Vase"), "Vase");
        assert_eq!(resolve_title("  ", ""), "Untitled");
    }

    #[test]
    fn medium_tokens_are_trimmed_matched_and_deduplicated() {
        let mut lookup = HashMap::new();
        lookup.insert("Glass".to_string(), 1);
        lookup.insert("Gold leaf".to_string(), 2);

        let ids = resolve_mediums("Glass, Glass,  Gold leaf , Tempera on wood,,", &lookup);
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn example_row_loads_with_fallback_title_and_medium_set() {
        let path = write_csv(
            "example",
            &format!("{HEADER}42,J. Doe,,Vase,,\"Glass, Glass, Gold leaf\",1750\n"),
        );

        let mut store = seeded_store();
        let report = load_artworks(&mut store, &path).unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(report.linked, 1);

        let artworks = store.list_artworks().unwrap();
        assert_eq!(artworks[0].object_id, 42);
        assert_eq!(artworks[0].title, "Vase");
        assert_eq!(artworks[0].end_date_year, Some(1750));

        let mediums = store.medium_lookup().unwrap();
        let linked: HashSet<i64> = store
            .connection()
            .prepare("SELECT medium_id FROM artwork_mediums WHERE artwork_id = 42")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        let expected: HashSet<i64> = [mediums["Glass"], mediums["Gold leaf"]].into_iter().collect();
        assert_eq!(linked, expected);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn rows_without_a_resolvable_creator_are_skipped() {
        let path = write_csv(
            "no_artist",
            &format!("{HEADER}1,Unknown Person,Work,,,Glass,1800\n2,,Blank,,,,\n3,J. Doe,Kept,,,,\n"),
        );

        let mut store = seeded_store();
        let report = load_artworks(&mut store, &path).unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(report.skipped_rows, 2);
        assert_eq!(store.list_artworks().unwrap()[0].title, "Kept");

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn malformed_id_skips_only_that_row() {
        let path = write_csv(
            "bad_id",
            &format!("{HEADER}oops,J. Doe,Broken,,,,\n5,R. Roe,Fine,,,,\n"),
        );

        let mut store = seeded_store();
        let report = load_artworks(&mut store, &path).unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(report.skipped_rows, 1);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn duplicate_object_id_fails_the_stage() {
        let path = write_csv(
            "dup_id",
            &format!("{HEADER}9,J. Doe,First,,,,\n9,R. Roe,Second,,,,\n"),
        );

        let mut store = seeded_store();
        assert!(load_artworks(&mut store, &path).is_err());

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn unmatched_medium_tokens_are_dropped() {
        let path = write_csv(
            "lossy_medium",
            &format!("{HEADER}8,J. Doe,Panel,,,\"Glass, Tempera on wood\",\n"),
        );

        let mut store = seeded_store();
        let report = load_artworks(&mut store, &path).unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(report.linked, 1);
        assert_eq!(store.table_count("artwork_mediums").unwrap(), 1);

        fs::remove_file(path).unwrap();
    }
}
