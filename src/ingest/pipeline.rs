//! Load orchestrator. Strictly sequential: wipe, then media, then artists,
//! then artworks (insert pass and link pass). Any stage failure halts the
//! sequence; a re-run starts from scratch.
//!
//! Precondition: exclusive access to the database. Two concurrent runs would
//! race on the wipe step and are not supported.

use anyhow::Result;
use tracing::info;

use crate::database::repo::CollectionStore;
use crate::ingest::{artworks, loaders};
use crate::utils::config::DataPaths;

#[derive(Debug, Default)]
pub struct LoadReport {
    pub mediums: usize,
    pub artists: usize,
    pub artworks: usize,
    pub linked: usize,
    pub skipped_rows: usize,
}

pub fn run(store: &mut CollectionStore, paths: &DataPaths) -> Result<LoadReport> {
    info!("Starting collection load");

    store.wipe()?;
    info!("Wiped existing entities");

    let mediums = loaders::load_mediums(store, &paths.mediums)?;
    let artists = loaders::load_artists(store, &paths.artists)?;
    let artwork_report = artworks::load_artworks(store, &paths.artworks)?;

    let report = LoadReport {
        mediums,
        artists,
        artworks: artwork_report.created,
        linked: artwork_report.linked,
        skipped_rows: artwork_report.skipped_rows,
    };
    info!(
        "Load complete: {} mediums, {} artists, {} artworks ({} linked, {} rows skipped)",
        report.mediums, report.artists, report.artworks, report.linked, report.skipped_rows
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    fn write_csv(tag: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("lehman_pipeline_{}_{}.csv", tag, std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    // Tagged per test so parallel tests never share files.
    fn fixture_paths(tag: &str) -> DataPaths {
        let mediums = write_csv(&format!("{tag}_mediums"), "name\nGlass\nGold leaf\nBronze\n");
        let artists = write_csv(&format!("{tag}_artists"), "name\nJ. Doe\nR. Roe\n");
        let artworks = write_csv(
            &format!("{tag}_artworks"),
            "Object ID,Artist Display Name,Title,Object Name,Department,Medium,Object End Date\n\
             42,J. Doe,,Vase,Decorative Arts,\"Glass, Gold leaf\",1750\n\
             43,R. Roe,Study,,Drawings,Bronze,1992\n\
             44,Nobody Known,Orphan,,,Glass,1800\n",
        );
        DataPaths {
            artworks,
            artists,
            mediums,
        }
    }

    fn cleanup(paths: &DataPaths) {
        for p in [&paths.artworks, &paths.artists, &paths.mediums] {
            let _ = fs::remove_file(p);
        }
    }

    #[test]
    fn full_run_builds_all_relationships() {
        let paths = fixture_paths("full");
        let mut store = CollectionStore::open_in_memory().unwrap();

        let report = run(&mut store, &paths).unwrap();
        assert_eq!(report.mediums, 3);
        assert_eq!(report.artists, 2);
        assert_eq!(report.artworks, 2);
        assert_eq!(report.linked, 2);
        assert_eq!(report.skipped_rows, 1);

        cleanup(&paths);
    }

    #[test]
    fn rerunning_yields_identical_counts() {
        let paths = fixture_paths("rerun");
        let mut store = CollectionStore::open_in_memory().unwrap();

        let first = run(&mut store, &paths).unwrap();
        let second = run(&mut store, &paths).unwrap();
        assert_eq!(first.mediums, second.mediums);
        assert_eq!(first.artists, second.artists);
        assert_eq!(first.artworks, second.artworks);
        assert_eq!(first.linked, second.linked);

        cleanup(&paths);
    }

    #[test]
    fn missing_source_halts_the_sequence() {
        let mut paths = fixture_paths("missing");
        let good_artists = paths.artists.clone();
        paths.artists = PathBuf::from("/nonexistent/artist_final.csv");

        let mut store = CollectionStore::open_in_memory().unwrap();
        assert!(run(&mut store, &paths).is_err());
        // Media loaded before the failing stage, artworks never ran.
        assert_eq!(store.table_count("medium_categories").unwrap(), 3);
        assert_eq!(store.table_count("artworks").unwrap(), 0);

        paths.artists = good_artists;
        cleanup(&paths);
    }
}
