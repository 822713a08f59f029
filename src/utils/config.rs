use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::info;
use walkdir::WalkDir;

const ARTWORK_KEY: &str = "ARTWORK_CSV_PATH";
const ARTIST_KEY: &str = "ARTIST_CSV_PATH";
const MEDIUM_KEY: &str = "MEDIUM_CSV_PATH";

const ARTWORK_FILE: &str = "artwork_final.csv";
const ARTIST_FILE: &str = "artist_final.csv";
const MEDIUM_FILE: &str = "medium_final.csv";

#[derive(Debug, Clone)]
pub struct DataPaths {
    pub artworks: PathBuf,
    pub artists: PathBuf,
    pub mediums: PathBuf,
}

/// Main entry point to get the three CSV source paths.
/// Checks .env first, then searches the filesystem if not found.
pub fn get_data_paths() -> Result<DataPaths> {
    let env_path = Path::new(".env");

    if env_path.exists() {
        if let Ok(paths) = load_from_env(env_path) {
            info!("Loaded CSV paths from .env");
            return Ok(paths);
        }
    }

    info!("CSV paths not found in .env or .env missing. Searching filesystem...");
    let artworks = find_file(ARTWORK_FILE, 4)?;
    let artists = find_file(ARTIST_FILE, 4)?;
    let mediums = find_file(MEDIUM_FILE, 4)?;

    info!("Found artwork CSV: {:?}", artworks);
    info!("Found artist CSV: {:?}", artists);
    info!("Found medium CSV: {:?}", mediums);

    let paths = DataPaths {
        artworks,
        artists,
        mediums,
    };
    save_to_env(env_path, &paths)?;
    info!("Saved paths to .env");

    Ok(paths)
}

fn find_file(filename: &str, max_depth: usize) -> Result<PathBuf> {
    let root = std::env::current_dir()?;

    let search_result = WalkDir::new(&root)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|e| e.file_name() == filename);

    if let Some(entry) = search_result {
        return Ok(entry.path().to_path_buf());
    }

    // Useful when running from a subdirectory of the project.
    if let Some(parent) = root.parent() {
        let parent_result = WalkDir::new(parent)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .find(|e| e.file_name() == filename);

        if let Some(entry) = parent_result {
            return Ok(entry.path().to_path_buf());
        }
    }

    Err(anyhow!("Could not find file '{}' in nearby directories.", filename))
}

fn load_from_env(path: &Path) -> Result<DataPaths> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut artworks = None;
    let mut artists = None;
    let mut mediums = None;

    for line in reader.lines() {
        let line = line?;
        if let Some((key, value)) = line.split_once('=') {
            match key.trim() {
                ARTWORK_KEY => artworks = Some(PathBuf::from(value.trim())),
                ARTIST_KEY => artists = Some(PathBuf::from(value.trim())),
                MEDIUM_KEY => mediums = Some(PathBuf::from(value.trim())),
                _ => {}
            }
        }
    }

    match (artworks, artists, mediums) {
        (Some(artworks), Some(artists), Some(mediums)) => Ok(DataPaths {
            artworks,
            artists,
            mediums,
        }),
        _ => Err(anyhow!("Incomplete .env file")),
    }
}

fn save_to_env(path: &Path, paths: &DataPaths) -> Result<()> {
    let mut file = File::create(path).context("Failed to create .env file")?;
    writeln!(file, "{}={}", ARTWORK_KEY, paths.artworks.display())?;
    writeln!(file, "{}={}", ARTIST_KEY, paths.artists.display())?;
    writeln!(file, "{}={}", MEDIUM_KEY, paths.mediums.display())?;
    Ok(())
}
