mod api;
mod database;
mod ingest;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::database::repo::CollectionStore;
use crate::utils::config::{self, DataPaths};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQLite database file.
    #[arg(short, long, default_value = "collection.db")]
    db_path: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Wipe the database and reload it from the three CSV exports.
    /// Needs exclusive access; do not run two loads against the same file.
    Load {
        #[arg(long)]
        artworks: Option<PathBuf>,
        #[arg(long)]
        artists: Option<PathBuf>,
        #[arg(long)]
        mediums: Option<PathBuf>,
    },
    /// Serve the collection API over HTTP.
    Serve {
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Load {
            artworks,
            artists,
            mediums,
        } => {
            let paths = resolve_paths(artworks, artists, mediums)?;
            info!("Artwork source: {:?}", paths.artworks);
            info!("Artist source: {:?}", paths.artists);
            info!("Medium source: {:?}", paths.mediums);

            let mut store = CollectionStore::open(&cli.db_path)?;
            ingest::pipeline::run(&mut store, &paths)?;
        }
        Command::Serve { port } => {
            let store = CollectionStore::open(&cli.db_path)?;
            // The pipeline side of the binary is synchronous; only the API
            // needs a runtime, so it is built here rather than on main.
            tokio::runtime::Runtime::new()?.block_on(api::server::run(store, port))?;
        }
    }

    Ok(())
}

/// Explicit flags win; whatever is missing comes from .env or a filesystem
/// search for the conventional file names.
fn resolve_paths(
    artworks: Option<PathBuf>,
    artists: Option<PathBuf>,
    mediums: Option<PathBuf>,
) -> Result<DataPaths> {
    if let (Some(artworks), Some(artists), Some(mediums)) =
        (artworks.clone(), artists.clone(), mediums.clone())
    {
        return Ok(DataPaths {
            artworks,
            artists,
            mediums,
        });
    }

    let mut paths = config::get_data_paths()?;
    if let Some(p) = artworks {
        paths.artworks = p;
    }
    if let Some(p) = artists {
        paths.artists = p;
    }
    if let Some(p) = mediums {
        paths.mediums = p;
    }
    Ok(paths)
}
