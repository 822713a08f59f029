//! Row types for the three upstream CSV exports.
//!
//! The artwork export keeps the original MET column headers; extra columns
//! in the file are ignored by serde. Every field is read as a string and
//! converted later, so a malformed value in one row cannot poison the reader.

use std::fs::File;
use std::path::Path;

use csv::Reader;
use serde::Deserialize;

use crate::ingest::LoadError;

/// Artist and medium exports both reduce to a single `name` column.
#[derive(Debug, Deserialize)]
pub struct NameRow {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtworkRow {
    #[serde(rename = "Object ID", default)]
    pub object_id: String,
    #[serde(rename = "Artist Display Name", default)]
    pub artist_display_name: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Object Name", default)]
    pub object_name: String,
    #[serde(rename = "Department", default)]
    pub department: String,
    #[serde(rename = "Medium", default)]
    pub medium: String,
    #[serde(rename = "Object End Date", default)]
    pub object_end_date: String,
}

/// Opens a CSV source. A missing or unreadable file is fatal to the run.
pub fn open_reader(path: &Path) -> Result<Reader<File>, LoadError> {
    Reader::from_path(path).map_err(|source| LoadError::Source {
        path: path.to_path_buf(),
        source,
    })
}
