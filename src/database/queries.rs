//! The three read-only aggregate queries exposed by the API.
//!
//! The thresholds (top 10, usage > 5, year >= 1990) are part of the domain
//! contract and must not drift.

use anyhow::{Context, Result};
use rusqlite::params_from_iter;
use serde::Serialize;

use crate::database::repo::{ArtworkRecord, CollectionStore};

/// Non-name tokens known to pollute the artist column of this dataset
/// (nationality labels and one malformed tag found by inspecting the CSV).
/// Data, not logic: extend it here, the query stays untouched.
pub const ARTIST_DENYLIST: &[&str] = &[
    "Chinese",
    "Italian",
    "French",
    "American",
    "European",
    "Unknown Artist",
    "German",
    "Dutch",
    "Thai|Thai",
];

#[derive(Debug, Clone, Serialize)]
pub struct ArtistUsage {
    pub id: i64,
    pub name: String,
    pub artwork_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediumUsage {
    pub id: i64,
    pub name: String,
    pub artwork_count: i64,
}

/// Top 10 artists by artwork count, denylisted pseudo-names excluded.
pub fn prolific_artists(store: &CollectionStore) -> Result<Vec<ArtistUsage>> {
    let placeholders = vec!["?"; ARTIST_DENYLIST.len()].join(", ");
    let sql = format!(
        "SELECT a.id, a.name, COUNT(w.object_id) AS artwork_count
         FROM artists a
         LEFT JOIN artworks w ON w.artist_id = a.id
         WHERE a.name NOT IN ({placeholders})
         GROUP BY a.id, a.name
         ORDER BY artwork_count DESC
         LIMIT 10"
    );
    let conn = store.connection();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(ARTIST_DENYLIST.iter()), |row| {
        Ok(ArtistUsage {
            id: row.get(0)?,
            name: row.get(1)?,
            artwork_count: row.get(2)?,
        })
    })?;
    rows.collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to query prolific artists")
}

/// Medium categories used by strictly more than 5 artworks, most used first.
pub fn medium_summary(store: &CollectionStore) -> Result<Vec<MediumUsage>> {
    let conn = store.connection();
    let mut stmt = conn.prepare(
        "SELECT m.id, m.name, COUNT(am.artwork_id) AS artwork_count
         FROM medium_categories m
         JOIN artwork_mediums am ON am.medium_id = m.id
         GROUP BY m.id, m.name
         HAVING artwork_count > 5
         ORDER BY artwork_count DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(MediumUsage {
            id: row.get(0)?,
            name: row.get(1)?,
            artwork_count: row.get(2)?,
        })
    })?;
    rows.collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to query medium summary")
}

/// Artworks with an end date of 1990 or later, newest first.
pub fn recent_artworks(store: &CollectionStore) -> Result<Vec<ArtworkRecord>> {
    let conn = store.connection();
    let mut stmt = conn.prepare(
        "SELECT object_id, title, department, end_date_year, artist_id
         FROM artworks
         WHERE end_date_year >= 1990
         ORDER BY end_date_year DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(ArtworkRecord {
            object_id: row.get(0)?,
            title: row.get(1)?,
            department: row.get(2)?,
            end_date_year: row.get(3)?,
            artist_id: row.get(4)?,
        })
    })?;
    rows.collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to query recent artworks")
}
