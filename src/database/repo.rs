use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::database::schema::SCHEMA;

#[derive(Debug, Clone, Serialize)]
pub struct ArtistRecord {
    pub id: i64,
    pub name: String,
    pub period_style: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediumRecord {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtworkRecord {
    /// External identifier from the source dataset, used verbatim as the
    /// primary key. Never auto-generated.
    pub object_id: i64,
    pub title: String,
    pub department: String,
    pub end_date_year: Option<i64>,
    pub artist_id: Option<i64>,
}

/// Adapter over the SQLite entity store. All bulk work goes through explicit
/// transactions with prepared statements.
pub struct CollectionStore {
    conn: Connection,
}

impl CollectionStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open database")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        // SET NULL on artist deletion only fires with foreign keys enabled.
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize schema")?;
        Ok(Self { conn })
    }

    /// Clears all four tables, referencing side first so the foreign key
    /// constraints never get in the way of the wipe order.
    pub fn wipe(&mut self) -> Result<()> {
        let tx = self.conn.transaction().context("Failed to begin wipe transaction")?;
        tx.execute("DELETE FROM artwork_mediums", [])?;
        tx.execute("DELETE FROM artworks", [])?;
        tx.execute("DELETE FROM medium_categories", [])?;
        tx.execute("DELETE FROM artists", [])?;
        tx.commit().context("Failed to commit wipe")?;
        Ok(())
    }

    /// Inserts names into a unique-name table, silently absorbing duplicates.
    /// Returns the resulting total row count of the table.
    fn bulk_insert_names(&mut self, table: &str, names: &[String]) -> Result<usize> {
        let tx = self.conn.transaction().context("Failed to begin transaction")?;
        {
            let mut stmt = tx.prepare(&format!("INSERT OR IGNORE INTO {table} (name) VALUES (?1)"))?;
            for name in names {
                stmt.execute(params![name])?;
            }
        }
        tx.commit().context("Failed to commit name batch")?;
        self.table_count(table)
    }

    pub fn bulk_insert_artists(&mut self, names: &[String]) -> Result<usize> {
        self.bulk_insert_names("artists", names)
    }

    pub fn bulk_insert_mediums(&mut self, names: &[String]) -> Result<usize> {
        self.bulk_insert_names("medium_categories", names)
    }

    /// Inserts artworks in one transaction with plain INSERT. A duplicate
    /// object_id aborts the whole batch: identifiers come from the source
    /// dataset and colliding ones are a data integrity problem, not
    /// something to paper over.
    pub fn bulk_insert_artworks(&mut self, records: &[ArtworkRecord]) -> Result<()> {
        let tx = self.conn.transaction().context("Failed to begin artwork transaction")?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO artworks (object_id, title, department, end_date_year, artist_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.object_id,
                    record.title,
                    record.department,
                    record.end_date_year,
                    record.artist_id
                ])
                .with_context(|| format!("Failed to insert artwork {}", record.object_id))?;
            }
        }
        tx.commit().context("Failed to commit artwork batch")?;
        Ok(())
    }

    /// Snapshot of all artists keyed by name, for exact-match resolution.
    pub fn artist_lookup(&self) -> Result<HashMap<String, i64>> {
        self.name_lookup("artists")
    }

    /// Snapshot of all medium categories keyed by name.
    pub fn medium_lookup(&self) -> Result<HashMap<String, i64>> {
        self.name_lookup("medium_categories")
    }

    fn name_lookup(&self, table: &str) -> Result<HashMap<String, i64>> {
        let mut stmt = self.conn.prepare(&format!("SELECT name, id FROM {table}"))?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut map = HashMap::new();
        for row in rows {
            let (name, id): (String, i64) = row?;
            map.insert(name, id);
        }
        Ok(map)
    }

    pub fn artwork_ids(&self) -> Result<HashSet<i64>> {
        let mut stmt = self.conn.prepare("SELECT object_id FROM artworks")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row?);
        }
        Ok(ids)
    }

    /// Replaces each artwork's medium membership with exactly the given list,
    /// as one transaction. Re-running with the same input is a no-op.
    pub fn replace_medium_links(&mut self, links: &HashMap<i64, Vec<i64>>) -> Result<usize> {
        let existing = self.artwork_ids()?;
        let tx = self.conn.transaction().context("Failed to begin link transaction")?;
        let mut linked = 0;
        {
            let mut clear = tx.prepare("DELETE FROM artwork_mediums WHERE artwork_id = ?1")?;
            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO artwork_mediums (artwork_id, medium_id) VALUES (?1, ?2)",
            )?;
            for (artwork_id, medium_ids) in links {
                if !existing.contains(artwork_id) {
                    continue;
                }
                clear.execute(params![artwork_id])?;
                for medium_id in medium_ids {
                    insert.execute(params![artwork_id, medium_id])?;
                }
                linked += 1;
            }
        }
        tx.commit().context("Failed to commit medium links")?;
        Ok(linked)
    }

    pub fn table_count(&self, table: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .prepare(&format!("SELECT COUNT(*) FROM {table}"))?
            .query_row([], |row| row.get(0))?;
        Ok(count as usize)
    }

    // --- Row-level access for the HTTP surface ---

    pub fn list_artists(&self) -> Result<Vec<ArtistRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, period_style FROM artists ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(ArtistRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                period_style: row.get(2)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to list artists")
    }

    pub fn list_mediums(&self) -> Result<Vec<MediumRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM medium_categories ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(MediumRecord {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to list mediums")
    }

    pub fn list_artworks(&self) -> Result<Vec<ArtworkRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT object_id, title, department, end_date_year, artist_id
             FROM artworks ORDER BY object_id",
        )?;
        let rows = stmt.query_map([], Self::artwork_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to list artworks")
    }

    pub fn create_artist(&mut self, name: &str, period_style: Option<&str>) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO artists (name, period_style) VALUES (?1, ?2)",
                params![name, period_style],
            )
            .with_context(|| format!("Failed to create artist '{name}'"))?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn create_medium(&mut self, name: &str) -> Result<i64> {
        self.conn
            .execute("INSERT INTO medium_categories (name) VALUES (?1)", params![name])
            .with_context(|| format!("Failed to create medium '{name}'"))?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn create_artwork(&mut self, record: &ArtworkRecord) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO artworks (object_id, title, department, end_date_year, artist_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.object_id,
                    record.title,
                    record.department,
                    record.end_date_year,
                    record.artist_id
                ],
            )
            .with_context(|| format!("Failed to create artwork {}", record.object_id))?;
        Ok(())
    }

    /// Deleting an artist nulls the artist link on their artworks; the
    /// artworks themselves survive.
    pub fn delete_artist(&mut self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM artists WHERE id = ?1", params![id])
            .context("Failed to delete artist")?;
        Ok(affected > 0)
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    fn artwork_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ArtworkRecord> {
        Ok(ArtworkRecord {
            object_id: row.get(0)?,
            title: row.get(1)?,
            department: row.get(2)?,
            end_date_year: row.get(3)?,
            artist_id: row.get(4)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CollectionStore {
        CollectionStore::open_in_memory().unwrap()
    }

    #[test]
    fn name_insert_ignores_duplicates() {
        let mut store = store();
        let names = vec!["Glass".to_string(), "Glass".to_string(), "Gold leaf".to_string()];
        let count = store.bulk_insert_mediums(&names).unwrap();
        assert_eq!(count, 2);

        // A second batch with overlapping names is absorbed silently.
        let count = store.bulk_insert_mediums(&["Glass".to_string(), "Bronze".to_string()]).unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn duplicate_object_id_fails_the_batch() {
        let mut store = store();
        let artwork = |id| ArtworkRecord {
            object_id: id,
            title: "Untitled".to_string(),
            department: String::new(),
            end_date_year: None,
            artist_id: None,
        };
        let result = store.bulk_insert_artworks(&[artwork(1), artwork(1)]);
        assert!(result.is_err());
        // The transaction rolled back; nothing from the batch persists.
        assert_eq!(store.table_count("artworks").unwrap(), 0);
    }

    #[test]
    fn replace_medium_links_is_a_set_replace() {
        let mut store = store();
        store.bulk_insert_mediums(&["Glass".to_string(), "Bronze".to_string()]).unwrap();
        let mediums = store.medium_lookup().unwrap();
        store
            .bulk_insert_artworks(&[ArtworkRecord {
                object_id: 7,
                title: "Vase".to_string(),
                department: String::new(),
                end_date_year: None,
                artist_id: None,
            }])
            .unwrap();

        let mut links = HashMap::new();
        links.insert(7, vec![mediums["Glass"], mediums["Bronze"]]);
        assert_eq!(store.replace_medium_links(&links).unwrap(), 1);
        assert_eq!(store.table_count("artwork_mediums").unwrap(), 2);

        // Replace, not append.
        links.insert(7, vec![mediums["Glass"]]);
        store.replace_medium_links(&links).unwrap();
        assert_eq!(store.table_count("artwork_mediums").unwrap(), 1);
    }

    #[test]
    fn unknown_artwork_ids_are_skipped_when_linking() {
        let mut store = store();
        store.bulk_insert_mediums(&["Glass".to_string()]).unwrap();
        let mediums = store.medium_lookup().unwrap();
        let mut links = HashMap::new();
        links.insert(999, vec![mediums["Glass"]]);
        assert_eq!(store.replace_medium_links(&links).unwrap(), 0);
    }

    #[test]
    fn deleting_an_artist_nulls_the_link_but_keeps_the_artwork() {
        let mut store = store();
        store.bulk_insert_artists(&["J. Doe".to_string()]).unwrap();
        let artist_id = store.artist_lookup().unwrap()["J. Doe"];
        store
            .bulk_insert_artworks(&[ArtworkRecord {
                object_id: 42,
                title: "Vase".to_string(),
                department: String::new(),
                end_date_year: Some(1750),
                artist_id: Some(artist_id),
            }])
            .unwrap();

        assert!(store.delete_artist(artist_id).unwrap());
        let artworks = store.list_artworks().unwrap();
        assert_eq!(artworks.len(), 1);
        assert_eq!(artworks[0].artist_id, None);
    }

    #[test]
    fn wipe_clears_everything() {
        let mut store = store();
        store.bulk_insert_artists(&["A".to_string()]).unwrap();
        store.bulk_insert_mediums(&["M".to_string()]).unwrap();
        store.wipe().unwrap();
        assert_eq!(store.table_count("artists").unwrap(), 0);
        assert_eq!(store.table_count("medium_categories").unwrap(), 0);
    }
}
