pub const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS artists (
        id INTEGER PRIMARY KEY,
        name TEXT UNIQUE NOT NULL,
        period_style TEXT
    );

    CREATE TABLE IF NOT EXISTS medium_categories (
        id INTEGER PRIMARY KEY,
        name TEXT UNIQUE NOT NULL
    );

    CREATE TABLE IF NOT EXISTS artworks (
        object_id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        department TEXT NOT NULL DEFAULT '',
        end_date_year INTEGER,
        artist_id INTEGER REFERENCES artists(id) ON DELETE SET NULL
    );

    CREATE TABLE IF NOT EXISTS artwork_mediums (
        artwork_id INTEGER NOT NULL,
        medium_id INTEGER NOT NULL,
        FOREIGN KEY(artwork_id) REFERENCES artworks(object_id),
        FOREIGN KEY(medium_id) REFERENCES medium_categories(id),
        PRIMARY KEY(artwork_id, medium_id)
    );
";
