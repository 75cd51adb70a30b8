use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::CoreError;
use crate::models::FavoriteRecord;

const SCHEMA_V1: &str = include_str!("../../../migrations/001_favorites.sql");

/// SQLite-backed storage for favorite records.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    // ── Favorites ───────────────────────────────────────────────

    /// Insert a favorite, replacing any existing record with the same id.
    pub fn upsert_favorite(&self, record: &FavoriteRecord) -> Result<(), CoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO favorites (item_id, name, image_url)
             VALUES (?1, ?2, ?3)",
            params![record.item_id, record.name, record.image_url],
        )?;
        Ok(())
    }

    /// Remove a favorite. Removing an absent id is not an error.
    pub fn delete_favorite(&self, item_id: i64) -> Result<(), CoreError> {
        self.conn
            .execute("DELETE FROM favorites WHERE item_id = ?1", params![item_id])?;
        Ok(())
    }

    /// All favorite records, oldest first.
    pub fn all_favorites(&self) -> Result<Vec<FavoriteRecord>, CoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT item_id, name, image_url FROM favorites ORDER BY created_at, rowid",
        )?;
        let rows = stmt
            .query_map([], row_to_favorite)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn row_to_favorite(row: &rusqlite::Row<'_>) -> rusqlite::Result<FavoriteRecord> {
    Ok(FavoriteRecord {
        item_id: row.get(0)?,
        name: row.get(1)?,
        image_url: row.get(2)?,
    })
}

fn run_migrations(conn: &Connection) -> Result<(), CoreError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }

    Ok(())
}
