//! SQLite connection pool and schema.

use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use std::path::Path;

use crate::error::AppResult;

pub type DbConn = PooledConnection<SqliteConnectionManager>;

const POOL_SIZE: u32 = 8;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_name TEXT NOT NULL UNIQUE,
    user_password_hash TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS memos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    author_id INTEGER REFERENCES users(id),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS auth_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    token TEXT NOT NULL UNIQUE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_auth_sessions_expires_at ON auth_sessions(expires_at);
";

/// Pooled handle to the application database.
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open (creating if needed) the database file and make sure every table exists.
    pub fn new(database_url: &str) -> AppResult<Self> {
        if let Some(parent) = Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    log::warn!("Failed to create database directory {:?}: {}", parent, e);
                }
            }
        }

        let manager = SqliteConnectionManager::file(database_url)
            .with_init(|conn| conn.pragma_update(None, "foreign_keys", true));
        let pool = Pool::builder().max_size(POOL_SIZE).build(manager)?;

        let db = Self { pool };
        db.init_tables()?;
        Ok(db)
    }

    /// Check a connection out of the pool.
    pub fn conn(&self) -> AppResult<DbConn> {
        Ok(self.pool.get()?)
    }

    fn init_tables(&self) -> AppResult<()> {
        self.conn()?.execute_batch(SCHEMA)?;
        Ok(())
    }
}

/// Timestamps are stored as fixed-width RFC 3339 strings so SQL string
/// comparison orders them correctly.
pub(crate) fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_new_creates_parent_dir_and_tables() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("memo.db");

        let db = Database::new(db_path.to_str().unwrap()).expect("Failed to open database");
        assert!(db_path.exists());

        let conn = db.conn().unwrap();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"memos".to_string()));
        assert!(tables.contains(&"auth_sessions".to_string()));
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("memo.db");
        let path = db_path.to_str().unwrap();

        {
            let db = Database::new(path).unwrap();
            db.insert_user("alice", "hash").unwrap();
        }

        let db = Database::new(path).unwrap();
        assert!(db.get_user_by_name("alice").unwrap().is_some());
    }

    #[test]
    fn test_timestamp_round_trip_is_fixed_width() {
        let now = Utc::now();
        let formatted = format_timestamp(&now);
        assert_eq!(formatted.len(), "2024-01-01T00:00:00Z".len());
        let parsed = parse_timestamp(0, &formatted).unwrap();
        assert_eq!(parsed.timestamp(), now.timestamp());
    }
}
