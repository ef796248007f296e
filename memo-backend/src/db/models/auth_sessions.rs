//! Auth session database operations

use chrono::{Duration, Utc};
use rusqlite::{OptionalExtension, params};
use uuid::Uuid;

use crate::db::sqlite::{format_timestamp, parse_timestamp};
use crate::error::AppResult;
use crate::models::{Session, UserId};
use super::super::Database;

impl Database {
    /// Create a new auth session for a signed-in user
    pub fn create_session(&self, user_id: UserId, ttl: Duration) -> AppResult<Session> {
        let conn = self.conn()?;
        let token = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let expires_at = created_at + ttl;

        conn.execute(
            "INSERT INTO auth_sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                &token,
                user_id,
                format_timestamp(&created_at),
                format_timestamp(&expires_at),
            ],
        )?;

        let id = conn.last_insert_rowid();

        Ok(Session {
            id,
            token,
            user_id,
            created_at,
            expires_at,
        })
    }

    /// Validate a session token and extend its expiry if valid
    pub fn validate_session(&self, token: &str, ttl: Duration) -> AppResult<Option<Session>> {
        let conn = self.conn()?;
        let now = Utc::now();

        let session = conn
            .query_row(
                "SELECT id, token, user_id, created_at, expires_at FROM auth_sessions
                 WHERE token = ?1 AND expires_at > ?2",
                params![token, format_timestamp(&now)],
                |row| {
                    let created_at: String = row.get(3)?;
                    let expires_at: String = row.get(4)?;
                    Ok(Session {
                        id: row.get(0)?,
                        token: row.get(1)?,
                        user_id: row.get(2)?,
                        created_at: parse_timestamp(3, &created_at)?,
                        expires_at: parse_timestamp(4, &expires_at)?,
                    })
                },
            )
            .optional()?;

        // Keep active sessions alive
        let Some(mut session) = session else {
            return Ok(None);
        };
        let new_expires = now + ttl;
        if new_expires > session.expires_at {
            conn.execute(
                "UPDATE auth_sessions SET expires_at = ?1 WHERE id = ?2",
                params![format_timestamp(&new_expires), session.id],
            )?;
            session.expires_at = new_expires;
        }

        Ok(Some(session))
    }

    /// Delete a session (logout)
    pub fn delete_session(&self, token: &str) -> AppResult<bool> {
        let conn = self.conn()?;
        let rows_affected = conn.execute("DELETE FROM auth_sessions WHERE token = ?1", [token])?;
        Ok(rows_affected > 0)
    }

    /// Drop every expired session row, returning how many were removed
    pub fn purge_expired_sessions(&self) -> AppResult<usize> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM auth_sessions WHERE expires_at <= ?1",
            [format_timestamp(&Utc::now())],
        )?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_db() -> (tempfile::TempDir, Database, UserId) {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db").to_str().unwrap()).unwrap();
        let user_id = db.insert_user("alice", "hash").unwrap();
        (dir, db, user_id)
    }

    #[test]
    fn test_create_validate_delete() {
        let (_dir, db, user_id) = test_db();

        let session = db.create_session(user_id, Duration::hours(1)).unwrap();
        let found = db
            .validate_session(&session.token, Duration::hours(1))
            .unwrap()
            .expect("session should be valid");
        assert_eq!(found.user_id, user_id);
        assert_eq!(found.id, session.id);

        assert!(db.delete_session(&session.token).unwrap());
        assert!(!db.delete_session(&session.token).unwrap());
        assert!(db.validate_session(&session.token, Duration::hours(1)).unwrap().is_none());
    }

    #[test]
    fn test_validation_slides_expiry() {
        let (_dir, db, user_id) = test_db();

        let session = db.create_session(user_id, Duration::minutes(5)).unwrap();
        let found = db
            .validate_session(&session.token, Duration::hours(24))
            .unwrap()
            .unwrap();
        assert!(found.expires_at > session.expires_at + Duration::hours(23));
    }

    #[test]
    fn test_expired_sessions_are_rejected_and_purged() {
        let (_dir, db, user_id) = test_db();

        let expired = db.create_session(user_id, Duration::hours(-1)).unwrap();
        let live = db.create_session(user_id, Duration::hours(1)).unwrap();

        assert!(db.validate_session(&expired.token, Duration::hours(1)).unwrap().is_none());
        assert!(db.validate_session("not-a-token", Duration::hours(1)).unwrap().is_none());

        assert_eq!(db.purge_expired_sessions().unwrap(), 1);
        assert!(db.validate_session(&live.token, Duration::hours(1)).unwrap().is_some());
    }
}
