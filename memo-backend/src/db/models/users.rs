//! User database operations

use rusqlite::{ErrorCode, OptionalExtension, Row, params};

use crate::error::{AppError, AppResult};
use crate::models::{User, UserId};
use super::super::Database;

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        user_name: row.get(1)?,
        user_password_hash: row.get(2)?,
    })
}

impl Database {
    /// Insert a user row. A clash on the unique username surfaces as `DuplicateUsername`.
    pub fn insert_user(&self, user_name: &str, password_hash: &str) -> AppResult<UserId> {
        let conn = self.conn()?;
        match conn.execute(
            "INSERT INTO users (user_name, user_password_hash) VALUES (?1, ?2)",
            params![user_name, password_hash],
        ) {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(AppError::DuplicateUsername)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Look up a user by exact (case-sensitive) username
    pub fn get_user_by_name(&self, user_name: &str) -> AppResult<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, user_name, user_password_hash FROM users WHERE user_name = ?1",
                [user_name],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_user(&self, id: UserId) -> AppResult<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, user_name, user_password_hash FROM users WHERE id = ?1",
                [id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }
}
