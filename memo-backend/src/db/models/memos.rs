//! Memo database operations

use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};

use crate::db::sqlite::{format_timestamp, parse_timestamp};
use crate::error::{AppError, AppResult};
use crate::models::{Memo, MemoId, UserId};
use super::super::Database;

const MEMO_COLUMNS: &str = "id, title, content, author_id, created_at, updated_at";

fn row_to_memo(row: &Row<'_>) -> rusqlite::Result<Memo> {
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;
    Ok(Memo {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        author_id: row.get(3)?,
        created_at: parse_timestamp(4, &created_at)?,
        updated_at: parse_timestamp(5, &updated_at)?,
    })
}

impl Database {
    pub fn insert_memo(&self, title: &str, content: &str, author_id: Option<UserId>) -> AppResult<MemoId> {
        let conn = self.conn()?;
        let now = format_timestamp(&Utc::now());
        conn.execute(
            "INSERT INTO memos (title, content, author_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![title, content, author_id, now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_memo(&self, id: MemoId) -> AppResult<Option<Memo>> {
        let conn = self.conn()?;
        let memo = conn
            .query_row(
                &format!("SELECT {} FROM memos WHERE id = ?1", MEMO_COLUMNS),
                [id],
                row_to_memo,
            )
            .optional()?;
        Ok(memo)
    }

    /// All memos in insertion order
    pub fn list_memos(&self) -> AppResult<Vec<Memo>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM memos ORDER BY id", MEMO_COLUMNS))?;
        let memos = stmt
            .query_map([], row_to_memo)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(memos)
    }

    /// Overwrite title and content. `NotFound` when no row has that id.
    pub fn update_memo(&self, id: MemoId, title: &str, content: &str) -> AppResult<()> {
        let conn = self.conn()?;
        let now = format_timestamp(&Utc::now());
        let rows_affected = conn.execute(
            "UPDATE memos SET title = ?1, content = ?2, updated_at = ?3 WHERE id = ?4",
            params![title, content, now, id],
        )?;
        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub fn delete_memo(&self, id: MemoId) -> AppResult<()> {
        let conn = self.conn()?;
        let rows_affected = conn.execute("DELETE FROM memos WHERE id = ?1", [id])?;
        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
