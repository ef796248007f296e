use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

pub type MemoId = i64;

/// Maximum length of a memo title, in characters.
pub const MAX_TITLE_LEN: usize = 100;

/// A memo. `author_id` records who created it but grants nothing: every
/// signed-in user can read and change every memo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    pub id: MemoId,
    pub title: String,
    pub content: String,
    pub author_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
