use chrono::{DateTime, Utc};

use super::UserId;

/// A row of `auth_sessions`. The token is what the session cookie carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: i64,
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
