/// Row id of a registered user.
pub type UserId = i64;

/// Maximum length of a username, in characters.
pub const MAX_USER_NAME_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub user_name: String,
    /// `pbkdf2:sha256:<iterations>$<salt>$<hex digest>`
    pub user_password_hash: String,
}
