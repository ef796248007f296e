//! Repository interfaces handed to the request handlers.
//!
//! `CredentialStore` owns user registration and password checks, `MemoStore`
//! owns memo CRUD. Both are backed by the pooled SQLite [`Database`]; the
//! handlers only ever see the traits.

use std::sync::Arc;

use crate::auth::PasswordHasher;
use crate::auth::password::verify_password;
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::memo::MAX_TITLE_LEN;
use crate::models::user::MAX_USER_NAME_LEN;
use crate::models::{Memo, MemoId, User, UserId};

pub trait CredentialStore: Send + Sync {
    /// Create an account. `DuplicateUsername` if the exact name is taken.
    fn register(&self, user_name: &str, password: &str) -> AppResult<UserId>;

    /// Check a username/password pair. Any mismatch is `AuthFailure`.
    fn verify(&self, user_name: &str, password: &str) -> AppResult<UserId>;

    fn find_user(&self, id: UserId) -> AppResult<Option<User>>;
}

pub trait MemoStore: Send + Sync {
    fn create(&self, title: &str, content: &str, author_id: UserId) -> AppResult<MemoId>;

    /// `NotFound` if no memo has this id.
    fn get(&self, id: MemoId) -> AppResult<Memo>;

    /// Every memo, regardless of author, in storage order.
    fn list(&self) -> AppResult<Vec<Memo>>;

    fn update(&self, id: MemoId, title: &str, content: &str) -> AppResult<()>;

    fn delete(&self, id: MemoId) -> AppResult<()>;
}

pub struct SqliteCredentialStore {
    db: Arc<Database>,
    hasher: PasswordHasher,
}

impl SqliteCredentialStore {
    pub fn new(db: Arc<Database>, hasher: PasswordHasher) -> Self {
        Self { db, hasher }
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn register(&self, user_name: &str, password: &str) -> AppResult<UserId> {
        if user_name.trim().is_empty() {
            return Err(AppError::validation("Username is required"));
        }
        if user_name.chars().count() > MAX_USER_NAME_LEN {
            return Err(AppError::validation(format!(
                "Username must be at most {} characters",
                MAX_USER_NAME_LEN
            )));
        }
        if password.is_empty() {
            return Err(AppError::validation("Password is required"));
        }

        if self.db.get_user_by_name(user_name)?.is_some() {
            return Err(AppError::DuplicateUsername);
        }
        // A concurrent registration can still win the race; the UNIQUE
        // constraint turns that into DuplicateUsername as well.
        self.db.insert_user(user_name, &self.hasher.hash(password))
    }

    fn verify(&self, user_name: &str, password: &str) -> AppResult<UserId> {
        match self.db.get_user_by_name(user_name)? {
            Some(user) if verify_password(&user.user_password_hash, password) => Ok(user.id),
            Some(_) => Err(AppError::AuthFailure),
            None => {
                self.hasher.burn(password);
                Err(AppError::AuthFailure)
            }
        }
    }

    fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        self.db.get_user(id)
    }
}

fn validate_memo(title: &str, content: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::validation("Title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    if content.trim().is_empty() {
        return Err(AppError::validation("Content is required"));
    }
    Ok(())
}

impl MemoStore for Database {
    fn create(&self, title: &str, content: &str, author_id: UserId) -> AppResult<MemoId> {
        validate_memo(title, content)?;
        self.insert_memo(title, content, Some(author_id))
    }

    fn get(&self, id: MemoId) -> AppResult<Memo> {
        self.get_memo(id)?.ok_or(AppError::NotFound)
    }

    fn list(&self) -> AppResult<Vec<Memo>> {
        self.list_memos()
    }

    fn update(&self, id: MemoId, title: &str, content: &str) -> AppResult<()> {
        validate_memo(title, content)?;
        self.update_memo(id, title, content)
    }

    fn delete(&self, id: MemoId) -> AppResult<()> {
        self.delete_memo(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn setup() -> (tempfile::TempDir, Arc<Database>, SqliteCredentialStore) {
        let dir = tempdir().unwrap();
        let db = Arc::new(Database::new(dir.path().join("test.db").to_str().unwrap()).unwrap());
        let credentials = SqliteCredentialStore::new(Arc::clone(&db), PasswordHasher::new(1_000));
        (dir, db, credentials)
    }

    #[test]
    fn test_register_twice_is_duplicate() {
        let (_dir, db, credentials) = setup();

        let id = credentials.register("alice", "first-pw").unwrap();
        let err = credentials.register("alice", "second-pw").unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));

        // The original account is untouched.
        assert_eq!(credentials.verify("alice", "first-pw").unwrap(), id);
        assert!(credentials.verify("alice", "second-pw").is_err());
        let stored = db.get_user(id).unwrap().unwrap();
        assert_ne!(stored.user_password_hash, "first-pw");
    }

    #[test]
    fn test_usernames_are_case_sensitive() {
        let (_dir, _db, credentials) = setup();

        let lower = credentials.register("alice", "pw").unwrap();
        let upper = credentials.register("Alice", "pw").unwrap();
        assert_ne!(lower, upper);
    }

    #[test]
    fn test_register_validation() {
        let (_dir, _db, credentials) = setup();

        assert!(matches!(credentials.register("", "pw"), Err(AppError::Validation(_))));
        assert!(matches!(credentials.register("   ", "pw"), Err(AppError::Validation(_))));
        assert!(matches!(credentials.register("alice", ""), Err(AppError::Validation(_))));
        assert!(matches!(
            credentials.register("elevenchars", "pw"),
            Err(AppError::Validation(_))
        ));
        // Ten characters is the limit, counted in characters not bytes.
        assert!(credentials.register("tencharsok", "pw").is_ok());
        assert!(credentials.register("ユーザー名ユーザー名", "pw").is_ok());
    }

    #[test]
    fn test_verify_failures_are_indistinguishable() {
        let (_dir, _db, credentials) = setup();
        let id = credentials.register("alice", "correct").unwrap();

        assert_eq!(credentials.verify("alice", "correct").unwrap(), id);
        let wrong_password = credentials.verify("alice", "wrong").unwrap_err();
        let unknown_user = credentials.verify("mallory", "correct").unwrap_err();
        assert!(matches!(wrong_password, AppError::AuthFailure));
        assert!(matches!(unknown_user, AppError::AuthFailure));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[test]
    fn test_find_user() {
        let (_dir, _db, credentials) = setup();
        let id = credentials.register("alice", "pw").unwrap();

        assert_eq!(credentials.find_user(id).unwrap().unwrap().user_name, "alice");
        assert!(credentials.find_user(id + 100).unwrap().is_none());
    }

    #[test]
    fn test_create_then_list() {
        let (_dir, db, credentials) = setup();
        let author = credentials.register("alice", "pw").unwrap();
        let memos: &dyn MemoStore = &*db;

        let id = memos.create("Groceries", "milk, eggs", author).unwrap();
        let listed = memos.list().unwrap();

        let matching: Vec<&Memo> = listed
            .iter()
            .filter(|m| m.title == "Groceries" && m.content == "milk, eggs")
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].id, id);
        assert_eq!(matching[0].author_id, Some(author));

        let second = memos.create("Groceries", "milk, eggs", author).unwrap();
        assert_ne!(second, id);
    }

    #[test]
    fn test_update_touches_only_target() {
        let (_dir, db, credentials) = setup();
        let author = credentials.register("alice", "pw").unwrap();
        let memos: &dyn MemoStore = &*db;

        let a = memos.create("A", "alpha", author).unwrap();
        let b = memos.create("B", "beta", author).unwrap();

        memos.update(a, "A2", "alpha two").unwrap();

        let updated = memos.get(a).unwrap();
        assert_eq!((updated.title.as_str(), updated.content.as_str()), ("A2", "alpha two"));
        let untouched = memos.get(b).unwrap();
        assert_eq!((untouched.title.as_str(), untouched.content.as_str()), ("B", "beta"));
    }

    #[test]
    fn test_round_trip_and_not_found() {
        let (_dir, db, credentials) = setup();
        let author = credentials.register("alice", "pw").unwrap();
        let memos: &dyn MemoStore = &*db;

        let id = memos.create("Title", "Body", author).unwrap();
        let memo = memos.get(id).unwrap();
        assert_eq!((memo.title.as_str(), memo.content.as_str()), ("Title", "Body"));

        memos.update(id, "New title", "New body").unwrap();
        let memo = memos.get(id).unwrap();
        assert_eq!((memo.title.as_str(), memo.content.as_str()), ("New title", "New body"));

        memos.delete(id).unwrap();
        assert!(matches!(memos.get(id), Err(AppError::NotFound)));
        assert!(matches!(memos.update(id, "t", "c"), Err(AppError::NotFound)));
        assert!(matches!(memos.delete(id), Err(AppError::NotFound)));
    }

    #[test]
    fn test_memo_validation() {
        let (_dir, db, credentials) = setup();
        let author = credentials.register("alice", "pw").unwrap();
        let memos: &dyn MemoStore = &*db;

        assert!(matches!(memos.create("", "body", author), Err(AppError::Validation(_))));
        assert!(matches!(memos.create("title", "  ", author), Err(AppError::Validation(_))));
        let long_title = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(matches!(memos.create(&long_title, "body", author), Err(AppError::Validation(_))));
        assert!(memos.create(&"x".repeat(MAX_TITLE_LEN), "body", author).is_ok());

        let id = memos.create("ok", "ok", author).unwrap();
        assert!(matches!(memos.update(id, "", "body"), Err(AppError::Validation(_))));
        assert_eq!(memos.get(id).unwrap().title, "ok");
    }
}
