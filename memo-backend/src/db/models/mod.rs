//! Database model modules
//!
//! Each module contains `impl Database` blocks for a specific table.

mod auth_sessions;
mod memos;
mod users;
