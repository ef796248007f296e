//! Password hashing and cookie-backed sessions.

pub mod password;
pub mod session;

pub use password::PasswordHasher;
pub use session::SessionAuthenticator;
