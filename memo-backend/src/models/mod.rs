pub mod memo;
pub mod session;
pub mod user;

pub use memo::{Memo, MemoId};
pub use session::Session;
pub use user::{User, UserId};
