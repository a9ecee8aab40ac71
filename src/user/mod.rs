/// User accounts
///
/// Account documents and their SQLite storage.

pub mod storage;
pub mod types;

pub use storage::UserStorage;
pub use types::{LocalProfile, MemberSummary, User};
