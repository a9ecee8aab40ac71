/// Project management module
///
/// Projects group users by email; membership is what the project routes
/// authorize against.

pub mod storage;
pub mod types;

pub use storage::ProjectStorage;
pub use types::Project;
