/// HTTP layer
///
/// Server-rendered pages and form endpoints:
/// - Home, login, signup, logout and error pages
/// - User profiles
/// - Projects and their membership

// Homepage, authentication and error pages
pub mod home;

// Profile viewing and editing
pub mod users;

// Project creation, viewing and membership
pub mod projects;

pub use home::create_home_routes;
pub use projects::create_project_routes;
pub use users::create_user_routes;

use crate::{
    project::ProjectStorage, session::SessionStore, user::UserStorage, views::Views,
};
use std::sync::Arc;

/// Application state containing shared resources
#[derive(Debug, Clone)]
pub struct AppState {
    /// User document storage
    pub users: UserStorage,
    /// Project document storage
    pub projects: ProjectStorage,
    /// Session store, also handed to the session middleware
    pub sessions: Arc<SessionStore>,
    /// Compiled page templates
    pub views: Arc<Views>,
}
