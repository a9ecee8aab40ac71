/// projboard: small project-management web application
///
/// Users sign up, log in, and manage project membership. Pages are rendered
/// server-side; users and projects are stored as documents in SQLite.

// Core configuration and setup
pub mod config;

// Shared error type and its HTTP mapping
pub mod error;

// Connection pool and schema
pub mod database;

// Accounts and their storage
pub mod user;

// Projects, membership and their storage
pub mod project;

// Cookie sessions and flash messages
pub mod session;

// Password hashing, login/signup strategies, current-user extractors
pub mod auth;

// Authorization guards and shared lookups
pub mod helpers;

// Template rendering
pub mod views;

// HTTP API layer - page and form endpoints
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use error::{AppError, AppResult};
pub use project::{Project, ProjectStorage};
pub use server::start_server;
pub use user::{MemberSummary, User, UserStorage};
