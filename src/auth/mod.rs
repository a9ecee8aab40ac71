/// Authentication layer
///
/// - Argon2 password hashing
/// - Local login/signup strategies
/// - Request extractors for the current user

pub mod extract;
pub mod password;
pub mod strategy;

pub use extract::{AuthUser, MaybeUser};
pub use strategy::{local_login, local_signup, AuthOutcome, LoginForm, SignupForm};
