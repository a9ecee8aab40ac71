/// Application error type shared by handlers and helpers
///
/// Storage and rendering failures surface as 500s. Guard rejections carry
/// the path to redirect to; the flash message is already in the session by
/// the time one of those is returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Document encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Redirect to {0}")]
    Redirect(String),
}

impl AppError {
    /// Rejection that sends the client elsewhere
    pub fn redirect(path: impl Into<String>) -> Self {
        AppError::Redirect(path.into())
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AppError::PasswordHash(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Redirect(path) => {
                tracing::debug!("↪️ Redirecting to {}", path);
                Redirect::to(&path).into_response()
            }
            AppError::ProjectNotFound(id) => {
                tracing::warn!("❌ Project lookup failed: {}", id);
                (StatusCode::NOT_FOUND, format!("Project not found: {}", id)).into_response()
            }
            other => {
                tracing::error!("❌ Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
