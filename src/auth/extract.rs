/// Current-user extractors
///
/// `MaybeUser` never rejects; `AuthUser` runs `is_logged_in` and redirects
/// anonymous visitors to the homepage.

use crate::api::AppState;
use crate::error::AppError;
use crate::helpers::is_logged_in;
use crate::session::Session;
use crate::user::User;
use axum::{extract::FromRequestParts, http::request::Parts, response::IntoResponse};

/// The authenticated user, if there is one
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

/// The authenticated user; anonymous requests are redirected to `/`
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = axum::response::Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match is_logged_in(&session, &state.users).await {
            Ok(user) => Ok(MaybeUser(Some(user))),
            Err(AppError::Redirect(_)) => Ok(MaybeUser(None)),
            Err(e) => Err(e.into_response()),
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = axum::response::Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        is_logged_in(&session, &state.users)
            .await
            .map(AuthUser)
            .map_err(IntoResponse::into_response)
    }
}
