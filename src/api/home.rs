/// Homepage and general pages
///
/// Renders the homepage (login prompt or the user's project list), handles
/// login, signup and logout, and shows the shared error page.

use crate::{
    api::AppState,
    auth::{local_login, local_signup, AuthOutcome, LoginForm, MaybeUser, SignupForm},
    error::AppResult,
    session::{Session, ERROR_MESSAGE, LOGIN_MESSAGE, SIGNUP_MESSAGE},
};
use axum::{
    extract::State,
    response::{Html, Redirect},
    routing::{get, post},
    Form, Router,
};
use tera::Context;

/// Create homepage, authentication and error routes
pub fn create_home_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(homepage))
        .route("/login", post(login))
        .route("/signup", get(signup_page).post(signup))
        .route("/logout", get(logout))
        .route("/error", get(error_page))
}

/// GET /
///
/// Anonymous visitors get the login form; logged in users get a greeting
/// and their project list.
async fn homepage(
    State(state): State<AppState>,
    session: Session,
    MaybeUser(user): MaybeUser,
) -> AppResult<Html<String>> {
    let (firstname, project_list) = match &user {
        Some(user) => (user.local.firstname.clone(), user.local.projects.clone()),
        None => (String::new(), Vec::new()),
    };

    let mut context = Context::new();
    context.insert("firstname", &firstname);
    context.insert("notLoggedIn", &user.is_none());
    context.insert("message", &session.take_flash(LOGIN_MESSAGE).await);
    context.insert("projList", &project_list);

    state.views.render("homepage.html", &context)
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Redirect> {
    match local_login(&state.users, &form).await? {
        AuthOutcome::Success(user) => {
            session.log_in(&user.id).await;
            Ok(Redirect::to("/profile"))
        }
        AuthOutcome::Failure(message) => {
            session.flash(LOGIN_MESSAGE, message).await;
            Ok(Redirect::to("/"))
        }
    }
}

/// GET /signup
async fn signup_page(State(state): State<AppState>, session: Session) -> AppResult<Html<String>> {
    let mut context = Context::new();
    context.insert("message", &session.take_flash(SIGNUP_MESSAGE).await);
    state.views.render("signup.html", &context)
}

/// POST /signup
async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> AppResult<Redirect> {
    match local_signup(&state.users, &form).await? {
        AuthOutcome::Success(user) => {
            session.log_in(&user.id).await;
            Ok(Redirect::to("/profile"))
        }
        AuthOutcome::Failure(message) => {
            session.flash(SIGNUP_MESSAGE, message).await;
            Ok(Redirect::to("/signup"))
        }
    }
}

/// GET /logout
async fn logout(session: Session) -> Redirect {
    session.log_out().await;
    Redirect::to("/")
}

/// GET /error
///
/// Shown when someone reaches a page they may not see (not logged in, not a
/// project member, unknown user or project).
async fn error_page(State(state): State<AppState>, session: Session) -> AppResult<Html<String>> {
    let mut context = Context::new();
    context.insert("errorMessage", &session.take_flash(ERROR_MESSAGE).await);
    state.views.render("error.html", &context)
}
