/// Project pages and membership management
///
/// Every route requires a logged in user; project pages additionally require
/// that the project exists and that the user is one of its members.

use crate::{
    api::AppState,
    auth::{strategy::normalize_email, AuthUser},
    error::{AppError, AppResult},
    helpers::{
        does_project_exist, get_project_member_list, is_ajax_request, is_user_project_member,
        reject, USER_DOES_NOT_EXIST,
    },
    project::{types::is_valid_projectid, Project},
    session::Session,
    user::MemberSummary,
};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{Html, Json, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tera::Context;

pub const INVALID_PROJECT_ID: &str = "Project id may only contain letters, digits, '-' and '_'";
pub const PROJECT_ALREADY_EXISTS: &str = "Project already exists";

/// POST /project body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateProjectForm {
    pub projectid: String,
    pub name: String,
}

/// POST /project/{projectid}/members body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddMemberForm {
    pub email: String,
}

/// Create project routes
pub fn create_project_routes() -> Router<AppState> {
    Router::new()
        .route("/project", post(create_project))
        .route("/project/{projectid}", get(view_project))
        .route(
            "/project/{projectid}/members",
            get(list_members).post(add_member),
        )
}

/// POST /project
///
/// The creator becomes the first member.
async fn create_project(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    Form(form): Form<CreateProjectForm>,
) -> AppResult<Redirect> {
    let projectid = form.projectid.trim();
    if !is_valid_projectid(projectid) {
        return Err(reject(&session, INVALID_PROJECT_ID).await);
    }
    if state.projects.find_by_projectid(projectid).await?.is_some() {
        return Err(reject(&session, PROJECT_ALREADY_EXISTS).await);
    }

    let name = match form.name.trim() {
        "" => projectid,
        name => name,
    };
    let project = Project::new(projectid, name, &user.local.email);

    match state.projects.insert(&project).await {
        Ok(()) => {}
        Err(AppError::Database(e))
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) =>
        {
            return Err(reject(&session, PROJECT_ALREADY_EXISTS).await);
        }
        Err(e) => return Err(e),
    }

    state.users.add_project(&user.id, &project.projectid).await?;

    tracing::info!("📁 Created project {} for {}", project.projectid, user.local.userid);
    Ok(Redirect::to(&format!("/project/{}", project.projectid)))
}

/// GET /project/{projectid}
async fn view_project(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    Path(projectid): Path<String>,
) -> AppResult<Html<String>> {
    does_project_exist(&session, &state.projects, &projectid).await?;
    let project = is_user_project_member(&session, &state.projects, &user, &projectid).await?;

    let members = get_project_member_list(&state.projects, &state.users, &project.id).await?;

    let mut context = Context::new();
    context.insert("project", &project);
    context.insert("members", &members);
    state.views.render("project.html", &context)
}

/// GET /project/{projectid}/members
///
/// AJAX endpoint returning the member list as JSON.
async fn list_members(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    Path(projectid): Path<String>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<MemberSummary>>> {
    is_ajax_request(&headers)?;
    does_project_exist(&session, &state.projects, &projectid).await?;
    let project = is_user_project_member(&session, &state.projects, &user, &projectid).await?;

    let members = get_project_member_list(&state.projects, &state.users, &project.id).await?;
    Ok(Json(members))
}

/// POST /project/{projectid}/members
///
/// Adds an existing account to the project by email.
async fn add_member(
    State(state): State<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    Path(projectid): Path<String>,
    Form(form): Form<AddMemberForm>,
) -> AppResult<Redirect> {
    does_project_exist(&session, &state.projects, &projectid).await?;
    let project = is_user_project_member(&session, &state.projects, &user, &projectid).await?;

    let email = normalize_email(&form.email);
    let Some(invitee) = state.users.find_by_email(&email).await? else {
        return Err(reject(&session, USER_DOES_NOT_EXIST).await);
    };

    state.projects.add_member(&project.id, &invitee.local.email).await?;
    state.users.add_project(&invitee.id, &project.projectid).await?;

    tracing::info!(
        "👥 {} added {} to project {}",
        user.local.userid,
        invitee.local.userid,
        project.projectid
    );
    Ok(Redirect::to(&format!("/project/{}", project.projectid)))
}
