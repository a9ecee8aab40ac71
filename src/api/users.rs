/// User profile pages
///
/// Anyone logged in may view a profile; only its owner may edit it.

use crate::{
    api::AppState,
    auth::AuthUser,
    error::AppResult,
    helpers::{can_user_edit_profile, does_user_exist},
    session::Session,
    user::User,
};
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    routing::get,
    Form, Router,
};
use serde::{Deserialize, Serialize};
use tera::Context;

/// Profile fields safe to hand to templates
#[derive(Debug, Serialize)]
struct ProfileView<'a> {
    userid: &'a str,
    firstname: &'a str,
    lastname: &'a str,
    email: &'a str,
    #[serde(rename = "userColor")]
    user_color: &'a str,
    projects: &'a [String],
}

impl<'a> From<&'a User> for ProfileView<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            userid: &user.local.userid,
            firstname: &user.local.firstname,
            lastname: &user.local.lastname,
            email: &user.local.email,
            user_color: &user.local.user_color,
            projects: &user.local.projects,
        }
    }
}

/// POST /user/{userid}/edit body; blank fields keep their current value
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub firstname: String,
    pub lastname: String,
    #[serde(rename = "userColor")]
    pub user_color: String,
}

/// Create profile routes
pub fn create_user_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(own_profile))
        .route("/user/{userid}", get(view_profile))
        .route("/user/{userid}/edit", get(edit_profile_page).post(edit_profile))
}

/// GET /profile
async fn own_profile(AuthUser(user): AuthUser) -> Redirect {
    Redirect::to(&format!("/user/{}", user.local.userid))
}

/// GET /user/{userid}
async fn view_profile(
    State(state): State<AppState>,
    session: Session,
    AuthUser(current): AuthUser,
    Path(userid): Path<String>,
) -> AppResult<Html<String>> {
    let user = does_user_exist(&session, &state.users, &userid).await?;

    let mut context = Context::new();
    context.insert("profile", &ProfileView::from(&user));
    context.insert("canEdit", &(current.id == user.id));
    state.views.render("profile.html", &context)
}

/// GET /user/{userid}/edit
async fn edit_profile_page(
    State(state): State<AppState>,
    session: Session,
    AuthUser(current): AuthUser,
    Path(userid): Path<String>,
) -> AppResult<Html<String>> {
    let user = does_user_exist(&session, &state.users, &userid).await?;
    can_user_edit_profile(&session, &current, &userid).await?;

    let mut context = Context::new();
    context.insert("profile", &ProfileView::from(&user));
    state.views.render("profile_edit.html", &context)
}

/// POST /user/{userid}/edit
async fn edit_profile(
    State(state): State<AppState>,
    session: Session,
    AuthUser(current): AuthUser,
    Path(userid): Path<String>,
    Form(form): Form<ProfileForm>,
) -> AppResult<Redirect> {
    let mut user = does_user_exist(&session, &state.users, &userid).await?;
    can_user_edit_profile(&session, &current, &userid).await?;

    apply_profile_form(&mut user, &form);
    state.users
        .update_profile(&user.id, &user.local.firstname, &user.local.lastname, &user.local.user_color)
        .await?;

    tracing::info!("✏️ Profile updated: {}", user.local.userid);
    Ok(Redirect::to(&format!("/user/{}", user.local.userid)))
}

fn apply_profile_form(user: &mut User, form: &ProfileForm) {
    let firstname = form.firstname.trim();
    if !firstname.is_empty() {
        user.local.firstname = firstname.to_string();
    }
    let lastname = form.lastname.trim();
    if !lastname.is_empty() {
        user.local.lastname = lastname.to_string();
    }
    if is_hex_color(form.user_color.trim()) {
        user.local.user_color = form.user_color.trim().to_lowercase();
    }
}

/// "#rrggbb"
fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::LocalProfile;

    fn user() -> User {
        User::new(LocalProfile {
            userid: "ada".into(),
            firstname: "Ada".into(),
            lastname: "Lovelace".into(),
            email: "ada@example.com".into(),
            password: "$argon2id$secret".into(),
            user_color: "#3498db".into(),
            projects: vec!["engine".into()],
        })
    }

    #[test]
    fn profile_view_omits_password() {
        let user = user();
        let json = serde_json::to_value(ProfileView::from(&user)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["userColor"], "#3498db");
        assert_eq!(json["projects"][0], "engine");
    }

    #[test]
    fn blank_fields_and_bad_colors_are_ignored() {
        let mut user = user();
        apply_profile_form(
            &mut user,
            &ProfileForm {
                firstname: "  ".into(),
                lastname: "King".into(),
                user_color: "red".into(),
            },
        );
        assert_eq!(user.local.firstname, "Ada");
        assert_eq!(user.local.lastname, "King");
        assert_eq!(user.local.user_color, "#3498db");

        apply_profile_form(
            &mut user,
            &ProfileForm {
                user_color: "#ABCDEF".into(),
                ..Default::default()
            },
        );
        assert_eq!(user.local.user_color, "#abcdef");
    }
}
