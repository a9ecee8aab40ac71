/// Authorization predicates and shared lookups for route handlers
///
/// Each guard either hands back what it looked up or rejects with an
/// `AppError::Redirect`. Rejections that land on `/error` flash their reason
/// under `errorMessage` first. Storage errors propagate untouched.

use crate::error::{AppError, AppResult};
use crate::project::{Project, ProjectStorage};
use crate::session::{Session, ERROR_MESSAGE};
use crate::user::{MemberSummary, User, UserStorage};
use axum::http::HeaderMap;

pub const USER_DOES_NOT_EXIST: &str = "User does not exist";
pub const CAN_ONLY_EDIT_OWN_ACCOUNT: &str = "Can only edit own account";
pub const NOT_A_PROJECT_MEMBER: &str = "Not a member of project";
pub const PROJECT_DOES_NOT_EXIST: &str = "Project does not exist";

/// Flash `message` and send the client to the error page
pub async fn reject(session: &Session, message: &str) -> AppError {
    tracing::warn!("🚫 Request rejected: {}", message);
    session.flash(ERROR_MESSAGE, message).await;
    AppError::redirect("/error")
}

/// The authenticated user, or a redirect to the homepage login prompt
pub async fn is_logged_in(session: &Session, users: &UserStorage) -> AppResult<User> {
    let Some(user_id) = session.user_id().await else {
        return Err(AppError::redirect("/"));
    };

    match users.find_by_id(&user_id).await? {
        Some(user) => Ok(user),
        None => {
            // Account vanished under a live session
            session.log_out().await;
            Err(AppError::redirect("/"))
        }
    }
}

/// The user behind a manually entered `/user/{userid}` URL
pub async fn does_user_exist(session: &Session, users: &UserStorage, userid: &str) -> AppResult<User> {
    tracing::debug!("🔍 Looking up user: {}", userid);
    match users.find_by_userid(userid).await? {
        Some(user) => Ok(user),
        None => Err(reject(session, USER_DOES_NOT_EXIST).await),
    }
}

/// Only the logged in user may edit their own profile
pub async fn can_user_edit_profile(session: &Session, current: &User, userid: &str) -> AppResult<()> {
    if current.local.userid == userid {
        Ok(())
    } else {
        Err(reject(session, CAN_ONLY_EDIT_OWN_ACCOUNT).await)
    }
}

/// The project `projectid`, provided `current` is one of its members
pub async fn is_user_project_member(
    session: &Session,
    projects: &ProjectStorage,
    current: &User,
    projectid: &str,
) -> AppResult<Project> {
    match projects
        .find_with_member(projectid, &current.local.email)
        .await?
    {
        Some(project) => Ok(project),
        None => Err(reject(session, NOT_A_PROJECT_MEMBER).await),
    }
}

/// The project behind a manually entered `/project/{projectid}` URL
pub async fn does_project_exist(
    session: &Session,
    projects: &ProjectStorage,
    projectid: &str,
) -> AppResult<Project> {
    tracing::debug!("🔍 Looking up project: {}", projectid);
    match projects.find_by_projectid(projectid).await? {
        Some(project) => Ok(project),
        None => Err(reject(session, PROJECT_DOES_NOT_EXIST).await),
    }
}

/// Accept only XMLHttpRequest-originated requests
pub fn is_ajax_request(headers: &HeaderMap) -> AppResult<()> {
    let is_xhr = headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));

    if is_xhr {
        Ok(())
    } else {
        Err(AppError::redirect("/error"))
    }
}

/// Display list of a project's members
///
/// Looks the project up by internal id, then fetches the users whose email
/// is in its member list. Emails without an account are skipped.
pub async fn get_project_member_list(
    projects: &ProjectStorage,
    users: &UserStorage,
    id: &str,
) -> AppResult<Vec<MemberSummary>> {
    let project = projects
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::ProjectNotFound(id.to_string()))?;

    let members = users.find_by_emails(&project.members).await?;

    Ok(members.iter().map(User::member_summary).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::database;
    use crate::session::SessionStore;
    use crate::user::LocalProfile;
    use axum::http::HeaderValue;
    use std::sync::Arc;

    struct Fixture {
        users: UserStorage,
        projects: ProjectStorage,
        session: Session,
    }

    async fn fixture() -> Fixture {
        let config = Config::in_memory();
        let pool = database::open(&config.database).await.unwrap();
        let store = Arc::new(SessionStore::new(config.session));
        Fixture {
            users: UserStorage::new(pool.clone()),
            projects: ProjectStorage::new(pool),
            session: store.start(),
        }
    }

    async fn add_user(users: &UserStorage, userid: &str, first: &str, last: &str) -> User {
        let user = User::new(LocalProfile {
            userid: userid.into(),
            firstname: first.into(),
            lastname: last.into(),
            email: format!("{userid}@example.com"),
            password: String::new(),
            user_color: "#e67e22".into(),
            projects: vec![],
        });
        users.insert(&user).await.unwrap();
        user
    }

    fn redirect_target(err: AppError) -> String {
        match err {
            AppError::Redirect(path) => path,
            other => panic!("expected redirect, got {other}"),
        }
    }

    #[tokio::test]
    async fn is_logged_in_requires_session_user() {
        let fx = fixture().await;
        let err = is_logged_in(&fx.session, &fx.users).await.unwrap_err();
        assert_eq!(redirect_target(err), "/");

        let ada = add_user(&fx.users, "ada", "Ada", "Lovelace").await;
        fx.session.log_in(&ada.id).await;
        assert_eq!(is_logged_in(&fx.session, &fx.users).await.unwrap().id, ada.id);
    }

    #[tokio::test]
    async fn is_logged_in_drops_stale_identity() {
        let fx = fixture().await;
        fx.session.log_in("deleted-account").await;
        assert!(is_logged_in(&fx.session, &fx.users).await.is_err());
        assert_eq!(fx.session.user_id().await, None);
    }

    #[tokio::test]
    async fn does_user_exist_flashes_when_missing() {
        let fx = fixture().await;
        let err = does_user_exist(&fx.session, &fx.users, "ghost").await.unwrap_err();
        assert_eq!(redirect_target(err), "/error");
        assert_eq!(fx.session.take_flash(ERROR_MESSAGE).await, vec![USER_DOES_NOT_EXIST]);

        add_user(&fx.users, "ada", "Ada", "Lovelace").await;
        assert!(does_user_exist(&fx.session, &fx.users, "ada").await.is_ok());
        assert!(fx.session.take_flash(ERROR_MESSAGE).await.is_empty());
    }

    #[tokio::test]
    async fn only_own_profile_is_editable() {
        let fx = fixture().await;
        let ada = add_user(&fx.users, "ada", "Ada", "Lovelace").await;

        assert!(can_user_edit_profile(&fx.session, &ada, "ada").await.is_ok());
        let err = can_user_edit_profile(&fx.session, &ada, "bob").await.unwrap_err();
        assert_eq!(redirect_target(err), "/error");
        assert_eq!(fx.session.take_flash(ERROR_MESSAGE).await, vec![CAN_ONLY_EDIT_OWN_ACCOUNT]);
    }

    #[tokio::test]
    async fn membership_checks_requesting_users_email() {
        let fx = fixture().await;
        let ada = add_user(&fx.users, "ada", "Ada", "Lovelace").await;
        let bob = add_user(&fx.users, "bob", "Bob", "Babbage").await;
        fx.projects
            .insert(&Project::new("engine", "Analytical Engine", &ada.local.email))
            .await
            .unwrap();

        let project = is_user_project_member(&fx.session, &fx.projects, &ada, "engine")
            .await
            .unwrap();
        assert_eq!(project.projectid, "engine");

        let err = is_user_project_member(&fx.session, &fx.projects, &bob, "engine")
            .await
            .unwrap_err();
        assert_eq!(redirect_target(err), "/error");
        assert_eq!(fx.session.take_flash(ERROR_MESSAGE).await, vec![NOT_A_PROJECT_MEMBER]);
    }

    #[tokio::test]
    async fn does_project_exist_flashes_when_missing() {
        let fx = fixture().await;
        let err = does_project_exist(&fx.session, &fx.projects, "nope").await.unwrap_err();
        assert_eq!(redirect_target(err), "/error");
        assert_eq!(fx.session.take_flash(ERROR_MESSAGE).await, vec![PROJECT_DOES_NOT_EXIST]);
    }

    #[test]
    fn ajax_detection_uses_requested_with_header() {
        let mut headers = HeaderMap::new();
        assert!(is_ajax_request(&headers).is_err());
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        assert!(is_ajax_request(&headers).is_ok());
    }

    #[tokio::test]
    async fn member_list_projects_display_shape() {
        let fx = fixture().await;
        let ada = add_user(&fx.users, "ada", "Ada", "Lovelace").await;
        let bob = add_user(&fx.users, "bob", "Bob", "Babbage").await;
        add_user(&fx.users, "eve", "Eve", "Outsider").await;

        let mut project = Project::new("engine", "Analytical Engine", &ada.local.email);
        project.members.push(bob.local.email.clone());
        project.members.push("no-account@example.com".into());
        fx.projects.insert(&project).await.unwrap();

        let members = get_project_member_list(&fx.projects, &fx.users, &project.id)
            .await
            .unwrap();
        assert_eq!(
            members,
            vec![
                MemberSummary {
                    name: "Ada Lovelace".into(),
                    email: "ada@example.com".into(),
                    color: "#e67e22".into(),
                },
                MemberSummary {
                    name: "Bob Babbage".into(),
                    email: "bob@example.com".into(),
                    color: "#e67e22".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn member_list_of_missing_project_is_an_error() {
        let fx = fixture().await;
        let err = get_project_member_list(&fx.projects, &fx.users, "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProjectNotFound(id) if id == "missing"));
    }
}
