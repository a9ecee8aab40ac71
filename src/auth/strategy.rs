/// Local (email + password) authentication strategies
///
/// `local_login` and `local_signup` decide whether a form submission
/// authenticates. A failure carries the message to flash back to the form;
/// storage errors propagate untouched.

use crate::auth::password::{hash_password, verify_password};
use crate::error::AppResult;
use crate::user::storage::{unique_violation, UniqueField};
use crate::user::{types::USER_COLORS, LocalProfile, User, UserStorage};
use rand::seq::SliceRandom;
use serde::Deserialize;

pub const NO_USER_FOUND: &str = "No user found.";
pub const WRONG_PASSWORD: &str = "Oops! Wrong password.";
pub const EMAIL_TAKEN: &str = "That email is already taken.";
pub const FIELDS_REQUIRED: &str = "All fields are required.";

/// Inserts tried before a signup gives up on finding a free userid
const USERID_ATTEMPTS: u32 = 5;

/// POST /login body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// POST /signup body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
}

/// Result of running a strategy
#[derive(Debug)]
pub enum AuthOutcome {
    Success(User),
    Failure(&'static str),
}

/// Emails compare case-insensitively; stored lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Authenticate an existing account
pub async fn local_login(users: &UserStorage, form: &LoginForm) -> AppResult<AuthOutcome> {
    let email = normalize_email(&form.email);

    let Some(user) = users.find_by_email(&email).await? else {
        tracing::info!("🔒 Login rejected, unknown email: {}", email);
        return Ok(AuthOutcome::Failure(NO_USER_FOUND));
    };

    if !verify_password(&form.password, &user.local.password) {
        tracing::info!("🔒 Login rejected, wrong password for {}", user.local.userid);
        return Ok(AuthOutcome::Failure(WRONG_PASSWORD));
    }

    tracing::info!("🔓 User logged in: {}", user.local.userid);
    Ok(AuthOutcome::Success(user))
}

/// Register a new account
pub async fn local_signup(users: &UserStorage, form: &SignupForm) -> AppResult<AuthOutcome> {
    let email = normalize_email(&form.email);
    let firstname = form.firstname.trim();
    let lastname = form.lastname.trim();

    if email.is_empty() || form.password.is_empty() || firstname.is_empty() || lastname.is_empty() {
        return Ok(AuthOutcome::Failure(FIELDS_REQUIRED));
    }

    if users.find_by_email(&email).await?.is_some() {
        tracing::info!("📝 Signup rejected, email already registered: {}", email);
        return Ok(AuthOutcome::Failure(EMAIL_TAKEN));
    }

    let userid = users.next_free_userid(&email).await?;
    let user_color = USER_COLORS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_COLORS[0]);

    let user = User::new(LocalProfile {
        userid,
        firstname: firstname.to_string(),
        lastname: lastname.to_string(),
        email,
        password: hash_password(&form.password)?,
        user_color: user_color.to_string(),
        projects: Vec::new(),
    });

    let Some(user) = insert_account(users, user).await? else {
        tracing::info!("📝 Signup rejected, email registered concurrently: {}", normalize_email(&form.email));
        return Ok(AuthOutcome::Failure(EMAIL_TAKEN));
    };

    tracing::info!("🎉 New account created: {} ({})", user.local.userid, user.local.email);
    Ok(AuthOutcome::Success(user))
}

/// Insert `user`, moving to the next free userid when another signup took it first
///
/// Returns `None` when the email is already registered.
async fn insert_account(users: &UserStorage, mut user: User) -> AppResult<Option<User>> {
    let mut attempt = 1;
    loop {
        let Err(e) = users.insert(&user).await else {
            return Ok(Some(user));
        };
        match unique_violation(&e) {
            Some(UniqueField::Email) => return Ok(None),
            Some(UniqueField::Userid) if attempt < USERID_ATTEMPTS => {
                tracing::debug!("📝 Userid {} claimed concurrently, retrying", user.local.userid);
                user.local.userid = users.next_free_userid(&user.local.email).await?;
                attempt += 1;
            }
            _ => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::database;

    async fn users() -> UserStorage {
        UserStorage::new(database::open(&Config::in_memory().database).await.unwrap())
    }

    fn signup_form(email: &str) -> SignupForm {
        SignupForm {
            email: email.into(),
            password: "hunter2".into(),
            firstname: "Grace".into(),
            lastname: "Hopper".into(),
        }
    }

    #[tokio::test]
    async fn signup_then_login() {
        let users = users().await;

        let user = match local_signup(&users, &signup_form("  Grace@Navy.mil ")).await.unwrap() {
            AuthOutcome::Success(user) => user,
            AuthOutcome::Failure(msg) => panic!("signup failed: {msg}"),
        };
        assert_eq!(user.local.email, "grace@navy.mil");
        assert_eq!(user.local.userid, "grace");
        assert!(USER_COLORS.contains(&user.local.user_color.as_str()));
        assert!(user.local.projects.is_empty());

        let login = LoginForm {
            email: "GRACE@navy.mil".into(),
            password: "hunter2".into(),
        };
        match local_login(&users, &login).await.unwrap() {
            AuthOutcome::Success(found) => assert_eq!(found.id, user.id),
            AuthOutcome::Failure(msg) => panic!("login failed: {msg}"),
        }

        let wrong = LoginForm {
            email: "grace@navy.mil".into(),
            password: "hunter3".into(),
        };
        assert!(matches!(
            local_login(&users, &wrong).await.unwrap(),
            AuthOutcome::Failure(WRONG_PASSWORD)
        ));
    }

    #[tokio::test]
    async fn login_unknown_email() {
        let users = users().await;
        let form = LoginForm {
            email: "nobody@example.com".into(),
            password: "x".into(),
        };
        assert!(matches!(
            local_login(&users, &form).await.unwrap(),
            AuthOutcome::Failure(NO_USER_FOUND)
        ));
    }

    #[tokio::test]
    async fn signup_rejects_taken_email_and_blank_fields() {
        let users = users().await;
        assert!(matches!(
            local_signup(&users, &signup_form("grace@navy.mil")).await.unwrap(),
            AuthOutcome::Success(_)
        ));
        assert!(matches!(
            local_signup(&users, &signup_form("grace@navy.mil")).await.unwrap(),
            AuthOutcome::Failure(EMAIL_TAKEN)
        ));

        let mut blank = signup_form("other@navy.mil");
        blank.lastname = "   ".into();
        assert!(matches!(
            local_signup(&users, &blank).await.unwrap(),
            AuthOutcome::Failure(FIELDS_REQUIRED)
        ));
    }

    fn account(userid: &str, email: &str) -> User {
        User::new(LocalProfile {
            userid: userid.into(),
            firstname: "Grace".into(),
            lastname: "Hopper".into(),
            email: email.into(),
            password: "not-a-hash".into(),
            user_color: USER_COLORS[0].into(),
            projects: Vec::new(),
        })
    }

    #[tokio::test]
    async fn userid_collision_moves_to_next_free_userid() {
        let users = users().await;
        users.insert(&account("grace", "grace@army.mil")).await.unwrap();

        // Userid picked before the other account landed
        let inserted = insert_account(&users, account("grace", "grace@navy.mil"))
            .await
            .unwrap()
            .expect("email is free");
        assert_eq!(inserted.local.userid, "grace2");
        assert!(users.find_by_email("grace@navy.mil").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn email_collision_is_reported_as_taken() {
        let users = users().await;
        users.insert(&account("grace", "grace@navy.mil")).await.unwrap();

        let outcome = insert_account(&users, account("hopper", "grace@navy.mil"))
            .await
            .unwrap();
        assert!(outcome.is_none());
        assert!(users.find_by_userid("hopper").await.unwrap().is_none());
    }
}
