/// Cookie-backed sessions and flash messages
///
/// Every request passes through [`session_layer`], which resumes the session
/// named by the session cookie and makes a [`Session`] handle available to
/// handlers. Anonymous requests get no stored session until something is
/// written to it. Logging in moves the session to a fresh id. Whenever the
/// id changes the new cookie is sent with the response.

pub mod store;

pub use store::{SessionData, SessionStore};

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use cookie::{Cookie, SameSite};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Flash key for login failures, shown on the homepage
pub const LOGIN_MESSAGE: &str = "loginMessage";
/// Flash key for signup failures, shown on the signup page
pub const SIGNUP_MESSAGE: &str = "signupMessage";
/// Flash key for authorization failures, shown on the error page
pub const ERROR_MESSAGE: &str = "errorMessage";

/// Which stored session this request is bound to
#[derive(Debug, Default)]
struct SessionSlot {
    id: Option<String>,
    /// The client does not know `id` yet
    issued: bool,
}

/// Handle to the current request's session
///
/// Clones share the same slot, so an id change made by one extractor is
/// seen by the middleware when the response goes out.
#[derive(Debug, Clone)]
pub struct Session {
    slot: Arc<Mutex<SessionSlot>>,
    store: Arc<SessionStore>,
}

impl Session {
    fn new(id: Option<String>, store: Arc<SessionStore>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(SessionSlot { id, issued: false })),
            store,
        }
    }

    /// Internal id of the authenticated user
    pub async fn user_id(&self) -> Option<String> {
        let slot = self.slot.lock().await;
        match &slot.id {
            Some(id) => self.store.read(id, |s| s.user_id.clone()).await,
            None => None,
        }
    }

    /// Bind `user_id` to this session under a freshly issued session id
    pub async fn log_in(&self, user_id: &str) {
        let mut slot = self.slot.lock().await;
        let id = match slot.id.take() {
            Some(old) => self.store.rotate(&old).await,
            None => self.store.create().await,
        };
        let user_id = user_id.to_string();
        self.store.update(&id, |s| s.user_id = Some(user_id)).await;
        slot.id = Some(id);
        slot.issued = true;
    }

    /// Forget the authenticated user; pending flashes survive
    pub async fn log_out(&self) {
        let slot = self.slot.lock().await;
        if let Some(id) = &slot.id {
            self.store.update(id, |s| s.user_id = None).await;
        }
    }

    /// Queue a one-time message under `key`
    pub async fn flash(&self, key: &str, message: impl Into<String>) {
        let message = message.into();
        let mut slot = self.slot.lock().await;
        let id = match &slot.id {
            Some(id) => id.clone(),
            None => {
                let id = self.store.create().await;
                slot.id = Some(id.clone());
                slot.issued = true;
                id
            }
        };
        self.store
            .update(&id, |s| {
                s.flash.entry(key.to_string()).or_default().push(message)
            })
            .await;
    }

    /// Consume every message queued under `key`
    pub async fn take_flash(&self, key: &str) -> Vec<String> {
        let slot = self.slot.lock().await;
        match &slot.id {
            Some(id) => {
                self.store
                    .update(id, |s| s.flash.remove(key).unwrap_or_default())
                    .await
            }
            None => Vec::new(),
        }
    }

    /// Session id the client still has to be told about
    async fn issued_id(&self) -> Option<String> {
        let slot = self.slot.lock().await;
        if slot.issued {
            slot.id.clone()
        } else {
            None
        }
    }
}

impl SessionStore {
    /// Handle to a not yet stored session, outside of a request
    pub fn start(self: &Arc<Self>) -> Session {
        Session::new(None, Arc::clone(self))
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Session>().cloned().ok_or_else(|| {
            tracing::error!("❌ Session requested but session_layer is not installed");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }
}

/// Middleware resuming the session for each request
pub async fn session_layer(
    State(store): State<Arc<SessionStore>>,
    mut req: Request,
    next: Next,
) -> Response {
    let mut existing = session_cookie(req.headers(), &store.config.cookie_name);
    if let Some(id) = &existing {
        if !store.resume(id).await {
            existing = None;
        }
    }

    let session = Session::new(existing, Arc::clone(&store));
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    if let Some(id) = session.issued_id().await {
        let cookie = Cookie::build((store.config.cookie_name.clone(), id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(store.config.secure)
            .build();
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("❌ Failed to encode session cookie: {}", e),
        }
    }

    response
}

/// Find the value of cookie `name` in the request's Cookie headers
fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;

    fn store() -> Arc<SessionStore> {
        Arc::new(SessionStore::new(SessionConfig {
            cookie_name: "projboard.sid".into(),
            ttl_secs: 60,
            secure: false,
            cleanup_interval_secs: 60,
        }))
    }

    #[tokio::test]
    async fn flash_is_consumed_once() {
        let session = store().start();
        session.flash(ERROR_MESSAGE, "first").await;
        session.flash(ERROR_MESSAGE, "second").await;

        assert_eq!(session.take_flash(ERROR_MESSAGE).await, vec!["first", "second"]);
        assert!(session.take_flash(ERROR_MESSAGE).await.is_empty());
    }

    #[tokio::test]
    async fn flash_keys_are_independent() {
        let session = store().start();
        session.flash(LOGIN_MESSAGE, "bad password").await;
        assert!(session.take_flash(SIGNUP_MESSAGE).await.is_empty());
        assert_eq!(session.take_flash(LOGIN_MESSAGE).await, vec!["bad password"]);
    }

    #[tokio::test]
    async fn log_out_keeps_flashes() {
        let session = store().start();
        session.log_in("u1").await;
        session.flash(LOGIN_MESSAGE, "bye").await;
        session.log_out().await;

        assert_eq!(session.user_id().await, None);
        assert_eq!(session.take_flash(LOGIN_MESSAGE).await, vec!["bye"]);
    }

    #[tokio::test]
    async fn reads_do_not_store_a_session() {
        let store = store();
        let session = store.start();
        assert_eq!(session.user_id().await, None);
        assert!(session.take_flash(ERROR_MESSAGE).await.is_empty());
        session.log_out().await;

        assert_eq!(store.len().await, 0);
        assert_eq!(session.issued_id().await, None);
    }

    #[tokio::test]
    async fn log_in_issues_a_new_id() {
        let store = store();
        let session = store.start();
        session.flash(LOGIN_MESSAGE, "before").await;
        let before = session.issued_id().await.unwrap();

        session.log_in("u1").await;
        let after = session.issued_id().await.unwrap();

        assert_ne!(before, after);
        assert!(!store.resume(&before).await);
        assert_eq!(store.len().await, 1);
        assert_eq!(session.user_id().await.as_deref(), Some("u1"));
        assert_eq!(session.take_flash(LOGIN_MESSAGE).await, vec!["before"]);
    }

    #[test]
    fn finds_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; projboard.sid=abc-123; lang=en"),
        );
        assert_eq!(session_cookie(&headers, "projboard.sid").as_deref(), Some("abc-123"));
        assert_eq!(session_cookie(&headers, "missing"), None);
    }
}
