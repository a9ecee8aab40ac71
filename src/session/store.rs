/// In-process session store
///
/// Sessions are keyed by an opaque uuid and expire after `ttl` without
/// access. Entries only exist once something has been written to them;
/// expired entries are never resumed and are swept by a periodic task.

use crate::config::SessionConfig;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Per-session state
#[derive(Debug, Clone)]
pub struct SessionData {
    /// Internal id of the authenticated user, if any
    pub user_id: Option<String>,
    /// Pending one-time messages, by key
    pub flash: HashMap<String, Vec<String>>,
    expires_at: Instant,
}

impl SessionData {
    fn new(ttl: Duration) -> Self {
        Self {
            user_id: None,
            flash: HashMap::new(),
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }

    fn touch(&mut self, ttl: Duration) {
        self.expires_at = Instant::now() + ttl;
    }
}

/// Session store shared by all requests
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionData>>,
    pub(crate) config: SessionConfig,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        let ttl = Duration::from_secs(config.ttl_secs);
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
            ttl,
        }
    }

    /// Refresh the session `id` if it is still valid
    ///
    /// Expired sessions are dropped and reported as unknown.
    pub async fn resume(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(data) if data.is_valid() => {
                data.touch(self.ttl);
                true
            }
            Some(_) => {
                sessions.remove(id);
                false
            }
            None => false,
        }
    }

    /// Store an empty session under a fresh id
    pub async fn create(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(id.clone(), SessionData::new(self.ttl));
        id
    }

    /// Move the data of session `id` to a fresh id and forget the old one
    pub async fn rotate(&self, id: &str) -> String {
        let mut sessions = self.sessions.write().await;
        let mut data = sessions
            .remove(id)
            .unwrap_or_else(|| SessionData::new(self.ttl));
        data.touch(self.ttl);

        let new_id = uuid::Uuid::new_v4().to_string();
        sessions.insert(new_id.clone(), data);
        new_id
    }

    /// Read from a session; missing sessions read as empty
    pub async fn read<T>(&self, id: &str, f: impl FnOnce(&SessionData) -> T) -> T {
        let sessions = self.sessions.read().await;
        match sessions.get(id) {
            Some(data) => f(data),
            None => f(&SessionData::new(self.ttl)),
        }
    }

    /// Mutate a session, recreating it if it was evicted meanwhile
    pub async fn update<T>(&self, id: &str, f: impl FnOnce(&mut SessionData) -> T) -> T {
        let mut sessions = self.sessions.write().await;
        let data = sessions
            .entry(id.to_string())
            .or_insert_with(|| SessionData::new(self.ttl));
        f(data)
    }

    /// Drop every expired session; returns how many were evicted
    pub async fn cleanup(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.is_valid());
        before - sessions.len()
    }

    /// Run `cleanup` every `every` until the store is dropped
    pub fn spawn_cleanup(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let store: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                let evicted = store.cleanup().await;
                if evicted > 0 {
                    tracing::debug!("🧹 Evicted {} expired sessions", evicted);
                }
            }
        })
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
