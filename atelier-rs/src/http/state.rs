use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::db::{Database, Role};
use crate::exhibitions::ExhibitionStore;

/// Authenticated identity attached to a session token.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub role: Role,
}

/// Session token -> (identity, expires_at). Expired entries are dropped on
/// lookup. Each login gets its own token, so concurrent users never share
/// or overwrite each other's session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<DashMap<String, (Session, Instant)>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_hours: u64) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl: Duration::from_secs(ttl_hours * 3600),
        }
    }

    pub fn create(&self, username: String, role: Role) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        let expires = Instant::now() + self.ttl;
        self.inner
            .insert(token.clone(), (Session { username, role }, expires));
        token
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        let entry = self.inner.get(token)?;
        if entry.1 > Instant::now() {
            Some(entry.0.clone())
        } else {
            drop(entry);
            self.inner.remove(token);
            None
        }
    }

    pub fn remove(&self, token: &str) {
        self.inner.remove(token);
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub exhibitions: ExhibitionStore,
    pub sessions: SessionStore,
}
