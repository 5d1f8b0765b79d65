//! Session Repository
//!
//! Keeps one `SessionState` per platform session id so that simultaneous
//! conversations never observe each other's pools or stage.

use crate::session::SessionState;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Defines the contract for anything that can hold conversation state between turns.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the stored state for `session_id`, or a fresh one if none exists.
    async fn load(&self, session_id: &str) -> Result<SessionState>;

    /// Stores the state for `session_id`, replacing any previous value.
    async fn save(&self, session_id: &str, state: SessionState) -> Result<()>;

    /// Forgets the session, e.g. once the conversation has been closed.
    async fn remove(&self, session_id: &str) -> Result<()>;
}

struct StoredSession {
    state: SessionState,
    last_seen: DateTime<Utc>,
}

/// An in-process `SessionStore` that drops sessions idle for longer than `ttl`.
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, StoredSession>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn evict_expired(&self, sessions: &mut HashMap<String, StoredSession>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_seen <= self.ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, "Evicted idle sessions");
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<SessionState> {
        let mut sessions = self.sessions.lock().await;
        self.evict_expired(&mut sessions, Utc::now());
        Ok(sessions
            .get(session_id)
            .map(|s| s.state.clone())
            .unwrap_or_default())
    }

    async fn save(&self, session_id: &str, state: SessionState) -> Result<()> {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(
            session_id.to_string(),
            StoredSession {
                state,
                last_seen: Utc::now(),
            },
        );
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> Result<()> {
        self.sessions.lock().await.remove(session_id);
        Ok(())
    }
}
