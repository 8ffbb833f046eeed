//! Session transcripts.
//!
//! A session is created lazily on its first append and only ever grows.
//! Retention is a policy of the store, not of the router: the default
//! policy keeps every session for the life of the process.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use ziggy_core::config::SessionRetentionConfig;
use ziggy_core::ConversationTurn;

use crate::error::ChatError;

/// Transcript storage keyed by the client-supplied session identifier.
pub trait SessionStore: Send + Sync {
    /// Append turns to a session, creating it if needed.
    fn append(&self, session_id: &str, turns: Vec<ConversationTurn>) -> Result<(), ChatError>;

    /// Ordered transcript of a session, or `None` if the session is unknown.
    fn transcript(&self, session_id: &str) -> Result<Option<Vec<ConversationTurn>>, ChatError>;

    fn contains(&self, session_id: &str) -> Result<bool, ChatError> {
        Ok(self.transcript(session_id)?.is_some())
    }

    /// Drop a session. Returns whether it existed.
    fn remove(&self, session_id: &str) -> Result<bool, ChatError>;

    /// Number of live sessions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single conversation.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub turns: Vec<ConversationTurn>,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    fn new(id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            turns: Vec::new(),
            created_at: now,
            last_active_at: now,
        }
    }
}

/// How long sessions are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Evict the least recently active session once this many exist.
    pub max_sessions: Option<usize>,
    /// Drop sessions idle for longer than this.
    pub idle_ttl: Option<Duration>,
}

impl RetentionPolicy {
    /// Keep everything forever.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_sessions.is_none() && self.idle_ttl.is_none()
    }
}

impl From<&SessionRetentionConfig> for RetentionPolicy {
    fn from(config: &SessionRetentionConfig) -> Self {
        Self {
            max_sessions: config.max_sessions.filter(|n| *n > 0),
            idle_ttl: config
                .idle_ttl_secs
                .filter(|s| *s > 0)
                .and_then(|s| i64::try_from(s).ok())
                .map(Duration::seconds),
        }
    }
}

/// Process-local session store guarded by a mutex.
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    policy: RetentionPolicy,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(RetentionPolicy::unbounded())
    }
}

impl InMemorySessionStore {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            policy,
        }
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Snapshot of a session including its timestamps.
    pub fn get(&self, session_id: &str) -> Result<Option<Session>, ChatError> {
        let mut sessions = self.lock()?;
        self.drop_if_expired(&mut sessions, session_id, Utc::now());
        Ok(sessions.get(session_id).cloned())
    }

    /// Remove every session idle beyond the TTL. Returns how many were dropped.
    pub fn purge_expired(&self) -> Result<usize, ChatError> {
        let Some(ttl) = self.policy.idle_ttl else {
            return Ok(0);
        };
        let now = Utc::now();
        let mut sessions = self.lock()?;
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_active_at <= ttl);
        let purged = before - sessions.len();
        if purged > 0 {
            debug!(purged, "Purged idle sessions");
        }
        Ok(purged)
    }

    // -- Private helpers --

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Session>>, ChatError> {
        self.sessions
            .lock()
            .map_err(|e| ChatError::Storage(format!("session lock poisoned: {}", e)))
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        self.policy
            .idle_ttl
            .is_some_and(|ttl| now - session.last_active_at > ttl)
    }

    fn drop_if_expired(
        &self,
        sessions: &mut HashMap<String, Session>,
        session_id: &str,
        now: DateTime<Utc>,
    ) {
        let expired = sessions
            .get(session_id)
            .is_some_and(|s| self.is_expired(s, now));
        if expired {
            sessions.remove(session_id);
            debug!(session_id, "Session expired");
        }
    }

    fn evict_for_insert(&self, sessions: &mut HashMap<String, Session>) {
        let Some(max) = self.policy.max_sessions else {
            return;
        };
        while sessions.len() >= max {
            let oldest = sessions
                .values()
                .min_by_key(|s| s.last_active_at)
                .map(|s| s.id.clone());
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                    debug!(session_id = %id, "Evicted least recently active session");
                }
                None => break,
            }
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn append(&self, session_id: &str, turns: Vec<ConversationTurn>) -> Result<(), ChatError> {
        let now = Utc::now();
        let mut sessions = self.lock()?;
        self.drop_if_expired(&mut sessions, session_id, now);

        if !sessions.contains_key(session_id) {
            self.evict_for_insert(&mut sessions);
            sessions.insert(session_id.to_string(), Session::new(session_id));
        }

        if let Some(session) = sessions.get_mut(session_id) {
            session.turns.extend(turns);
            session.last_active_at = now;
        }
        Ok(())
    }

    fn transcript(&self, session_id: &str) -> Result<Option<Vec<ConversationTurn>>, ChatError> {
        Ok(self.get(session_id)?.map(|s| s.turns))
    }

    fn remove(&self, session_id: &str) -> Result<bool, ChatError> {
        Ok(self.lock()?.remove(session_id).is_some())
    }

    fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }
}

// =============================================================================
// Tests
// =============================================================================
