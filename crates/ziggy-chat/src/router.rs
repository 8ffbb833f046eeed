//! Chat router: decides which strategy answers a message and records the
//! exchange in the session transcript.
//!
//! Branches, first match wins:
//! 1. exact FAQ match on the normalized message,
//! 2. recommendation keywords answered from the catalog,
//! 3. the recommendation backend.
//!
//! Only the third branch costs a network call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, error};
use ziggy_core::config::{BackendKind, ChatConfig};
use ziggy_core::{Catalog, ConversationTurn};

use crate::backend::{GenerationRequest, RecommendationBackend};
use crate::error::ChatError;
use crate::intent::{self, Intent};
use crate::recommend;
use crate::session::SessionStore;

/// Which branch produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Faq,
    MenuFilter,
    Generated,
}

/// A routed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
    pub branch: Branch,
}

type SessionLock = Arc<tokio::sync::Mutex<()>>;

/// Central coordinator for incoming chat messages.
pub struct ChatRouter {
    catalog: Arc<Catalog>,
    sessions: Arc<dyn SessionStore>,
    backend: Arc<dyn RecommendationBackend>,
    config: ChatConfig,
    session_locks: Mutex<HashMap<String, SessionLock>>,
}

impl ChatRouter {
    pub fn new(
        catalog: Arc<Catalog>,
        sessions: Arc<dyn SessionStore>,
        backend: Arc<dyn RecommendationBackend>,
        config: ChatConfig,
    ) -> Self {
        Self {
            catalog,
            sessions,
            backend,
            config,
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Transcript for a session, `None` if the session is unknown.
    pub fn transcript(&self, session_id: &str) -> Result<Option<Vec<ConversationTurn>>, ChatError> {
        self.sessions.transcript(session_id)
    }

    /// Forget a session. Returns whether it existed.
    pub fn clear_session(&self, session_id: &str) -> Result<bool, ChatError> {
        self.sessions.remove(session_id)
    }

    /// Route one message for one session.
    pub async fn route(&self, message: &str, session_id: &str) -> Result<ChatReply, ChatError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(ChatError::validation("Session ID is required."));
        }
        if message.trim().is_empty() {
            return Err(ChatError::validation("Message is required."));
        }
        if let Some(max) = self.config.max_message_length.filter(|m| *m > 0) {
            if message.chars().count() > max {
                return Err(ChatError::validation(format!(
                    "Message exceeds maximum length of {} characters.",
                    max
                )));
            }
        }

        if !self.config.serialize_same_session {
            return self.dispatch(message, session_id).await;
        }

        let lease = self.lease_session_lock(session_id)?;
        let _guard = lease.acquire().await;
        self.dispatch(message, session_id).await
    }

    async fn dispatch(&self, message: &str, session_id: &str) -> Result<ChatReply, ChatError> {
        let normalized = intent::normalize(message);

        match intent::classify(&normalized) {
            Intent::Faq(answer) => {
                debug!(session_id, "Answered from FAQ");
                self.record_exchange(session_id, message, answer)?;
                Ok(ChatReply {
                    reply: answer.to_string(),
                    branch: Branch::Faq,
                })
            }
            Intent::MenuFilter(filter) => {
                debug!(session_id, ?filter, "Answered from catalog filter");
                let reply = recommend::compose(&self.catalog, filter);
                self.record_exchange(session_id, message, &reply)?;
                Ok(ChatReply {
                    reply,
                    branch: Branch::MenuFilter,
                })
            }
            Intent::Generate => {
                let history = self.sessions.transcript(session_id)?.unwrap_or_default();
                self.sessions
                    .append(session_id, vec![ConversationTurn::user(message)])?;

                debug!(
                    session_id,
                    backend = self.backend.kind().as_str(),
                    history = history.len(),
                    "Delegating to recommendation backend"
                );
                let reply = self
                    .backend
                    .generate(GenerationRequest {
                        session_id,
                        message,
                        history: &history,
                    })
                    .await
                    .inspect_err(|e| error!(session_id, error = %e, "Generation failed"))?;

                self.sessions
                    .append(session_id, vec![ConversationTurn::assistant(reply.clone())])?;
                Ok(ChatReply {
                    reply,
                    branch: Branch::Generated,
                })
            }
        }
    }

    fn record_exchange(&self, session_id: &str, message: &str, reply: &str) -> Result<(), ChatError> {
        self.sessions.append(
            session_id,
            vec![
                ConversationTurn::user(message),
                ConversationTurn::assistant(reply),
            ],
        )
    }

    fn lease_session_lock<'a>(
        &'a self,
        session_id: &'a str,
    ) -> Result<SessionLockLease<'a>, ChatError> {
        let mut locks = self
            .session_locks
            .lock()
            .map_err(|e| ChatError::Storage(format!("session lock table poisoned: {}", e)))?;
        let lock = Arc::clone(locks.entry(session_id.to_string()).or_default());
        Ok(SessionLockLease {
            router: self,
            session_id,
            lock: Some(lock),
        })
    }

    /// Drop the lock entry once no request holds or awaits it.
    fn release_session_lock(&self, session_id: &str) {
        if let Ok(mut locks) = self.session_locks.lock() {
            if locks
                .get(session_id)
                .is_some_and(|l| Arc::strong_count(l) == 1)
            {
                locks.remove(session_id);
            }
        }
    }
}

/// A request's handle on its session lock. Dropping it, including when the
/// routing future is cancelled, removes the table entry once unused.
struct SessionLockLease<'a> {
    router: &'a ChatRouter,
    session_id: &'a str,
    lock: Option<SessionLock>,
}

impl SessionLockLease<'_> {
    async fn acquire(&self) -> Option<tokio::sync::OwnedMutexGuard<()>> {
        match &self.lock {
            Some(lock) => Some(Arc::clone(lock).lock_owned().await),
            None => None,
        }
    }
}

impl Drop for SessionLockLease<'_> {
    fn drop(&mut self) {
        // Our handle has to go before the remaining ones are counted.
        drop(self.lock.take());
        self.router.release_session_lock(self.session_id);
    }
}

// =============================================================================
// Tests
// =============================================================================
