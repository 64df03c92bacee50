use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::types::{ConversationState, DEFAULT_MAX_HISTORY_TURNS};
use crate::models::chat::{ChatMessage, Role};

/// Shared handle to one session. Holding its lock serializes every
/// read-modify-write on that session's turns.
pub type SessionHandle = Arc<Mutex<ConversationState>>;

/// Thread-safe in-memory session store.
/// Sessions live as long as the process; different sessions never contend.
#[derive(Clone)]
pub struct ConversationCache {
    /// Session storage: session_id -> ConversationState
    storage: Arc<DashMap<String, SessionHandle>>,

    system_prompt: Arc<str>,

    max_history_turns: usize,
}

impl ConversationCache {
    /// Create new cache instance
    pub fn new(system_prompt: impl Into<Arc<str>>, max_history_turns: usize) -> Self {
        info!("Initializing conversation cache with DashMap");
        Self {
            storage: Arc::new(DashMap::new()),
            system_prompt: system_prompt.into(),
            max_history_turns,
        }
    }

    pub fn with_default_limits(system_prompt: impl Into<Arc<str>>) -> Self {
        Self::new(system_prompt, DEFAULT_MAX_HISTORY_TURNS)
    }

    /// Existing session, or a new one seeded with the system turn.
    /// The flag is `true` when the session was created by this call.
    pub fn get_or_create(&self, session_id: &str) -> (SessionHandle, bool) {
        if let Some(entry) = self.storage.get(session_id) {
            return (entry.value().clone(), false);
        }

        match self.storage.entry(session_id.to_string()) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                let state = ConversationState::new(
                    session_id.to_string(),
                    self.system_prompt.clone(),
                    self.max_history_turns,
                );
                let handle = Arc::new(Mutex::new(state));
                entry.insert(handle.clone());
                debug!("Created session {}", session_id);
                (handle, true)
            }
        }
    }

    /// Look up a session without creating it
    pub fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.storage.get(session_id).map(|entry| entry.value().clone())
    }

    pub async fn reset(&self, session_id: &str) {
        let (handle, _) = self.get_or_create(session_id);
        handle.lock().await.reset();
        debug!("Reset session {}", session_id);
    }

    /// Returns the number of turns dropped by truncation
    pub async fn append(&self, session_id: &str, role: Role, content: impl Into<String>) -> usize {
        let (handle, _) = self.get_or_create(session_id);
        let mut state = handle.lock().await;
        state.touch();
        state.append(ChatMessage::new(role, content))
    }

    pub async fn recent_window(&self, session_id: &str, n: usize) -> Vec<ChatMessage> {
        match self.get(session_id) {
            Some(handle) => handle.lock().await.recent_window(n),
            None => Vec::new(),
        }
    }

    pub async fn turn_count(&self, session_id: &str) -> Option<usize> {
        match self.get(session_id) {
            Some(handle) => Some(handle.lock().await.turn_count()),
            None => None,
        }
    }

    /// Copy of a session's turns
    pub async fn snapshot(&self, session_id: &str) -> Option<Vec<ChatMessage>> {
        match self.get(session_id) {
            Some(handle) => Some(handle.lock().await.messages().to_vec()),
            None => None,
        }
    }

    /// Get number of active sessions
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}
