use std::sync::Arc;
use std::time::Instant;

use crate::models::chat::{ChatMessage, SessionId};

/// Default number of exchange turns kept after the system turn.
pub const DEFAULT_MAX_HISTORY_TURNS: usize = 50;

/// Default number of turns sent to the completion API.
pub const DEFAULT_CONTEXT_WINDOW: usize = 10;

/// Complete conversation state stored in memory cache
#[derive(Debug, Clone)]
pub struct ConversationState {
    /// Session identifier
    pub session_id: SessionId,

    /// Turn 0 is always the system directive
    messages: Vec<ChatMessage>,

    system_prompt: Arc<str>,

    max_history_turns: usize,

    /// Session creation time
    pub created_at: Instant,

    /// Last activity timestamp (for monitoring)
    pub last_activity: Instant,
}

impl ConversationState {
    /// Create new conversation session seeded with the system directive
    pub fn new(session_id: SessionId, system_prompt: Arc<str>, max_history_turns: usize) -> Self {
        let now = Instant::now();
        Self {
            session_id,
            messages: vec![ChatMessage::system(&*system_prompt)],
            system_prompt,
            max_history_turns,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn system_turn(&self) -> &ChatMessage {
        &self.messages[0]
    }

    pub fn turn_count(&self) -> usize {
        self.messages.len()
    }

    /// Drop every turn except a fresh system directive.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.messages.push(ChatMessage::system(&*self.system_prompt));
    }

    /// Append a turn, then truncate the oldest non-system turns past the cap.
    /// Returns how many turns were dropped.
    pub fn append(&mut self, message: ChatMessage) -> usize {
        self.messages.push(message);

        let limit = self.max_history_turns + 1;
        if self.messages.len() <= limit {
            return 0;
        }

        let dropped = self.messages.len() - limit;
        self.messages.drain(1..1 + dropped);
        dropped
    }

    /// Last `n` turns in order.
    pub fn recent_window(&self, n: usize) -> Vec<ChatMessage> {
        let start = self.messages.len().saturating_sub(n);
        self.messages[start..].to_vec()
    }

    /// Update last activity timestamp
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

/// Which path produced a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Math,
    Command,
    Remote,
    Fallback,
    GeneratorFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    pub source: ReplySource,
}

impl ChatReply {
    pub fn new(response: impl Into<String>, source: ReplySource) -> Self {
        Self {
            response: response.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ConversationState {
        ConversationState::new("s1".to_string(), Arc::from("SYSTEM"), DEFAULT_MAX_HISTORY_TURNS)
    }

    #[test]
    fn test_new_session_is_seeded() {
        let state = state();
        assert_eq!(state.turn_count(), 1);
        assert_eq!(state.system_turn(), &ChatMessage::system("SYSTEM"));
    }

    #[test]
    fn test_sixty_appends_cap_at_fifty_one() {
        let mut state = state();
        let mut dropped = 0;
        for i in 0..60 {
            dropped += state.append(ChatMessage::user(format!("msg {}", i)));
        }

        assert_eq!(state.turn_count(), 51);
        assert_eq!(dropped, 10);
        assert_eq!(state.system_turn(), &ChatMessage::system("SYSTEM"));
        // Oldest surviving exchange turn is the 11th append
        assert_eq!(state.messages()[1].content, "msg 10");
        assert_eq!(state.messages()[50].content, "msg 59");
    }

    #[test]
    fn test_reset_restores_single_system_turn() {
        let mut state = state();
        state.append(ChatMessage::user("hello"));
        state.append(ChatMessage::assistant("HELLO"));
        state.reset();

        assert_eq!(state.messages(), &[ChatMessage::system("SYSTEM")]);
    }

    #[test]
    fn test_recent_window() {
        let mut state = state();
        for i in 0..4 {
            state.append(ChatMessage::user(format!("msg {}", i)));
        }

        let window = state.recent_window(2);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].content, "msg 2");
        assert_eq!(window[1].content, "msg 3");

        // Shorter history returns everything, system turn included
        let window = state.recent_window(10);
        assert_eq!(window.len(), 5);
        assert!(window[0].role.is_system());
    }
}
