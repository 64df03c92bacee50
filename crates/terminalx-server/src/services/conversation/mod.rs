//! Conversation memory management module
//!
//! Provides in-memory conversation state management with:
//! - Thread-safe session storage (DashMap + per-session async lock)
//! - History capped at the system turn plus the latest exchange turns
//! - Special terminal commands
//! - Orchestration of math, remote completion and scripted fallback

mod cache;
pub mod commands;
pub mod manager;
pub mod types;

pub use cache::{ConversationCache, SessionHandle};
pub use commands::SpecialCommand;
pub use manager::{CompletionProvider, ConversationManager, GENERATOR_FAILURE_REPLY};
pub use types::{ChatReply, ConversationState, ReplySource};

pub use crate::models::chat::{ChatMessage, SessionId};
