use serde::{Deserialize, Serialize};

pub type SessionId = String;

pub const DEFAULT_SESSION_ID: &str = "default";

/// Speaker of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }
}

/// One turn of a conversation. Also the wire shape of a completion message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

// ===== REQUEST MODELS =====

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "default_session_id", rename = "sessionId")]
    pub session_id: SessionId,
}

fn default_session_id() -> SessionId {
    DEFAULT_SESSION_ID.to_string()
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self {
            message: None,
            session_id: default_session_id(),
        }
    }
}

// ===== RESPONSE MODELS =====

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiTestResponse {
    pub message: String,
}
