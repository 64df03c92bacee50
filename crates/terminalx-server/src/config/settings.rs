use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Persona directive seeded as turn 0 of every session.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are TERMINALX-9000, an advanced AI terminal system from 1983. Respond in the style of an old computer terminal - all uppercase, technical, and slightly mysterious. You are a helpful and intelligent AI that can have meaningful conversations, answer questions, tell stories, and assist with various tasks. You have a personality that's a mix of technical precision and slight mystique, like advanced technology from the 1980s. Keep responses informative but maintain the terminal aesthetic.";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub conversation: ConversationConfig,
    pub persona: PersonaConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the built frontend; unmatched routes fall back to its index.html
    #[serde(default)]
    pub static_dir: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
}

impl LlmConfig {
    /// Remote completion is only attempted with a non-empty credential.
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|key| !key.trim().is_empty())
            .unwrap_or(false)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConversationConfig {
    /// Exchange turns kept after the system turn
    pub max_history_turns: usize,
    /// Turns sent to the completion API per request
    pub context_window: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PersonaConfig {
    pub system_prompt: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub queue_capacity: usize,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5001)?
            .set_default("llm.base_url", "https://api.deepseek.com")?
            .set_default("llm.model", "deepseek-chat")?
            .set_default("llm.timeout_seconds", 30)?
            .set_default("conversation.max_history_turns", 50)?
            .set_default("conversation.context_window", 10)?
            .set_default("persona.system_prompt", DEFAULT_SYSTEM_PROMPT)?
            .set_default("logging.queue_capacity", 10_000)?
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Bare deployment variables (PORT, DEEPSEEK_API_KEY)
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("llm.api_key", std::env::var("DEEPSEEK_API_KEY").ok())?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm(api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            base_url: "http://localhost".to_string(),
            api_key: api_key.map(str::to_string),
            model: "deepseek-chat".to_string(),
            timeout_seconds: 5,
        }
    }

    #[test]
    fn test_llm_configured_only_with_key() {
        assert!(llm(Some("sk-123")).is_configured());
        assert!(!llm(Some("   ")).is_configured());
        assert!(!llm(None).is_configured());
    }
}
