use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::FromRef;
use tracing::info;

use crate::config::Settings;
use crate::logging::{ActivityLogger, LoggerConfig};
use crate::services::conversation::{CompletionProvider, ConversationCache};
use crate::services::{ConversationManager, FallbackGenerator, LlmService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub conversation_manager: Arc<ConversationManager>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire services from settings. Must run inside a tokio runtime.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let logger = ActivityLogger::new(LoggerConfig {
            queue_capacity: settings.logging.queue_capacity,
        });

        let cache = ConversationCache::new(
            settings.persona.system_prompt.as_str(),
            settings.conversation.max_history_turns,
        );

        let completion_provider = LlmService::from_config(&settings.llm)?
            .map(|service| Box::new(service) as Box<dyn CompletionProvider>);
        if completion_provider.is_some() {
            info!("Completion API configured: {} ({})", settings.llm.base_url, settings.llm.model);
        } else {
            info!("Completion API key not set, answering with fallback responses only");
        }

        let manager = ConversationManager::new(
            cache,
            FallbackGenerator::default(),
            completion_provider,
            logger,
        )
        .with_context_window(settings.conversation.context_window)
        .with_remote_timeout(Duration::from_secs(settings.llm.timeout_seconds));

        Ok(Self {
            conversation_manager: Arc::new(manager),
            settings: Arc::new(settings),
        })
    }
}

impl FromRef<AppState> for Arc<ConversationManager> {
    fn from_ref(state: &AppState) -> Self {
        state.conversation_manager.clone()
    }
}

impl FromRef<AppState> for Arc<Settings> {
    fn from_ref(state: &AppState) -> Self {
        state.settings.clone()
    }
}
