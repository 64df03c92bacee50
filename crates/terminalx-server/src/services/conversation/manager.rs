use anyhow::Result;
use chrono::Local;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::logging::{ActivityLog, ActivityLogger, ActivityStatus, ActivityType};
use crate::models::chat::ChatMessage;
use crate::services::fallback::FallbackGenerator;
use crate::services::math::{format_number, try_evaluate};
use crate::utils::error::ChatError;

use super::cache::ConversationCache;
use super::commands::SpecialCommand;
use super::types::{ChatReply, ConversationState, ReplySource, DEFAULT_CONTEXT_WINDOW};

/// Reply when not even the fallback generator could answer.
pub const GENERATOR_FAILURE_REPLY: &str =
    "COMMUNICATION ERROR. AI CORE UNRESPONSIVE. RETRY TRANSMISSION.";

const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for the remote completion service
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

pub struct ConversationManager {
    cache: ConversationCache,
    generator: FallbackGenerator,
    completion_provider: Option<Box<dyn CompletionProvider>>,
    logger: ActivityLogger,
    context_window: usize,
    remote_timeout: Duration,
}

impl ConversationManager {
    pub fn new(
        cache: ConversationCache,
        generator: FallbackGenerator,
        completion_provider: Option<Box<dyn CompletionProvider>>,
        logger: ActivityLogger,
    ) -> Self {
        Self {
            cache,
            generator,
            completion_provider,
            logger,
            context_window: DEFAULT_CONTEXT_WINDOW,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    pub fn with_context_window(mut self, turns: usize) -> Self {
        self.context_window = turns.max(1);
        self
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn cache(&self) -> &ConversationCache {
        &self.cache
    }

    pub fn has_remote(&self) -> bool {
        self.completion_provider.is_some()
    }

    /// Produce the reply for one inbound message.
    ///
    /// The session stays locked from lookup to the final commit, so
    /// concurrent requests for the same session are applied one at a time,
    /// including while the remote call is pending.
    pub async fn handle(&self, message: &str, session_id: &str) -> Result<ChatReply, ChatError> {
        if message.is_empty() {
            return Err(ChatError::MissingInput);
        }

        let start = Instant::now();

        let (handle, created) = self.cache.get_or_create(session_id);
        if created {
            self.logger.log(
                ActivityLog::builder(session_id, ActivityType::SessionCreated)
                    .status(ActivityStatus::Info)
                    .build(),
            );
        }

        let mut state = handle.lock().await;
        state.touch();

        // Math short-circuits before special commands, so "2024" is a calculation
        let trimmed = message.trim();
        if let Some(result) = try_evaluate(trimmed) {
            let reply = format!(
                "CALCULATION COMPLETE: {} = {}",
                trimmed,
                format_number(result)
            );
            self.commit(&mut state, ChatMessage::user(message));
            self.commit(&mut state, ChatMessage::assistant(reply.clone()));

            self.logger.log(
                ActivityLog::builder(session_id, ActivityType::MathEvaluated)
                    .message(message)
                    .response(reply.clone())
                    .turn_count(state.turn_count())
                    .processing_time(start.elapsed().as_millis() as u64)
                    .build(),
            );
            return Ok(ChatReply::new(reply, ReplySource::Math));
        }

        if let Some(command) = SpecialCommand::parse(message) {
            let activity = if command == SpecialCommand::Clear {
                state.reset();
                ActivityType::SessionReset
            } else {
                ActivityType::CommandHandled
            };
            let reply = command.reply(Local::now());

            debug!("Session {} handled command '{}'", session_id, command.as_str());
            self.logger.log(
                ActivityLog::builder(session_id, activity)
                    .message(command.as_str())
                    .turn_count(state.turn_count())
                    .build(),
            );
            return Ok(ChatReply::new(reply, ReplySource::Command));
        }

        self.commit(&mut state, ChatMessage::user(message));

        if let Some(provider) = &self.completion_provider {
            match self.call_remote(provider.as_ref(), &state).await {
                Ok(text) => {
                    let reply = text.to_uppercase();
                    self.commit(&mut state, ChatMessage::assistant(reply.clone()));

                    self.logger.log(
                        ActivityLog::builder(session_id, ActivityType::RemoteCompletion)
                            .message(message)
                            .response(reply.clone())
                            .turn_count(state.turn_count())
                            .processing_time(start.elapsed().as_millis() as u64)
                            .build(),
                    );
                    return Ok(ChatReply::new(reply, ReplySource::Remote));
                }
                Err(e) => {
                    warn!("Remote completion failed for session {}: {}", session_id, e);
                    self.logger.log(
                        ActivityLog::builder(session_id, ActivityType::RemoteFailure)
                            .message(message)
                            .error(e.to_string())
                            .build(),
                    );
                }
            }
        }

        match self.generator.generate(message) {
            Ok(reply) => {
                self.commit(&mut state, ChatMessage::assistant(reply.clone()));

                self.logger.log(
                    ActivityLog::builder(session_id, ActivityType::FallbackUsed)
                        .message(message)
                        .response(reply.clone())
                        .turn_count(state.turn_count())
                        .processing_time(start.elapsed().as_millis() as u64)
                        .build(),
                );
                Ok(ChatReply::new(reply, ReplySource::Fallback))
            }
            Err(e) => {
                error!("Fallback generation failed for session {}: {}", session_id, e);
                self.logger.log(
                    ActivityLog::builder(session_id, ActivityType::GeneratorFailure)
                        .message(message)
                        .error(e.to_string())
                        .build(),
                );
                Ok(ChatReply::new(
                    GENERATOR_FAILURE_REPLY,
                    ReplySource::GeneratorFailure,
                ))
            }
        }
    }

    /// Completion payload: the last `context_window` turns, always led by
    /// the system directive.
    pub fn build_payload(&self, state: &ConversationState) -> Vec<ChatMessage> {
        let window = state.recent_window(self.context_window);
        if window.first().map(|m| m.role.is_system()).unwrap_or(false) {
            return window;
        }

        let mut payload = Vec::with_capacity(window.len() + 1);
        payload.push(state.system_turn().clone());
        payload.extend(window);
        payload
    }

    async fn call_remote(
        &self,
        provider: &dyn CompletionProvider,
        state: &ConversationState,
    ) -> Result<String, ChatError> {
        let payload = self.build_payload(state);
        debug!(
            "Calling completion API for session {} with {} messages",
            state.session_id,
            payload.len()
        );

        match tokio::time::timeout(self.remote_timeout, provider.complete(&payload)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ChatError::RemoteService(e.to_string())),
            Err(_) => Err(ChatError::RemoteService(format!(
                "timed out after {:?}",
                self.remote_timeout
            ))),
        }
    }

    fn commit(&self, state: &mut ConversationState, message: ChatMessage) {
        let dropped = state.append(message);
        if dropped > 0 {
            info!(
                "Session {} history capped, dropped {} oldest turn(s)",
                state.session_id, dropped
            );
            self.logger.log(
                ActivityLog::builder(state.session_id.clone(), ActivityType::HistoryTruncated)
                    .dropped_turns(dropped)
                    .turn_count(state.turn_count())
                    .build(),
            );
        }
    }
}
