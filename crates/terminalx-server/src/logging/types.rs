use chrono::{DateTime, Utc};
use serde::Serialize;

/// Activity type categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    SessionCreated,
    SessionReset,
    MathEvaluated,
    CommandHandled,
    RemoteCompletion,
    RemoteFailure,
    FallbackUsed,
    GeneratorFailure,
    HistoryTruncated,
}

impl ActivityType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SessionCreated => "session_created",
            Self::SessionReset => "session_reset",
            Self::MathEvaluated => "math_evaluated",
            Self::CommandHandled => "command_handled",
            Self::RemoteCompletion => "remote_completion",
            Self::RemoteFailure => "remote_failure",
            Self::FallbackUsed => "fallback_used",
            Self::GeneratorFailure => "generator_failure",
            Self::HistoryTruncated => "history_truncated",
        }
    }
}

/// Activity status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Success,
    Error,
    Warning,
    Info,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// One chat event
#[derive(Debug, Clone, Serialize)]
pub struct ActivityLog {
    pub session_id: String,

    pub activity_type: ActivityType,
    pub activity_status: ActivityStatus,

    pub message_content: Option<String>,
    pub response_content: Option<String>,

    pub turn_count: Option<usize>,
    pub dropped_turns: Option<usize>,

    pub processing_time_ms: Option<u64>,

    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl ActivityLog {
    /// Create builder for fluent API
    pub fn builder(session_id: impl Into<String>, activity_type: ActivityType) -> ActivityLogBuilder {
        ActivityLogBuilder::new(session_id, activity_type)
    }
}

/// Builder pattern for ActivityLog
pub struct ActivityLogBuilder {
    log: ActivityLog,
}

impl ActivityLogBuilder {
    pub fn new(session_id: impl Into<String>, activity_type: ActivityType) -> Self {
        Self {
            log: ActivityLog {
                session_id: session_id.into(),
                activity_type,
                activity_status: ActivityStatus::Success,
                message_content: None,
                response_content: None,
                turn_count: None,
                dropped_turns: None,
                processing_time_ms: None,
                error_message: None,
                created_at: Utc::now(),
            },
        }
    }

    pub fn status(mut self, status: ActivityStatus) -> Self {
        self.log.activity_status = status;
        self
    }

    pub fn message(mut self, content: impl Into<String>) -> Self {
        self.log.message_content = Some(content.into());
        self
    }

    pub fn response(mut self, content: impl Into<String>) -> Self {
        self.log.response_content = Some(content.into());
        self
    }

    pub fn turn_count(mut self, count: usize) -> Self {
        self.log.turn_count = Some(count);
        self
    }

    pub fn dropped_turns(mut self, count: usize) -> Self {
        self.log.dropped_turns = Some(count);
        self
    }

    pub fn processing_time(mut self, ms: u64) -> Self {
        self.log.processing_time_ms = Some(ms);
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.log.error_message = Some(message.into());
        self.log.activity_status = ActivityStatus::Error;
        self
    }

    pub fn build(self) -> ActivityLog {
        self.log
    }
}
