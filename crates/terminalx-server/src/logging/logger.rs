use flume::{bounded, Receiver, Sender};
use tracing::{error, info, warn};

use super::types::{ActivityLog, ActivityStatus};

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Queue capacity (max logs in memory before dropping)
    pub queue_capacity: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 10_000,
        }
    }
}

/// Async activity logger with queue mechanism
#[derive(Clone)]
pub struct ActivityLogger {
    sender: Sender<ActivityLog>,
}

impl ActivityLogger {
    /// Initialize logger with a background worker. Must be called inside a tokio runtime.
    pub fn new(config: LoggerConfig) -> Self {
        let (logger, receiver) = Self::channel(config.queue_capacity);

        info!(
            "Initializing ActivityLogger: queue={}",
            config.queue_capacity
        );

        tokio::spawn(async move {
            Self::worker_loop(receiver).await;
        });

        logger
    }

    /// Logger whose queue is drained by the caller instead of a worker.
    pub fn channel(capacity: usize) -> (Self, Receiver<ActivityLog>) {
        let (sender, receiver) = bounded(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Log activity (non-blocking, fire-and-forget)
    pub fn log(&self, activity: ActivityLog) {
        if let Err(e) = self.sender.try_send(activity) {
            warn!("Failed to enqueue activity log (queue full?): {}", e);
        }
    }

    async fn worker_loop(receiver: Receiver<ActivityLog>) {
        while let Ok(log) = receiver.recv_async().await {
            emit(&log);
        }
        info!("Activity logger worker shutting down (channel closed)");
    }

    /// Get queue statistics (for monitoring)
    pub fn queue_len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_queue_full(&self) -> bool {
        self.sender.is_full()
    }
}

fn emit(log: &ActivityLog) {
    match log.activity_status {
        ActivityStatus::Error => error!(
            target: "terminalx::activity",
            session_id = %log.session_id,
            activity = log.activity_type.as_str(),
            input = ?log.message_content,
            error = ?log.error_message,
            processing_time_ms = ?log.processing_time_ms,
            "chat activity"
        ),
        ActivityStatus::Warning => warn!(
            target: "terminalx::activity",
            session_id = %log.session_id,
            activity = log.activity_type.as_str(),
            input = ?log.message_content,
            error = ?log.error_message,
            "chat activity"
        ),
        ActivityStatus::Success | ActivityStatus::Info => info!(
            target: "terminalx::activity",
            session_id = %log.session_id,
            activity = log.activity_type.as_str(),
            status = log.activity_status.as_str(),
            response = ?log.response_content,
            turn_count = ?log.turn_count,
            dropped_turns = ?log.dropped_turns,
            processing_time_ms = ?log.processing_time_ms,
            "chat activity"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::types::ActivityType;
    use std::time::Duration;

    #[test]
    fn test_full_queue_drops_instead_of_blocking() {
        let (logger, receiver) = ActivityLogger::channel(2);
        for _ in 0..5 {
            logger.log(ActivityLog::builder("s1", ActivityType::FallbackUsed).build());
        }

        assert!(logger.is_queue_full());
        assert_eq!(receiver.drain().count(), 2);
    }

    #[tokio::test]
    async fn test_worker_drains_queue() {
        let logger = ActivityLogger::new(LoggerConfig { queue_capacity: 16 });
        for _ in 0..3 {
            logger.log(ActivityLog::builder("s1", ActivityType::SessionCreated).build());
        }

        for _ in 0..50 {
            if logger.queue_len() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(logger.queue_len(), 0);
    }
}
