//! Activity logging module with async queue mechanism

mod logger;
pub mod types;

pub use logger::{ActivityLogger, LoggerConfig};
pub use types::{ActivityLog, ActivityStatus, ActivityType};
