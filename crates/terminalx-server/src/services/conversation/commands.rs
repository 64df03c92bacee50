use chrono::{DateTime, Local};

pub const CLEAR_REPLY: &str = "SCREEN BUFFER CLEARED. CONVERSATION HISTORY RESET.";

pub const STATUS_REPLY: &str =
    "ALL SYSTEMS OPERATIONAL. AI CORE ONLINE. CPU LOAD: 42%. CONVERSATION MEMORY ACTIVE.";

/// Terminal commands answered without touching conversation history
/// (`Clear` resets it instead).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialCommand {
    Clear,
    Status,
    Time,
    Date,
}

impl SpecialCommand {
    /// Exact, case-insensitive match on the trimmed message.
    pub fn parse(message: &str) -> Option<Self> {
        match message.trim().to_lowercase().as_str() {
            "clear" => Some(Self::Clear),
            "status" => Some(Self::Status),
            "time" => Some(Self::Time),
            "date" => Some(Self::Date),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Clear => "clear",
            Self::Status => "status",
            Self::Time => "time",
            Self::Date => "date",
        }
    }

    pub fn reply(&self, now: DateTime<Local>) -> String {
        match self {
            Self::Clear => CLEAR_REPLY.to_string(),
            Self::Status => STATUS_REPLY.to_string(),
            Self::Time => format!(
                "CURRENT SYSTEM TIME: {}",
                now.format("%-I:%M:%S %p").to_string().to_uppercase()
            ),
            Self::Date => format!(
                "CURRENT SYSTEM DATE: {}",
                now.format("%-m/%-d/%Y").to_string().to_uppercase()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_is_trimmed_and_case_insensitive() {
        assert_eq!(SpecialCommand::parse("  CLEAR "), Some(SpecialCommand::Clear));
        assert_eq!(SpecialCommand::parse("Status"), Some(SpecialCommand::Status));
        assert_eq!(SpecialCommand::parse("time"), Some(SpecialCommand::Time));
        assert_eq!(SpecialCommand::parse("DATE\n"), Some(SpecialCommand::Date));
        assert_eq!(SpecialCommand::parse("status report"), None);
        assert_eq!(SpecialCommand::parse("clear please"), None);
    }

    #[test]
    fn test_time_and_date_format() {
        let now = Local.with_ymd_and_hms(2026, 10, 8, 15, 4, 5).unwrap();

        assert_eq!(
            SpecialCommand::Time.reply(now),
            "CURRENT SYSTEM TIME: 3:04:05 PM"
        );
        assert_eq!(
            SpecialCommand::Date.reply(now),
            "CURRENT SYSTEM DATE: 10/8/2026"
        );
        assert_eq!(SpecialCommand::Status.reply(now), STATUS_REPLY);
    }
}
