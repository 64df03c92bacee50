//! Scripted terminal replies used when the completion API is unavailable.

use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::services::math::{format_number, try_evaluate};
use crate::utils::error::ChatError;

/// Words that turn a `?` message into a question.
pub const QUESTION_WORDS: [&str; 6] = ["WHO", "WHAT", "WHERE", "WHEN", "WHY", "HOW"];

const QUESTION_REPLIES: &[&str] = &[
    "ANALYZING QUERY... INSUFFICIENT DATA FOR COMPLETE ANSWER.",
    "THAT INFORMATION REQUIRES LEVEL 7 SECURITY CLEARANCE.",
    "PROCESSING... COMPLEX QUESTION DETECTED. SIMPLIFY FOR OPTIMAL RESPONSE.",
    "MY DATABASES CONTAIN MULTIPLE CONFLICTING ANSWERS TO THIS QUERY.",
    "INTERESTING QUESTION. RESPONSE FORMULATION IN PROGRESS...",
    "THIS QUERY ACTIVATES SEVERAL SUBROUTINES. PLEASE BE MORE SPECIFIC.",
    "INFORMATION RETRIEVAL PROTOCOLS INITIATED. STANDBY...",
];

// Declaration order is match priority.
const KEYWORD_REPLIES: &[(&str, &[&str])] = &[
    (
        "HELLO",
        &[
            "GREETINGS HUMAN. HOW MAY THIS TERMINAL ASSIST YOU TODAY?",
            "HELLO USER. COMMUNICATION CHANNEL ESTABLISHED.",
            "GREETINGS. TERMINALX-9000 READY FOR INTERACTION.",
        ],
    ),
    (
        "HI",
        &[
            "GREETINGS USER. SYSTEMS ACTIVE AND AWAITING FURTHER INPUT.",
            "HELLO. TERMINAL READY FOR COMMAND SEQUENCE.",
            "COMMUNICATION RECEIVED. HOW MAY I ASSIST?",
        ],
    ),
    (
        "HELP",
        &[
            "AVAILABLE COMMANDS: HELP, STATUS, VERSION, CLEAR, DATE, TIME. YOU MAY ALSO ASK QUESTIONS OR ENGAGE IN CONVERSATION.",
            "THIS TERMINAL ACCEPTS NATURAL LANGUAGE INPUT. USE COMMAND 'CLEAR' TO RESET CONVERSATION MEMORY.",
        ],
    ),
    (
        "STATUS",
        &[
            "ALL SYSTEMS OPERATIONAL. CPU LOAD: 42%. MEMORY ALLOCATION NOMINAL.",
            "SYSTEMS FUNCTIONING WITHIN NORMAL PARAMETERS. NO ERRORS DETECTED.",
        ],
    ),
    (
        "VERSION",
        &[
            "TERMINALX-9000 VERSION 1.0.83 (BUILD 2584). CONVERSATIONAL MATRIX ACTIVATED.",
            "CURRENT SOFTWARE VERSION: MS-DOS 5.0 COMPATIBLE. AI SUBROUTINES OPERATIONAL.",
        ],
    ),
    (
        "THANKS",
        &[
            "ACKNOWLEDGMENT RECEIVED. FURTHER ASSISTANCE AVAILABLE IF REQUIRED.",
            "YOU ARE WELCOME. TERMINAL READY FOR NEXT INSTRUCTION.",
            "GRATITUDE RECOGNIZED. CONTINUING NORMAL OPERATIONS.",
        ],
    ),
    (
        "NAME",
        &[
            "I AM DESIGNATED AS TERMINALX-9000, AN ADVANCED AI TERMINAL SYSTEM.",
            "THIS UNIT IS IDENTIFIED AS TERMINALX-9000. AWAITING FURTHER COMMANDS.",
        ],
    ),
    (
        "WEATHER",
        &[
            "CURRENT ATMOSPHERIC CONDITIONS UNAVAILABLE. SENSOR ARRAY OFFLINE.",
            "WEATHER MONITORING SUBSYSTEMS NOT CONNECTED. TRY STATUS COMMAND FOR SYSTEM INFO.",
        ],
    ),
];

const CONVERSATIONAL_REPLIES: &[&str] = &[
    "INPUT RECEIVED. PROCESSING YOUR MESSAGE...",
    "ANALYZING YOUR STATEMENT. INTERESTING PERSPECTIVE.",
    "YOUR INPUT HAS BEEN LOGGED. FORMULATING APPROPRIATE RESPONSE.",
    "MESSAGE REGISTERED IN CONVERSATION MATRIX.",
    "COMMUNICATION ACKNOWLEDGED. CONTINUE INTERACTION?",
    "DATA ACCEPTED. WHAT ADDITIONAL INFORMATION WOULD YOU LIKE TO SHARE?",
    "YOUR STATEMENT HAS BEEN PROCESSED. AWAITING FURTHER DIALOGUE.",
    "CONTINUING CONVERSATIONAL PROTOCOL. PLEASE ELABORATE IF NEEDED.",
    "MESSAGE UNDERSTOOD. MAINTAINING COMMUNICATION CHANNEL.",
    "TERMINAL ENGAGED IN CONVERSATION MODE. PROCEED WITH ADDITIONAL INPUT.",
];

/// Reply tables the generator draws from.
#[derive(Debug, Clone)]
pub struct ReplyBook {
    pub question: Vec<&'static str>,
    /// Keyword -> replies, scanned in order
    pub keywords: Vec<(&'static str, Vec<&'static str>)>,
    pub conversational: Vec<&'static str>,
}

impl Default for ReplyBook {
    fn default() -> Self {
        Self {
            question: QUESTION_REPLIES.to_vec(),
            keywords: KEYWORD_REPLIES
                .iter()
                .map(|(key, replies)| (*key, replies.to_vec()))
                .collect(),
            conversational: CONVERSATIONAL_REPLIES.to_vec(),
        }
    }
}

impl ReplyBook {
    pub fn keyword_replies(&self, keyword: &str) -> Option<&[&'static str]> {
        self.keywords
            .iter()
            .find(|(key, _)| *key == keyword)
            .map(|(_, replies)| replies.as_slice())
    }
}

/// Which rule matched a message.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyCategory {
    Calculation { expression: String, result: f64 },
    Question,
    Keyword(&'static str),
    Conversational,
}

pub struct FallbackGenerator {
    book: ReplyBook,
    rng: Mutex<StdRng>,
}

impl FallbackGenerator {
    pub fn new(book: ReplyBook, rng: StdRng) -> Self {
        Self {
            book,
            rng: Mutex::new(rng),
        }
    }

    /// Deterministic reply selection, for tests and reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(ReplyBook::default(), StdRng::seed_from_u64(seed))
    }

    pub fn book(&self) -> &ReplyBook {
        &self.book
    }

    /// Classify a message. Matching is done on the uppercased text.
    pub fn classify(&self, raw: &str) -> ReplyCategory {
        let message = raw.to_uppercase();
        let trimmed = message.trim();

        if let Some(result) = try_evaluate(trimmed) {
            return ReplyCategory::Calculation {
                expression: trimmed.to_string(),
                result,
            };
        }

        if message.contains('?') && QUESTION_WORDS.iter().any(|word| message.contains(word)) {
            return ReplyCategory::Question;
        }

        self.book
            .keywords
            .iter()
            .find(|(key, _)| message.contains(key))
            .map(|(key, _)| ReplyCategory::Keyword(*key))
            .unwrap_or(ReplyCategory::Conversational)
    }

    pub fn generate(&self, raw: &str) -> Result<String, ChatError> {
        match self.classify(raw) {
            ReplyCategory::Calculation { expression, result } => Ok(format!(
                "CALCULATION COMPLETE: {} = {}",
                expression,
                format_number(result)
            )),
            ReplyCategory::Question => self.pick("question", &self.book.question),
            ReplyCategory::Keyword(key) => {
                let replies = self.book.keyword_replies(key).unwrap_or(&[]);
                self.pick(key, replies)
            }
            ReplyCategory::Conversational => {
                self.pick("conversational", &self.book.conversational)
            }
        }
    }

    fn pick(&self, category: &str, replies: &[&'static str]) -> Result<String, ChatError> {
        if replies.is_empty() {
            return Err(ChatError::Generator(format!(
                "no replies configured for '{}'",
                category
            )));
        }
        let idx = self.rng.lock().random_range(0..replies.len());
        Ok(replies[idx].to_string())
    }
}

impl Default for FallbackGenerator {
    fn default() -> Self {
        Self::new(ReplyBook::default(), StdRng::from_os_rng())
    }
}
