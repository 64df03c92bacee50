pub mod conversation;
pub mod fallback;
pub mod llm_service;
pub mod math;

pub use conversation::ConversationManager;
pub use fallback::FallbackGenerator;
pub use llm_service::LlmService;
