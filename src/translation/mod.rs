/*!
 * Translation of masked dialogue through AI providers.
 *
 * - `orchestrator`: grouping, memory reuse, concurrent provider calls, unmask
 * - `retry`: bounded retry with a fallback value
 * - `prompts`: system prompt rendering
 */

pub mod orchestrator;
pub mod prompts;
pub mod retry;

// Re-export main types for easier usage
pub use self::orchestrator::{
    OrchestratorSettings, TextGroup, TranslationOrchestrator, TranslationOutcome, TranslationStats,
};
pub use self::prompts::PromptTemplate;
pub use self::retry::{RetryOutcome, RetryPolicy};
