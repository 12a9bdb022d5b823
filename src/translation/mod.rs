/*!
 * Document translation using AI backends.
 *
 * - `backend`: the backend trait and its Gemini and OpenAI-compatible implementations
 * - `prompts`: prompt templates shared by the backends
 * - `response`: repair and length normalization of backend answers
 * - `batch`: sequential batch translation of extracted segments
 * - `pipeline`: one document from package bytes to rebuilt package
 */

// Re-export main types for easier usage
pub use self::backend::{
    create_backend, BackendKind, BatchTranslation, ChatCompletionBackend, StructuredBackend,
    TranslationBackend,
};
pub use self::batch::{BatchTranslator, TokenUsageStats, TranslationProgress};
pub use self::pipeline::{DocumentTranslator, TranslatedDocument, TranslationOptions};
pub use self::prompts::PromptTemplate;

// Submodules
pub mod backend;
pub mod batch;
pub mod pipeline;
pub mod prompts;
pub mod response;
