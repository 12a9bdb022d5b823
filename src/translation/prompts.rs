/*!
 * Prompt templates for batch translation.
 *
 * Both backends send the same user prompt: the batch as a JSON string array
 * plus the rules the answer must follow.
 */

use serde_json::Value;

use crate::language_utils::prompt_language_name;

/// System message of the free-text backend
pub const TRANSLATOR_SYSTEM_PROMPT: &str = "You are a professional translator. Output only JSON.";

/// Prompt of the connection check
pub const CONNECTION_CHECK_PROMPT: &str = "Say OK";

/// Batch prompt template with placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// The default batch prompt
    pub const BATCH_TRANSLATOR: &'static str = "Task: Translate the following JSON string array into {target_language}.\n\
Requirements:\n\
1. Return ONLY a valid JSON array of strings.\n\
2. Length must be exactly {count}.\n\
3. Keep the original structure. No explanation.\n\
\n\
Input: {input}";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self { template: template.to_string() }
    }

    /// Create the default batch translator template.
    pub fn batch_translator() -> Self {
        Self::new(Self::BATCH_TRANSLATOR)
    }

    /// Render the template for one batch
    pub fn render(&self, texts: &[String], target_language: &str) -> String {
        let input = Value::from(texts.to_vec()).to_string();
        self.template
            .replace("{target_language}", &prompt_language_name(target_language))
            .replace("{count}", &texts.len().to_string())
            .replace("{input}", &input)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::batch_translator()
    }
}
