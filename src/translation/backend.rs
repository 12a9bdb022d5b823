/*!
 * Translation backends.
 *
 * A backend turns one batch of texts into the same number of translated
 * texts plus the tokens it spent. Backends never fail a batch: any provider
 * error is logged and the input comes back unchanged with zero tokens.
 */

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error};

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::{ProviderError, TranslationError};
use crate::providers::gemini::{Gemini, GeminiRequest};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::Provider;
use crate::translation::prompts::{PromptTemplate, TRANSLATOR_SYSTEM_PROMPT};
use crate::translation::response::{extract_json_array, normalize_json};

/// Which backend family to build
pub type BackendKind = TranslationProvider;

/// Result of translating one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchTranslation {
    pub items: Vec<String>,
    pub tokens_used: u64,
}

impl BatchTranslation {
    /// The input returned as is, used whenever a request fails
    pub fn passthrough(texts: &[String]) -> Self {
        Self { items: texts.to_vec(), tokens_used: 0 }
    }
}

/// A service that translates batches of text
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Human readable backend and model name
    fn name(&self) -> String;

    /// Translate `texts` into `target_language`; never fails
    async fn translate_batch(&self, texts: &[String], target_language: &str) -> BatchTranslation;

    /// Whether the backend answers a minimal request
    async fn test_connection(&self) -> bool;
}

/// Generation settings shared by both backends
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Backend using Gemini's JSON response schema
#[derive(Debug)]
pub struct StructuredBackend {
    client: Gemini,
    settings: GenerationSettings,
    prompt: PromptTemplate,
}

impl StructuredBackend {
    pub fn new(client: Gemini, settings: GenerationSettings) -> Self {
        Self { client, settings, prompt: PromptTemplate::batch_translator() }
    }

    async fn try_translate(&self, texts: &[String], target_language: &str) -> Result<BatchTranslation, ProviderError> {
        let request = GeminiRequest::new(&self.settings.model, self.prompt.render(texts, target_language))
            .temperature(self.settings.temperature)
            .json_string_array();

        let response = self.client.complete(request).await?;
        let text = Gemini::extract_text(&response);
        let value: serde_json::Value = serde_json::from_str(text.trim())
            .map_err(|e| ProviderError::ParseError(format!("structured output is not JSON: {}", e)))?;
        if !value.is_array() {
            return Err(ProviderError::ParseError("structured output is not a JSON array".to_string()));
        }

        Ok(BatchTranslation {
            items: normalize_json(&value, texts),
            tokens_used: response.total_tokens(),
        })
    }
}

#[async_trait]
impl TranslationBackend for StructuredBackend {
    fn name(&self) -> String {
        format!("Gemini ({})", self.settings.model)
    }

    async fn translate_batch(&self, texts: &[String], target_language: &str) -> BatchTranslation {
        if texts.is_empty() {
            return BatchTranslation::passthrough(texts);
        }

        match self.try_translate(texts, target_language).await {
            Ok(translation) => translation,
            Err(e) => {
                error!("{} failed, keeping {} segments untranslated: {}", self.name(), texts.len(), e);
                BatchTranslation::passthrough(texts)
            }
        }
    }

    async fn test_connection(&self) -> bool {
        match self.client.test_connection(&self.settings.model).await {
            Ok(()) => true,
            Err(e) => {
                error!("Connection test for {} failed: {}", self.name(), e);
                false
            }
        }
    }
}

/// Backend for OpenAI-compatible chat completion servers, answers are free text
#[derive(Debug)]
pub struct ChatCompletionBackend {
    client: OpenAI,
    settings: GenerationSettings,
    prompt: PromptTemplate,
}

impl ChatCompletionBackend {
    pub fn new(client: OpenAI, settings: GenerationSettings) -> Self {
        Self { client, settings, prompt: PromptTemplate::batch_translator() }
    }

    async fn try_translate(&self, texts: &[String], target_language: &str) -> Result<BatchTranslation, ProviderError> {
        let request = OpenAIRequest::new(&self.settings.model)
            .add_message("system", TRANSLATOR_SYSTEM_PROMPT)
            .add_message("user", self.prompt.render(texts, target_language))
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_tokens);

        let response = self.client.complete(request).await?;
        let content = OpenAI::extract_text(&response);
        debug!("Raw model output: {}", content);
        let value = extract_json_array(&content)?;

        Ok(BatchTranslation {
            items: normalize_json(&value, texts),
            tokens_used: response.total_tokens(),
        })
    }
}

#[async_trait]
impl TranslationBackend for ChatCompletionBackend {
    fn name(&self) -> String {
        format!("OpenAI-compatible ({})", self.settings.model)
    }

    async fn translate_batch(&self, texts: &[String], target_language: &str) -> BatchTranslation {
        if texts.is_empty() {
            return BatchTranslation::passthrough(texts);
        }

        match self.try_translate(texts, target_language).await {
            Ok(translation) => translation,
            Err(e) => {
                error!("{} failed, keeping {} segments untranslated: {}", self.name(), texts.len(), e);
                BatchTranslation::passthrough(texts)
            }
        }
    }

    async fn test_connection(&self) -> bool {
        match self.client.test_connection(&self.settings.model).await {
            Ok(()) => true,
            Err(e) => {
                error!("Connection test for {} failed: {}", self.name(), e);
                false
            }
        }
    }
}

/// Build the configured backend; credentials and model are bound here
pub fn create_backend(config: &TranslationConfig) -> Result<Arc<dyn TranslationBackend>, TranslationError> {
    let endpoint = config.get_endpoint();
    if url::Url::parse(&endpoint).is_err() {
        return Err(TranslationError::Configuration(format!("invalid endpoint URL: {}", endpoint)));
    }

    let settings = GenerationSettings {
        model: config.get_model(),
        temperature: config.common.temperature,
        max_tokens: config.common.max_tokens,
    };
    let api_key = config.get_api_key();
    let timeout_secs = config.get_timeout_secs();

    let backend: Arc<dyn TranslationBackend> = match config.provider {
        BackendKind::Gemini => Arc::new(StructuredBackend::new(
            Gemini::new(api_key, endpoint, timeout_secs),
            settings,
        )),
        BackendKind::OpenAICompatible => Arc::new(ChatCompletionBackend::new(
            OpenAI::new(api_key, endpoint, timeout_secs),
            settings,
        )),
    };

    Ok(backend)
}
