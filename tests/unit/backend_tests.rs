/*!
 * Tests for the translation backends
 *
 * The real backends are pointed either at a closed local port, where every
 * request fails at connect time, or at a local server returning a canned
 * JSON answer.
 */

use serde_json::json;

use docxpolyglot::app_config::{TranslationConfig, TranslationProvider};
use docxpolyglot::errors::TranslationError;
use docxpolyglot::translation::{create_backend, BatchTranslation};

use crate::common;

const UNREACHABLE_ENDPOINT: &str = "http://127.0.0.1:1";

fn config_for(provider: TranslationProvider, endpoint: &str) -> TranslationConfig {
    let mut config = TranslationConfig {
        provider,
        ..TranslationConfig::default()
    };
    let entry = config.active_provider_config_mut();
    entry.endpoint = endpoint.to_string();
    entry.api_key = "test-key".to_string();
    entry.model = "test-model".to_string();
    entry.timeout_secs = 5;
    config
}

fn texts() -> Vec<String> {
    vec!["Hello".to_string(), "World".to_string()]
}

#[test]
fn test_create_backend_shouldNameProviderAndModel() {
    let gemini = create_backend(&config_for(TranslationProvider::Gemini, UNREACHABLE_ENDPOINT)).unwrap();
    assert_eq!(gemini.name(), "Gemini (test-model)");

    let openai = create_backend(&config_for(TranslationProvider::OpenAICompatible, UNREACHABLE_ENDPOINT)).unwrap();
    assert_eq!(openai.name(), "OpenAI-compatible (test-model)");
}

#[test]
fn test_create_backend_withInvalidEndpoint_shouldBeConfigurationError() {
    let result = create_backend(&config_for(TranslationProvider::Gemini, "not a url"));
    assert!(matches!(result, Err(TranslationError::Configuration(_))));
}

#[tokio::test]
async fn test_structured_backend_withUnreachableServer_shouldPassThrough() {
    common::init_logging();
    let backend = create_backend(&config_for(TranslationProvider::Gemini, UNREACHABLE_ENDPOINT)).unwrap();

    let result = backend.translate_batch(&texts(), "es").await;

    assert_eq!(result, BatchTranslation::passthrough(&texts()));
    assert_eq!(result.tokens_used, 0);
}

#[tokio::test]
async fn test_chat_backend_withUnreachableServer_shouldPassThrough() {
    common::init_logging();
    let backend = create_backend(&config_for(TranslationProvider::OpenAICompatible, UNREACHABLE_ENDPOINT)).unwrap();

    let result = backend.translate_batch(&texts(), "es").await;

    assert_eq!(result.items, texts());
    assert_eq!(result.tokens_used, 0);
}

#[tokio::test]
async fn test_translate_batch_withEmptyInput_shouldReturnEmpty() {
    for provider in [TranslationProvider::Gemini, TranslationProvider::OpenAICompatible] {
        let backend = create_backend(&config_for(provider, UNREACHABLE_ENDPOINT)).unwrap();
        let result = backend.translate_batch(&[], "es").await;
        assert!(result.items.is_empty());
        assert_eq!(result.tokens_used, 0);
    }
}

#[tokio::test]
async fn test_test_connection_withUnreachableServer_shouldBeFalse() {
    for provider in [TranslationProvider::Gemini, TranslationProvider::OpenAICompatible] {
        let backend = create_backend(&config_for(provider, UNREACHABLE_ENDPOINT)).unwrap();
        assert!(!backend.test_connection().await);
    }
}

fn gemini_answer(parts: serde_json::Value, total_tokens: u64) -> serde_json::Value {
    json!({
        "candidates": [{ "content": { "role": "model", "parts": parts }, "finishReason": "STOP" }],
        "usageMetadata": { "promptTokenCount": 1, "candidatesTokenCount": 1, "totalTokenCount": total_tokens }
    })
}

fn chat_answer(content: &str, total_tokens: u64) -> serde_json::Value {
    json!({
        "choices": [{
            "message": { "role": "assistant", "content": content, "reasoning_content": "[\"ignored\", \"reasoning\"]" },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 8, "completion_tokens": 4, "total_tokens": total_tokens }
    })
}

#[tokio::test]
async fn test_chat_backend_withFencedShortAnswer_shouldPadAndCountTokens() {
    common::init_logging();
    let endpoint = common::serve_json(chat_answer("```json\n[\"Hola\"]\n```", 12)).await;
    let backend = create_backend(&config_for(TranslationProvider::OpenAICompatible, &endpoint)).unwrap();

    let result = backend.translate_batch(&texts(), "es").await;

    assert_eq!(result.items, vec!["Hola".to_string(), "World".to_string()]);
    assert_eq!(result.tokens_used, 12);
}

#[tokio::test]
async fn test_chat_backend_withProseAnswer_shouldPassThrough() {
    let endpoint = common::serve_json(chat_answer("Sorry, I cannot help with that.", 7)).await;
    let backend = create_backend(&config_for(TranslationProvider::OpenAICompatible, &endpoint)).unwrap();

    let result = backend.translate_batch(&texts(), "es").await;

    assert_eq!(result, BatchTranslation::passthrough(&texts()));
}

#[tokio::test]
async fn test_structured_backend_withLongAnswer_shouldTruncateAndSkipThoughts() {
    let parts = json!([
        { "text": "[\"thinking\"]", "thought": true },
        { "text": "[\"a\", \"b\", \"c\"]" }
    ]);
    let endpoint = common::serve_json(gemini_answer(parts, 9)).await;
    let backend = create_backend(&config_for(TranslationProvider::Gemini, &endpoint)).unwrap();

    let result = backend.translate_batch(&texts(), "es").await;

    assert_eq!(result.items, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(result.tokens_used, 9);
}

#[tokio::test]
async fn test_structured_backend_withNonJsonAnswer_shouldPassThrough() {
    let endpoint = common::serve_json(gemini_answer(json!([{ "text": "Hola, World" }]), 5)).await;
    let backend = create_backend(&config_for(TranslationProvider::Gemini, &endpoint)).unwrap();

    let result = backend.translate_batch(&texts(), "es").await;

    assert_eq!(result.items, texts());
    assert_eq!(result.tokens_used, 0);
}

#[tokio::test]
async fn test_test_connection_withAnsweringServer_shouldBeTrue() {
    let gemini_endpoint = common::serve_json(gemini_answer(json!([{ "text": "OK" }]), 3)).await;
    let gemini = create_backend(&config_for(TranslationProvider::Gemini, &gemini_endpoint)).unwrap();
    assert!(gemini.test_connection().await);

    let chat_endpoint = common::serve_json(chat_answer("OK", 3)).await;
    let chat = create_backend(&config_for(TranslationProvider::OpenAICompatible, &chat_endpoint)).unwrap();
    assert!(chat.test_connection().await);
}

#[tokio::test]
async fn test_test_connection_withEmptyAnswer_shouldBeFalse() {
    let endpoint = common::serve_json(chat_answer("", 1)).await;
    let backend = create_backend(&config_for(TranslationProvider::OpenAICompatible, &endpoint)).unwrap();

    assert!(!backend.test_connection().await);
}
