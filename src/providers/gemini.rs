use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::ProviderError;
use crate::providers::{error_from_response, http_client, Provider};

/// Gemini client for the `generateContent` REST API
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key sent in the `x-goog-api-key` header
    api_key: String,
    /// API base URL, e.g. `https://generativelanguage.googleapis.com/v1beta`
    endpoint: String,
}

/// Gemini `generateContent` request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// The model is part of the URL, not of the body
    #[serde(skip)]
    model: String,

    /// Conversation turns
    contents: Vec<GeminiContent>,

    /// Sampling and output format options
    generation_config: GenerationConfig,
}

/// A conversation turn made of parts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    /// Role of the turn (user, model)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Parts of the turn
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// A single part of a turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiPart {
    /// Text of the part
    #[serde(default)]
    pub text: String,

    /// Marks reasoning parts emitted by thinking models
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub thought: bool,
}

/// Generation options
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

/// Gemini `generateContent` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Generated candidates, the first one is used
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,

    /// Token accounting
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

/// One generated candidate
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage information
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
    #[serde(default)]
    pub total_token_count: u64,
}

impl GeminiRequest {
    /// Create a single-turn request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: prompt.into(),
                    thought: false,
                }],
            }],
            generation_config: GenerationConfig::default(),
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.generation_config.temperature = Some(temperature);
        self
    }

    /// Cap the number of generated tokens
    pub fn max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.generation_config.max_output_tokens = Some(max_output_tokens);
        self
    }

    /// Constrain the output to a JSON array of strings
    pub fn json_string_array(mut self) -> Self {
        self.generation_config.response_mime_type = Some("application/json".to_string());
        self.generation_config.response_schema = Some(json!({
            "type": "ARRAY",
            "items": { "type": "STRING" }
        }));
        self
    }

    /// The model this request targets
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl GeminiResponse {
    /// Total tokens reported by the API, 0 when absent
    pub fn total_tokens(&self) -> u64 {
        self.usage_metadata
            .as_ref()
            .map(|usage| usage.total_token_count)
            .unwrap_or(0)
    }

    /// Reasoning parts of the first candidate, if the model produced any
    pub fn reasoning(&self) -> Option<String> {
        let reasoning: String = self.first_parts()
            .filter(|part| part.thought)
            .map(|part| part.text.as_str())
            .collect();

        if reasoning.is_empty() { None } else { Some(reasoning) }
    }

    fn first_parts(&self) -> impl Iterator<Item = &GeminiPart> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.iter())
            .into_iter()
            .flatten()
    }
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: http_client(timeout_secs),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.endpoint.trim_end_matches('/'), model)
    }
}

#[async_trait]
impl Provider for Gemini {
    type Request = GeminiRequest;
    type Response = GeminiResponse;

    async fn complete(&self, request: GeminiRequest) -> Result<GeminiResponse, ProviderError> {
        let response = self.client.post(self.api_url(request.model()))
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response("Gemini", response).await);
        }

        let gemini_response = response.json::<GeminiResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Gemini API response: {}", e)))?;

        if let Some(reasoning) = gemini_response.reasoning() {
            debug!("Gemini reasoning: {}", reasoning);
        }

        Ok(gemini_response)
    }

    async fn test_connection(&self, model: &str) -> Result<(), ProviderError> {
        let request = GeminiRequest::new(model, crate::translation::prompts::CONNECTION_CHECK_PROMPT)
            .max_output_tokens(5);

        let response = self.complete(request).await?;
        if Self::extract_text(&response).trim().is_empty() {
            return Err(ProviderError::ParseError("Gemini returned an empty answer".to_string()));
        }
        Ok(())
    }

    fn extract_text(response: &GeminiResponse) -> String {
        response.first_parts()
            .filter(|part| !part.thought)
            .map(|part| part.text.as_str())
            .collect()
    }
}
