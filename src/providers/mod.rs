/*!
 * Provider implementations for the supported translation services.
 *
 * This module contains client implementations for the LLM APIs:
 * - Gemini: `generateContent` with a JSON response schema
 * - OpenAI: any OpenAI-compatible `/chat/completions` server
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the translation backends.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider with a minimal request
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the model answered with some text, or an error
    async fn test_connection(&self, model: &str) -> Result<(), ProviderError>;

    /// Extract the answer text from the provider response, without reasoning
    fn extract_text(response: &Self::Response) -> String;
}

/// Build the shared HTTP client with a request timeout
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs.max(1)))
        .build()
        .unwrap_or_default()
}

/// Turn a non-success HTTP response into the matching provider error
pub(crate) async fn error_from_response(provider: &str, response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let error_text = response.text().await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    log::error!("{} API error ({}): {}", provider, status, error_text);
    ProviderError::from_status(status.as_u16(), error_text)
}

pub mod gemini;
pub mod openai;
