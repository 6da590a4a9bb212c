/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for various LLM providers:
 * - OpenAI-compatible chat completions: OpenAI, LM Studio, Ollama
 * - Anthropic: Anthropic Messages API
 * - Mock: offline deterministic translator for tests and dry runs
 *
 * Every provider is asked to answer with a JSON object of the form
 * `{"translation": "..."}`, which [`parse_translation_payload`] extracts.
 */

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

pub mod anthropic;
pub mod mock;
pub mod openai;

pub use anthropic::Anthropic;
pub use mock::{MockBehavior, MockProvider};
pub use openai::OpenAI;

/// A single translation request, already masked
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    /// Masked text to translate
    pub text: String,
    /// Rendered system prompt
    pub system_prompt: String,
    /// Source language code
    pub source_language: String,
    /// Target language code
    pub target_language: String,
    /// Sampling temperature
    pub temperature: f32,
}

/// Provider answer
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResponse {
    /// Raw translation, placeholders still in place
    pub text: String,
    /// Prompt tokens reported by the provider
    pub prompt_tokens: Option<u64>,
    /// Completion tokens reported by the provider
    pub completion_tokens: Option<u64>,
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the orchestrator.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Translate one masked text
    async fn complete(&self, request: TranslationRequest) -> Result<TranslationResponse, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Short provider name for logs
    fn name(&self) -> &str;
}

#[derive(Deserialize)]
struct TranslationPayload {
    translation: String,
}

/// Extract the translation from a `{"translation": "..."}` reply.
///
/// Models sometimes wrap the object in a Markdown code fence or add a
/// sentence around it, so the outermost `{...}` span is parsed.
pub fn parse_translation_payload(raw: &str) -> Result<String, ProviderError> {
    let trimmed = raw.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end().trim_end_matches("```"))
        .unwrap_or(trimmed)
        .trim();

    let candidate = match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => {
            return Err(ProviderError::ParseError(format!(
                "No JSON object in response: {}",
                truncate(trimmed)
            )));
        }
    };

    serde_json::from_str::<TranslationPayload>(candidate)
        .map(|payload| payload.translation)
        .map_err(|e| ProviderError::ParseError(format!("{}: {}", e, truncate(trimmed))))
}

fn truncate(text: &str) -> String {
    const MAX: usize = 120;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(MAX).collect::<String>())
    }
}

/// Map a non-success HTTP answer to a provider error
pub(crate) fn status_error(provider: &str, status: reqwest::StatusCode, body: String) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(format!("{} rejected the API key: {}", provider, body)),
        429 => ProviderError::RateLimitExceeded(format!("{}: {}", provider, body)),
        code => ProviderError::ApiError {
            status_code: code,
            message: body,
        },
    }
}

/// Map a transport failure to a provider error
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> ProviderError {
    if err.is_connect() || err.is_timeout() {
        ProviderError::ConnectionError(format!("{}: {}", provider, err))
    } else {
        ProviderError::RequestFailed(format!("{}: {}", provider, err))
    }
}

/// Build the provider selected in the configuration
pub fn create_provider(config: &TranslationConfig) -> Result<Arc<dyn Provider>> {
    let timeout = Duration::from_secs(config.get_timeout_secs());
    let provider: Arc<dyn Provider> = match config.provider {
        TranslationProvider::OpenAI | TranslationProvider::Ollama => Arc::new(OpenAI::new(
            config.provider.display_name(),
            config.get_endpoint(),
            config.get_api_key(),
            config.get_model(),
            timeout,
        )?),
        // LM Studio only accepts json_schema response formats
        TranslationProvider::LMStudio => Arc::new(
            OpenAI::new(
                config.provider.display_name(),
                config.get_endpoint(),
                config.get_api_key(),
                config.get_model(),
                timeout,
            )?
            .without_json_mode(),
        ),
        TranslationProvider::Anthropic => Arc::new(Anthropic::new(
            config.get_endpoint(),
            config.get_api_key(),
            config.get_model(),
            timeout,
        )?),
        TranslationProvider::Mock => Arc::new(MockProvider::from_model_name(&config.get_model())?),
    };

    Ok(provider)
}
