use async_trait::async_trait;
use anyhow::{Context, Result};
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{parse_translation_payload, status_error, transport_error, Provider, TranslationRequest, TranslationResponse};
use crate::errors::ProviderError;

/// Client for OpenAI-compatible chat completion APIs.
///
/// OpenAI itself, LM Studio and Ollama's `/v1` endpoint all accept the same
/// request shape, so one client serves the three of them.
pub struct OpenAI {
    /// Name used in logs and errors
    name: String,
    /// HTTP client for API requests
    client: Client,
    /// Base URL ending before `/chat/completions`
    endpoint: String,
    /// Bearer token; empty for local servers
    api_key: String,
    /// Model to request
    model: String,
    /// Send `response_format: json_object`
    json_mode: bool,
}

impl std::fmt::Debug for OpenAI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAI")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<ChatMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Ask for a JSON object reply
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// Chat message format
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Requested response format
#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// One completion choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

impl ChatCompletionRequest {
    /// Create a new chat completion request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            response_format: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Request a JSON object reply
    pub fn json_object(mut self) -> Self {
        self.response_format = Some(ResponseFormat {
            format_type: "json_object".to_string(),
        });
        self
    }
}

impl OpenAI {
    /// Create a new client
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            name: name.into(),
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            json_mode: true,
        })
    }

    /// Disable `response_format` for servers that reject it
    pub fn without_json_mode(mut self) -> Self {
        self.json_mode = false;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    /// Send a chat completion request
    pub async fn chat(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse, ProviderError> {
        let mut builder = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json")
            .json(request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await.map_err(|e| transport_error(&self.name, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("{} API error ({}): {}", self.name, status, error_text);
            return Err(status_error(&self.name, status, error_text));
        }

        response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse {} response: {}", self.name, e)))
    }

    /// Extract text from the first choice
    pub fn extract_text_from_response(response: &ChatCompletionResponse) -> Option<&str> {
        response.choices.first().map(|c| c.message.content.as_str())
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn complete(&self, request: TranslationRequest) -> Result<TranslationResponse, ProviderError> {
        let mut chat_request = ChatCompletionRequest::new(&self.model)
            .add_message("system", request.system_prompt)
            .add_message("user", request.text)
            .temperature(request.temperature);
        if self.json_mode {
            chat_request = chat_request.json_object();
        }

        let response = self.chat(&chat_request).await?;
        let raw = Self::extract_text_from_response(&response)
            .ok_or_else(|| ProviderError::ParseError(format!("{} returned no choices", self.name)))?;
        debug!("{} raw reply: {}", self.name, raw);

        Ok(TranslationResponse {
            text: parse_translation_payload(raw)?,
            prompt_tokens: response.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens: response.usage.as_ref().map(|u| u.completion_tokens),
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = ChatCompletionRequest::new(&self.model).add_message("user", "Hello");
        self.chat(&request).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
