/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock translator that simulates different behaviors:
 * - `MockProvider::echo()` - Returns the masked text unchanged
 * - `MockProvider::uppercase()` - Uppercases everything except placeholders
 * - `MockProvider::prefix(..)` - Prepends a marker to the text
 * - `MockProvider::intermittent(n)` - Fails every Nth request
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::drop_placeholders()` - Loses every placeholder
 *
 * Replies go through the same `{"translation": ...}` contract as the real
 * providers.
 */

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::masking::placeholder::PLACEHOLDER_REGEX;
use crate::providers::{parse_translation_payload, Provider, TranslationRequest, TranslationResponse};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Returns the text unchanged
    Echo,
    /// Uppercases the text outside placeholders
    Uppercase,
    /// Prepends a fixed marker
    Prefix(String),
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Removes every placeholder from the text
    DropPlaceholders,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&TranslationRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    /// Create a mock that returns its input
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a mock that uppercases its input
    pub fn uppercase() -> Self {
        Self::new(MockBehavior::Uppercase)
    }

    /// Create a mock that prepends `prefix`
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::new(MockBehavior::Prefix(prefix.into()))
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that loses placeholders
    pub fn drop_placeholders() -> Self {
        Self::new(MockBehavior::DropPlaceholders)
    }

    /// Build from a configured model name such as `uppercase` or `prefix:FR `
    pub fn from_model_name(model: &str) -> Result<Self> {
        let (kind, arg) = match model.split_once(':') {
            Some((kind, arg)) => (kind, Some(arg)),
            None => (model, None),
        };

        let behavior = match (kind.trim().to_lowercase().as_str(), arg) {
            ("echo", None) | ("", None) => MockBehavior::Echo,
            ("uppercase", None) => MockBehavior::Uppercase,
            ("prefix", arg) => MockBehavior::Prefix(arg.unwrap_or("[MOCK] ").to_string()),
            ("intermittent", Some(n)) => MockBehavior::Intermittent {
                fail_every: n
                    .trim()
                    .parse()
                    .map_err(|_| anyhow!("Invalid mock failure interval: {}", n))?,
            },
            ("failing", None) => MockBehavior::Failing,
            ("drop-placeholders", None) => MockBehavior::DropPlaceholders,
            _ => return Err(anyhow!("Unknown mock behavior: {}", model)),
        };

        Ok(Self::new(behavior))
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&TranslationRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of `complete` calls so far, across clones
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn uppercase_outside_placeholders(text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        for m in PLACEHOLDER_REGEX.find_iter(text) {
            result.push_str(&text[last..m.start()].to_uppercase());
            result.push_str(m.as_str());
            last = m.end();
        }
        result.push_str(&text[last..].to_uppercase());
        result
    }

    fn render(&self, request: &TranslationRequest) -> String {
        if let Some(generator) = self.custom_response {
            return generator(request);
        }

        match &self.behavior {
            MockBehavior::Uppercase => Self::uppercase_outside_placeholders(&request.text),
            MockBehavior::Prefix(prefix) => format!("{}{}", prefix, request.text),
            MockBehavior::DropPlaceholders => PLACEHOLDER_REGEX.replace_all(&request.text, "").into_owned(),
            _ => request.text.clone(),
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior.clone(),
            request_count: Arc::clone(&self.request_count),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: TranslationRequest) -> Result<TranslationResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Failing => {
                return Err(ProviderError::ApiError {
                    message: "Simulated provider failure".to_string(),
                    status_code: 500,
                });
            }
            MockBehavior::Intermittent { fail_every } if fail_every > 0 && count % fail_every == fail_every - 1 => {
                return Err(ProviderError::ApiError {
                    message: format!("Simulated intermittent failure (request #{})", count + 1),
                    status_code: 503,
                });
            }
            _ => {}
        }

        let payload = serde_json::json!({ "translation": self.render(&request) }).to_string();

        Ok(TranslationResponse {
            text: parse_translation_payload(&payload)?,
            prompt_tokens: Some(request.text.len() as u64),
            completion_tokens: Some((request.text.len() / 2) as u64),
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated provider failure".to_string())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
