/*!
 * Error types for the dialoc application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether a retry has a chance of succeeding
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::ApiError { status_code, .. } => *status_code >= 500 || *status_code == 429,
            ProviderError::AuthenticationError(_) => false,
            _ => true,
        }
    }
}

/// Errors raised while building a glossary from term lists
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GlossaryError {
    /// Category names end up inside placeholders and must be purely alphabetic
    #[error("Invalid glossary category '{0}': expected letters only")]
    InvalidCategory(String),

    /// Ids end up inside placeholders and must be lowercase alphanumeric
    #[error("Invalid glossary id '{id}' for term '{term}': expected [a-z0-9]+")]
    InvalidId {
        /// Offending id
        id: String,
        /// Term the id belongs to
        term: String,
    },

    /// Two terms would share the same placeholder
    #[error("Duplicate glossary placeholder {token} for term '{term}'")]
    DuplicateId {
        /// Placeholder both terms map to
        token: String,
        /// Term that was rejected
        term: String,
    },

    /// A term with no visible characters
    #[error("Empty glossary term in category '{0}'")]
    EmptyTerm(String),

    /// Glossary file could not be interpreted
    #[error("Invalid glossary file: {0}")]
    InvalidFormat(String),
}

/// Errors that can occur while reading or writing dialogue XML
#[derive(Error, Debug)]
pub enum DialogueXmlError {
    /// Low level XML syntax problem
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax {
        /// Byte offset reported by the reader
        position: u64,
        /// Reader message
        message: String,
    },

    /// Document does not look like a string table
    #[error("Unexpected document structure: {0}")]
    Structure(String),

    /// A <String> element without a <Source> child
    #[error("String entry '{0}' has no <Source> element")]
    MissingSource(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Connection check failed before any line was sent
    #[error("Provider {provider} is not reachable: {source}")]
    Unreachable {
        provider: String,
        source: ProviderError,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from glossary handling
    #[error("Glossary error: {0}")]
    Glossary(#[from] GlossaryError),

    /// Error from dialogue import/export
    #[error("Dialogue XML error: {0}")]
    DialogueXml(#[from] DialogueXmlError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
