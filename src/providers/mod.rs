/*!
 * Provider implementations for the translation capability.
 *
 * This module contains the `Translator` capability consumed by the
 * translation engine, and client implementations for the services behind it:
 * - Ollama: Local LLM server
 * - Anthropic: Anthropic API integration
 * - Mock: Offline translator with scripted behaviors
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;
use crate::language_utils::LanguageCode;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
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

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// The translation capability used to fill blank language slots
///
/// Implementations translate a single text between two of the supported
/// languages, mapping the language codes to whatever identifiers the
/// concrete service expects.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Translate `text` from `source` to `target`
    async fn translate(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> Result<String, ProviderError>;

    /// Short name used in log messages
    fn name(&self) -> &str {
        "translator"
    }

    /// Cheap reachability check, must not spend a billed request
    async fn check_connection(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Map a transport failure onto the provider error taxonomy
pub(crate) fn transport_error(service: &str, error: reqwest::Error) -> ProviderError {
    if error.is_connect() {
        ProviderError::ConnectionError(format!("{}: {}", service, error))
    } else {
        ProviderError::RequestFailed(format!("{}: {}", service, error))
    }
}

/// Map a non-success HTTP status onto the provider error taxonomy
pub(crate) fn status_error(status: reqwest::StatusCode, message: String) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(message),
        429 => ProviderError::RateLimitExceeded(message),
        code => ProviderError::ApiError { status_code: code, message },
    }
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
