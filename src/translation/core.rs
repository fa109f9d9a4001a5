/*!
 * Core translation service implementation.
 *
 * This module contains the `TranslationService`, the configured `Translator`
 * used by the engine. It selects the provider client from the configuration,
 * builds the prompt for a language pair and caches results.
 */

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::debug;
use std::time::{Duration, Instant};
use url::Url;

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::ProviderError;
use crate::language_utils::LanguageCode;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::mock::MockTranslator;
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::{Provider, Translator};
use super::cache::TranslationCache;

/// Slack added to the HTTP client timeout so the engine's own budget fires first
const CLIENT_TIMEOUT_SLACK_SECS: u64 = 5;

/// Parse an endpoint string, adding an http scheme when missing
fn parse_endpoint(endpoint: &str) -> Result<Url> {
    if endpoint.trim().is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    if url.host_str().is_none() {
        return Err(anyhow!("Invalid host in endpoint: {}", endpoint));
    }

    Ok(url)
}

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    /// Ollama LLM service
    Ollama {
        /// Client instance
        client: Ollama,
    },

    /// Anthropic API service
    Anthropic {
        /// Client instance
        client: Anthropic,
    },

    /// Offline translator
    Mock {
        /// Client instance
        client: MockTranslator,
    },
}

/// Configured translator backed by one provider
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Configuration for the translation service
    pub config: TranslationConfig,

    /// Translation cache for storing and retrieving translations
    pub cache: TranslationCache,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.common.timeout_secs + CLIENT_TIMEOUT_SLACK_SECS);

        let provider = match config.provider {
            ConfigTranslationProvider::Ollama => {
                let endpoint = parse_endpoint(&config.get_endpoint())?;
                TranslationProviderImpl::Ollama {
                    client: Ollama::new(endpoint.as_str(), timeout),
                }
            },
            ConfigTranslationProvider::Anthropic => {
                let api_key = config.get_api_key();
                if api_key.is_empty() {
                    return Err(anyhow!("Anthropic provider requires an API key"));
                }
                let endpoint = parse_endpoint(&config.get_endpoint())?;
                TranslationProviderImpl::Anthropic {
                    client: Anthropic::new(api_key, endpoint.as_str(), timeout),
                }
            },
            ConfigTranslationProvider::Mock => TranslationProviderImpl::Mock {
                client: MockTranslator::working(),
            },
        };

        let cache = TranslationCache::new(config.common.cache_enabled);

        Ok(Self {
            provider,
            config,
            cache,
        })
    }

    /// Test the connection to the translation provider
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        match &self.provider {
            TranslationProviderImpl::Ollama { client } => {
                let version = client.version().await?;
                debug!("Connected to Ollama {} at {}", version, client.base_url());
                Ok(())
            },
            TranslationProviderImpl::Anthropic { client } => client.check_access().await,
            TranslationProviderImpl::Mock { client } => client.check_connection().await,
        }
    }

    /// Human readable name of a language for prompts, e.g. "Chinese (zh-cn)"
    fn prompt_language(lang: LanguageCode) -> String {
        format!("{} ({})", lang.english_name(), lang.provider_locale())
    }

    /// Output budget for a text: scripts are short, but CJK to Latin roughly
    /// triples the token count
    fn max_tokens_for(text: &str) -> u32 {
        let estimate = (text.chars().count() as u32).saturating_mul(4);
        estimate.clamp(256, 4096)
    }

    async fn call_provider(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> Result<String, ProviderError> {
        let system_prompt = self.config.system_prompt_for(
            &Self::prompt_language(source),
            &Self::prompt_language(target),
        );

        match &self.provider {
            TranslationProviderImpl::Ollama { client } => {
                let request = GenerationRequest::new(self.config.get_model(), text)
                    .system(system_prompt)
                    .temperature(self.config.common.temperature)
                    .num_predict(Self::max_tokens_for(text));
                let response = client.complete(request).await?;
                Ok(Ollama::extract_text(&response))
            },
            TranslationProviderImpl::Anthropic { client } => {
                let request = AnthropicRequest::new(self.config.get_model(), Self::max_tokens_for(text))
                    .system(system_prompt)
                    .add_message("user", text)
                    .temperature(self.config.common.temperature);
                let response = client.complete(request).await?;
                Ok(Anthropic::extract_text(&response))
            },
            TranslationProviderImpl::Mock { client } => client.translate(text, source, target).await,
        }
    }
}

#[async_trait]
impl Translator for TranslationService {
    async fn translate(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> Result<String, ProviderError> {
        // Skip empty text
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        if let Some(cached_translation) = self.cache.get(text, source, target) {
            return Ok(cached_translation);
        }

        let start_time = Instant::now();
        let translated = self.call_provider(text, source, target).await?;
        if translated.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        debug!("{} translated {} -> {} in {:?}",
               self.config.provider.display_name(), source, target, start_time.elapsed());

        self.cache.store(text, source, target, &translated);
        Ok(translated)
    }

    fn name(&self) -> &str {
        self.config.provider.display_name()
    }

    async fn check_connection(&self) -> Result<(), ProviderError> {
        self.test_connection().await
    }
}
