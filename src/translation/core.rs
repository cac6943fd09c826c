/*!
 * Core translation service implementation.
 *
 * This module contains the TranslationService struct, which builds the
 * configured provider client and exposes the generation entry point used
 * by the batch translator.
 */

use anyhow::{Result, anyhow};
use url::Url;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ServiceError;
use crate::providers::ollama::Ollama;
use crate::providers::openai::OpenAI;
use crate::providers::{ChatMessage, TranslationClient, TranslationOutput, TranslationRequest};

/// Parse an endpoint string into host and port
fn parse_endpoint(endpoint: &str) -> Result<(String, u16)> {
    if endpoint.is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    let host = url.host_str()
        .ok_or_else(|| anyhow!("Invalid host in endpoint: {}", endpoint))?
        .to_string();

    let port = url.port().unwrap_or(if url.scheme() == "https" { 443 } else { 80 });

    Ok((host, port))
}

/// Translation service wrapping the configured provider client
#[derive(Debug)]
pub struct TranslationService {
    /// Active provider client
    client: Box<dyn TranslationClient>,

    /// Configuration for the translation service
    pub config: TranslationConfig,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let timeout_secs = config.get_timeout_secs();

        let client: Box<dyn TranslationClient> = match config.provider {
            TranslationProvider::Ollama => {
                let (host, port) = parse_endpoint(&config.get_endpoint())?;
                let api_key = config.get_api_key();

                let client = if api_key.is_empty() {
                    Ollama::new(host, port, timeout_secs)
                } else {
                    Ollama::new(host, port, timeout_secs).with_bearer_token(api_key)
                };

                Box::new(client)
            },
            TranslationProvider::OpenAI => {
                Box::new(OpenAI::new(config.get_api_key(), config.get_endpoint(), timeout_secs))
            },
            TranslationProvider::LMStudio => {
                // LM Studio usually runs without authentication; send a placeholder key if none is set
                let api_key = {
                    let k = config.get_api_key();
                    if k.is_empty() { "lm-studio".to_string() } else { k }
                };

                Box::new(OpenAI::new(api_key, config.get_endpoint(), timeout_secs))
            },
        };

        Ok(Self { client, config })
    }

    /// Create a translation service backed by an externally supplied client
    pub fn with_client(client: Box<dyn TranslationClient>, config: TranslationConfig) -> Self {
        Self { client, config }
    }

    /// Send one chat exchange to the active provider and return its output
    pub async fn generate(&self, messages: Vec<ChatMessage>) -> Result<TranslationOutput, ServiceError> {
        let request = TranslationRequest {
            messages,
            model: self.config.get_model(),
            temperature: self.config.common.temperature,
        };

        self.client.generate(&request).await
    }
}
