use std::time::Duration;
use serde::{Deserialize, Serialize};
use reqwest::Client;
use log::error;
use async_trait::async_trait;

use crate::errors::ServiceError;
use super::{TranslationClient, TranslationOutput, TranslationRequest};

/// Ollama client for interacting with the Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Optional bearer token for proxied deployments
    bearer_token: Option<String>,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    pub model: String,
    /// Creation timestamp
    pub created_at: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl GenerationRequest {
    /// Create a new generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: Some(false),
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        if let Some(options) = &mut self.options {
            options.temperature = Some(temperature);
        } else {
            self.options = Some(GenerationOptions {
                temperature: Some(temperature),
            });
        }
        self
    }
}

impl Ollama {
    /// Create a new Ollama client with the specified host and port
    pub fn new(host: impl Into<String>, port: u16, timeout_secs: u64) -> Self {
        let host = host.into();

        // Construct a proper URL with scheme and port
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            // If the host already has a scheme
            let url_parts: Vec<&str> = host.split("://").collect();
            if url_parts.len() == 2 {
                let scheme = url_parts[0];
                let host_part = url_parts[1];

                // Check if host_part already contains a port
                if host_part.contains(":") {
                    // Already has a port, use as is
                    host
                } else {
                    // No port, append it
                    format!("{}://{}:{}", scheme, host_part, port)
                }
            } else {
                // Malformed URL, fallback to safe default
                format!("http://localhost:{}", port)
            }
        } else {
            // No scheme, add http:// and port
            format!("http://{}:{}", host, port)
        };

        Self {
            base_url,
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            bearer_token: None,
        }
    }

    /// Attach a bearer token sent with every request
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Run one generation request
    pub async fn complete(&self, request: GenerationRequest) -> Result<GenerationResponse, ServiceError> {
        let url = format!("{}/api/generate", self.base_url);

        let mut request_builder = self.client.post(&url);
        if let Some(token) = &self.bearer_token {
            request_builder = request_builder.bearer_auth(token);
        }

        let response = request_builder
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ServiceError::ConnectionError(format!("Failed to connect to Ollama API: {}", e))
                } else {
                    ServiceError::RequestFailed(format!("Failed to send request to Ollama API: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(match status.as_u16() {
                401 | 403 => ServiceError::AuthenticationError(error_text),
                429 => ServiceError::RateLimitExceeded(error_text),
                code => ServiceError::ApiError { status_code: code, message: error_text },
            });
        }

        // Get the raw response text first
        let response_text = response.text().await
            .map_err(|e| ServiceError::RequestFailed(format!("Failed to get response text from Ollama API: {}", e)))?;

        // Try to parse as a single JSON object first
        match serde_json::from_str::<GenerationResponse>(&response_text) {
            Ok(generation_response) => Ok(generation_response),
            Err(e) => {
                error!("Failed to parse Ollama API response: {}. Raw response (first 500 chars): {}",
                      e, response_text.chars().take(500).collect::<String>());
                Self::parse_streamed_response(&response_text, e)
            }
        }
    }

    /// Stitch a JSONL (streaming) response back into a single one.
    ///
    /// Some deployments stream line-delimited objects even with
    /// `stream: false`; the text pieces are concatenated and the metadata is
    /// taken from the last parseable line.
    fn parse_streamed_response(
        response_text: &str,
        parse_error: serde_json::Error,
    ) -> Result<GenerationResponse, ServiceError> {
        let mut full_response = String::new();
        let mut last_value: Option<serde_json::Value> = None;

        for line in response_text.lines() {
            if line.is_empty() {
                continue;
            }
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(line) {
                if let Some(part) = value.get("response").and_then(|v| v.as_str()) {
                    full_response.push_str(part);
                }
                last_value = Some(value);
            }
        }

        let value = match last_value {
            Some(value) => value,
            None => {
                return Err(ServiceError::ParseError(format!(
                    "Failed to parse Ollama API response: {}. Response contains invalid JSON.",
                    parse_error
                )));
            }
        };

        Ok(GenerationResponse {
            model: value.get("model").and_then(|v| v.as_str()).unwrap_or("unknown").to_string(),
            created_at: value.get("created_at").and_then(|v| v.as_str()).unwrap_or("").to_string(),
            response: full_response,
            done: value.get("done").and_then(|v| v.as_bool()).unwrap_or(true),
            prompt_eval_count: value.get("prompt_eval_count").and_then(|v| v.as_u64()),
            eval_count: value.get("eval_count").and_then(|v| v.as_u64()),
        })
    }
}

#[async_trait]
impl TranslationClient for Ollama {
    async fn generate(&self, request: &TranslationRequest) -> Result<TranslationOutput, ServiceError> {
        // System messages steer through the dedicated field, everything else
        // is concatenated into the prompt
        let mut system_parts = Vec::new();
        let mut prompt_parts = Vec::new();
        for message in &request.messages {
            if message.role == "system" {
                system_parts.push(message.content.as_str());
            } else {
                prompt_parts.push(message.content.as_str());
            }
        }

        let mut api_request = GenerationRequest::new(&request.model, prompt_parts.join("\n\n"))
            .temperature(request.temperature);
        if !system_parts.is_empty() {
            api_request = api_request.system(system_parts.join("\n\n"));
        }

        let response = self.complete(api_request).await?;

        Ok(TranslationOutput {
            text: response.response,
            prompt_tokens: response.prompt_eval_count,
            completion_tokens: response.eval_count,
        })
    }
}
