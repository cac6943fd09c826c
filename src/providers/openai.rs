use std::time::Duration;
use serde::{Serialize, Deserialize};
use reqwest::Client;
use log::error;
use async_trait::async_trait;

use crate::errors::ServiceError;
use super::{TranslationClient, TranslationOutput, TranslationRequest};

/// OpenAI client for the chat completions API.
/// Also used for OpenAI-compatible servers such as LM Studio.
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL, e.g. https://api.openai.com/v1
    endpoint: String,
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// OpenAI message format
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    /// Number of prompt tokens
    pub prompt_tokens: u64,
    /// Number of completion tokens
    pub completion_tokens: u64,
    /// Total tokens for the call
    pub total_tokens: u64,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    /// The completion choices
    pub choices: Vec<OpenAIChoice>,
    /// Token usage information, absent on some compatible servers
    pub usage: Option<TokenUsage>,
}

/// Individual choice in an OpenAI response
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    /// The generated message
    pub message: OpenAIMessage,
}

impl OpenAIRequest {
    /// Create a new chat completion request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
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

    /// Set the maximum number of tokens to generate
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Complete a chat request
    pub async fn complete(&self, request: OpenAIRequest) -> Result<OpenAIResponse, ServiceError> {
        let api_url = if self.endpoint.is_empty() {
            "https://api.openai.com/v1/chat/completions".to_string()
        } else {
            format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
        };

        let response = self.client.post(&api_url)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ServiceError::ConnectionError(format!("Failed to connect to OpenAI API: {}", e))
                } else {
                    ServiceError::RequestFailed(format!("Failed to send request to OpenAI API: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenAI API error ({}): {}", status, error_text);
            return Err(match status.as_u16() {
                401 | 403 => ServiceError::AuthenticationError(error_text),
                429 => ServiceError::RateLimitExceeded(error_text),
                code => ServiceError::ApiError { status_code: code, message: error_text },
            });
        }

        response.json::<OpenAIResponse>().await
            .map_err(|e| ServiceError::ParseError(format!("Failed to parse OpenAI API response: {}", e)))
    }

    /// Extract text from an OpenAI response
    pub fn extract_text_from_response(response: &OpenAIResponse) -> String {
        response.choices.first()
            .map(|choice| choice.message.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TranslationClient for OpenAI {
    async fn generate(&self, request: &TranslationRequest) -> Result<TranslationOutput, ServiceError> {
        let mut api_request = OpenAIRequest::new(&request.model)
            .temperature(request.temperature);
        for message in &request.messages {
            api_request = api_request.add_message(&message.role, &message.content);
        }

        let response = self.complete(api_request).await?;
        let text = Self::extract_text_from_response(&response);

        Ok(TranslationOutput {
            text,
            prompt_tokens: response.usage.as_ref().map(|usage| usage.prompt_tokens),
            completion_tokens: response.usage.as_ref().map(|usage| usage.completion_tokens),
        })
    }
}
