/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported backends:
 * - OpenAI: chat completions API (also serves LM Studio)
 * - Ollama: local LLM server with a custom JSON endpoint
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::ServiceError;

/// A single role-tagged message in a translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One generation request, backend-independent
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// Ordered conversation messages
    pub messages: Vec<ChatMessage>,

    /// Model identifier, meaning is backend-specific
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,
}

/// Raw output of one generation call
#[derive(Debug, Clone, Default)]
pub struct TranslationOutput {
    /// Generated text
    pub text: String,

    /// Prompt tokens reported by the backend, when available
    pub prompt_tokens: Option<u64>,

    /// Completion tokens reported by the backend, when available
    pub completion_tokens: Option<u64>,
}

/// Common capability for all translation backends.
///
/// One operation: send role-tagged messages, get raw text back.
/// Implementations must not retry internally; a failed call is reported as a
/// ServiceError and the caller decides what happens next.
#[async_trait]
pub trait TranslationClient: Send + Sync + Debug {
    /// Run one generation call
    ///
    /// # Arguments
    /// * `request` - Messages, model and sampling settings for the call
    ///
    /// # Returns
    /// * `Result<TranslationOutput, ServiceError>` - The raw generated text or an error
    async fn generate(&self, request: &TranslationRequest) -> Result<TranslationOutput, ServiceError>;
}

pub mod ollama;
pub mod openai;
