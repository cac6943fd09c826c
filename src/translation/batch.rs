/*!
 * Batch translation processing.
 *
 * This module contains the sequential batch loop: each batch is rendered
 * into a marker payload, sent through the translation service in a single
 * request, and the response is decoded back onto the entries. Failed
 * batches and unmatched entries keep their source text.
 */

use std::time::{Duration, Instant};

use log::debug;

use crate::providers::ChatMessage;
use crate::subtitle_processor::SubtitleEntry;

use super::core::TranslationService;
use super::markers;
use super::prompts::TranslationPromptBuilder;

/// Token usage statistics for tracking API consumption
#[derive(Debug, Clone)]
pub struct TokenUsageStats {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Total number of tokens
    pub total_tokens: u64,

    /// Start time of token tracking
    pub start_time: Instant,

    /// Total time spent on API requests
    pub api_duration: Duration,

    /// Provider name
    pub provider: String,

    /// Model name
    pub model: String,
}

impl Default for TokenUsageStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenUsageStats {
    /// Create a new empty token usage stats instance
    pub fn new() -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            start_time: Instant::now(),
            api_duration: Duration::from_secs(0),
            provider: String::new(),
            model: String::new(),
        }
    }

    /// Create new token usage stats with provider info
    pub fn with_provider_info(provider: String, model: String) -> Self {
        Self {
            provider,
            model,
            ..Self::new()
        }
    }

    /// Add token usage numbers from one response
    pub fn add_token_usage(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>) {
        if let Some(pt) = prompt_tokens {
            self.prompt_tokens += pt;
            self.total_tokens += pt;
        }

        if let Some(ct) = completion_tokens {
            self.completion_tokens += ct;
            self.total_tokens += ct;
        }
    }

    /// Calculate tokens per minute rate
    pub fn tokens_per_minute(&self) -> f64 {
        // Use the API duration for rate calculation, with fallback to elapsed time
        let duration_minutes = if self.api_duration.as_secs_f64() > 0.0 {
            self.api_duration.as_secs_f64() / 60.0
        } else {
            self.start_time.elapsed().as_secs_f64() / 60.0
        };

        if duration_minutes > 0.0 {
            self.total_tokens as f64 / duration_minutes
        } else {
            0.0
        }
    }

    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        let elapsed = self.start_time.elapsed();
        let elapsed_minutes = elapsed.as_secs_f64() / 60.0;
        let api_minutes = self.api_duration.as_secs_f64() / 60.0;

        format!(
            "Token Usage Summary:\n\
             Provider: {}\n\
             Model: {}\n\
             Prompt tokens: {}\n\
             Completion tokens: {}\n\
             Total tokens: {}\n\
             Elapsed time: {:.2} minutes\n\
             API request time: {:.2} minutes\n\
             Tokens per minute: {:.2}",
            self.provider,
            self.model,
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens,
            elapsed_minutes,
            api_minutes,
            self.tokens_per_minute()
        )
    }
}

/// Overall outcome of a translation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every batch request succeeded
    Complete,

    /// Some batches kept their source text
    Partial {
        /// Number of batches whose request failed
        failed_batches: usize,
    },
}

/// Summary of one translation run
#[derive(Debug, Clone)]
pub struct TranslationReport {
    /// Total number of batches processed
    pub total_batches: usize,

    /// Number of batches whose request failed outright
    pub failed_batches: usize,

    /// Number of entries absent from otherwise successful responses
    pub missing_entries: usize,

    /// Failure descriptions, one per failed batch
    pub failures: Vec<String>,

    /// Token usage accumulated across the run
    pub token_usage: TokenUsageStats,
}

impl TranslationReport {
    fn new(total_batches: usize, token_usage: TokenUsageStats) -> Self {
        Self {
            total_batches,
            failed_batches: 0,
            missing_entries: 0,
            failures: Vec::new(),
            token_usage,
        }
    }

    /// Outcome of the run derived from the failure counters
    pub fn outcome(&self) -> RunOutcome {
        if self.failed_batches == 0 {
            RunOutcome::Complete
        } else {
            RunOutcome::Partial { failed_batches: self.failed_batches }
        }
    }
}

/// Batch translator for processing subtitle entries in batches
pub struct BatchTranslator {
    /// The translation service to use
    service: TranslationService,

    /// Prompt builder for the target language
    prompt_builder: TranslationPromptBuilder,

    /// Pause between consecutive batch requests
    batch_delay: Duration,
}

impl BatchTranslator {
    /// Create a new batch translator for the given target language
    pub fn new(service: TranslationService, target_language: &str) -> Self {
        Self {
            prompt_builder: TranslationPromptBuilder::new(target_language),
            batch_delay: Duration::from_millis(service.config.common.batch_delay_ms),
            service,
        }
    }

    /// Translate batches of subtitle entries, one request per batch
    ///
    /// Batches are processed strictly in order. A failed request leaves every
    /// entry of its batch untranslated; a successful response is matched
    /// per position, and positions missing from it keep their source text.
    /// The returned sequence always has one entry per input entry.
    pub async fn translate_batches(
        &self,
        batches: &[Vec<SubtitleEntry>],
        progress_callback: impl Fn(usize, usize),
    ) -> (Vec<SubtitleEntry>, TranslationReport) {
        let token_usage = TokenUsageStats::with_provider_info(
            self.service.config.provider.to_string(),
            self.service.config.get_model(),
        );

        let total_batches = batches.len();
        let mut report = TranslationReport::new(total_batches, token_usage);
        let mut all_entries: Vec<SubtitleEntry> = Vec::new();

        for (batch_index, batch) in batches.iter().enumerate() {
            let (instruction, payload) = self.prompt_builder.build(batch);
            let messages = vec![ChatMessage::system(instruction), ChatMessage::user(payload)];

            let request_start = Instant::now();
            let result = self.service.generate(messages).await;
            report.token_usage.api_duration += request_start.elapsed();

            match result {
                Ok(output) => {
                    report
                        .token_usage
                        .add_token_usage(output.prompt_tokens, output.completion_tokens);

                    let decoded = markers::decode_response(&output.text);

                    for (position, entry) in batch.iter().enumerate() {
                        let mut translated = entry.clone();

                        match decoded.get(&(position + 1)) {
                            Some(text) => translated.translated_text = text.clone(),
                            None => {
                                report.missing_entries += 1;
                                debug!(
                                    "Entry {} of batch {} missing from response, keeping source text",
                                    position + 1,
                                    batch_index + 1
                                );
                            }
                        }

                        all_entries.push(translated);
                    }
                },
                Err(e) => {
                    // Entries are created with source text as their translation,
                    // so a failed batch passes through unchanged
                    report.failed_batches += 1;
                    report
                        .failures
                        .push(format!("Batch {} of {} failed: {}", batch_index + 1, total_batches, e));
                    all_entries.extend(batch.iter().cloned());
                },
            }

            progress_callback(batch_index + 1, total_batches);

            if batch_index + 1 < total_batches {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        (all_entries, report)
    }
}
