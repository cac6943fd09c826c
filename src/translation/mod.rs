/*!
 * Translation service for subtitle translation using AI providers.
 *
 * This module contains the core functionality for translating subtitles
 * using various AI providers. It is split into several submodules:
 *
 * - `core`: Core translation functionality and service definition
 * - `batch`: Sequential batch processing and run reporting
 * - `markers`: Segment marker encoding and response decoding
 * - `prompts`: Prompt templates and builders for translation
 */

// Re-export main types for easier usage
pub use self::batch::{BatchTranslator, RunOutcome, TokenUsageStats, TranslationReport};
pub use self::core::TranslationService;

// Re-export prompt types
pub use self::prompts::{PromptTemplate, TranslationPromptBuilder};

// Submodules
pub mod batch;
pub mod core;
pub mod markers;
pub mod prompts;
