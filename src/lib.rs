/*!
 * # subtran - Subtitle Translation with AI
 *
 * A Rust library for batch translation of SRT subtitle files using AI.
 *
 * ## Features
 *
 * - Parse SRT subtitle files into structured entries
 * - Translate subtitles in bounded batches using AI providers:
 *   - OpenAI API
 *   - Ollama (local LLM)
 *   - LM Studio (OpenAI-compatible local server)
 * - Marker-based request encoding with tolerant response decoding
 * - Per-entry fallback to source text on partial responses
 * - Preserve subtitle indices and timing unchanged
 * - Reshaping passes: merge short segments, break long lines, ASS dialogue export
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: Subtitle file handling and processing
 * - `translation`: AI-powered translation services:
 *   - `translation::core`: Core translation functionality
 *   - `translation::batch`: Sequential batch processing
 *   - `translation::markers`: Segment marker protocol
 *   - `translation::prompts`: Prompt templates and builders
 * - `reformat`: Subtitle reshaping utilities
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `providers`: Client implementations for various LLM providers:
 *   - `providers::openai`: OpenAI API client
 *   - `providers::ollama`: Ollama API client
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod translation;
pub mod app_controller;
pub mod providers;
pub mod reformat;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use translation::TranslationService;
pub use errors::{AppError, ConfigError, ServiceError};
