// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{error, info, warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::app_config::{Config, TranslationProvider};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry, TextJoin};
use app_controller::Controller;

mod app_config;
mod app_controller;
mod errors;
mod file_utils;
mod providers;
mod reformat;
mod subtitle_processor;
mod translation;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    OpenAI,
    Ollama,
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate subtitle files using AI providers (default command)
    #[command(alias = "translate")]
    Translate(TranslateArgs),

    /// Merge subtitle segments that are too short to stand alone
    Merge {
        /// Input SRT file, rewritten in place
        #[arg(value_name = "INPUT_FILE")]
        input: PathBuf,

        /// Segments shorter than this many characters are absorbed by their predecessor
        #[arg(short, long, default_value_t = 20)]
        length: usize,
    },

    /// Break subtitle lines that exceed a character limit
    Split {
        /// Input SRT file
        #[arg(value_name = "INPUT_FILE")]
        input: PathBuf,

        /// Output SRT file, defaults to rewriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum line length in characters
        #[arg(short, long, default_value_t = 35)]
        length: usize,
    },

    /// Convert an SRT file to ASS dialogue lines
    Ass {
        /// Input SRT file
        #[arg(value_name = "INPUT_FILE")]
        input: PathBuf,

        /// Output file, defaults to the input name with a .dialogue.ass extension
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Style name for the dialogue lines
        #[arg(short, long, default_value = "Default")]
        style: String,

        /// Keep entries whose text repeats the previous one
        #[arg(long)]
        no_deduplicate: bool,
    },

    /// Generate shell completions for subtran
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input subtitle file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output file path, defaults to a language-tagged name beside the input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Target language name (e.g., 'Chinese', 'Spanish')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Number of subtitle entries per translation request
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Join multi-line entries with spaces instead of keeping line breaks
    #[arg(short, long)]
    join_lines: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// subtran - Subtitle Translation with AI
///
/// A batch subtitle translation tool that reads SRT files and translates them
/// using AI providers (OpenAI, Ollama, LM Studio).
#[derive(Parser, Debug)]
#[command(name = "subtran")]
#[command(version = "0.1.0")]
#[command(about = "AI-powered subtitle translation tool")]
#[command(long_about = "subtran reads SRT subtitle files and translates them in batches using AI providers.

EXAMPLES:
    subtran movie.srt                           # Translate using default config
    subtran -f movie.srt                        # Force overwrite existing files
    subtran -p openai -m gpt-4 movie.srt        # Use specific provider and model
    subtran -t Spanish movie.srt                # Translate to Spanish
    subtran -b 10 movie.srt                     # Send 10 entries per request
    subtran /shows/                             # Process every subtitle in a directory
    subtran merge -l 20 movie.srt               # Merge segments shorter than 20 chars
    subtran split -l 35 movie.srt               # Break lines longer than 35 chars
    subtran ass movie.srt                       # Emit ASS dialogue lines
    subtran completions bash > subtran.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

SUPPORTED PROVIDERS:
    openai    - OpenAI API (requires API key, also honors OPENAI_API_KEY)
    ollama    - Local Ollama server (default: http://localhost:11434)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input subtitle file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Output file path, defaults to a language-tagged name beside the input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Target language name (e.g., 'Chinese', 'Spanish')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Number of subtitle entries per translation request
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Join multi-line entries with spaces instead of keeping line breaks
    #[arg(short, long)]
    join_lines: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // Level changes after init (CLI flag or config) take effect here
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtran", &mut std::io::stdout());
            return Ok(());
        },
        Some(Commands::Merge { input, length }) => run_merge(&input, length),
        Some(Commands::Split { input, output, length }) => run_split(&input, output, length),
        Some(Commands::Ass { input, output, style, no_deduplicate }) => {
            run_convert(&input, output, &style, !no_deduplicate)
        },
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;

            let translate_args = TranslateArgs {
                input_path,
                output: cli.output,
                force_overwrite: cli.force_overwrite,
                provider: cli.provider,
                model: cli.model,
                target_language: cli.target_language,
                batch_size: cli.batch_size,
                join_lines: cli.join_lines,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_translate(translate_args).await
        },
    };

    // Present failures through the typed application error
    if let Err(e) = result {
        let app_error = AppError::from(e);
        error!("{}", app_error);
        std::process::exit(1);
    }

    Ok(())
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    // Load or create configuration
    let config_path = &options.config_path;
    let config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let mut config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;

        // Override config with CLI options if provided
        if let Some(provider) = &options.provider {
            config.translation.provider = provider.clone().into();
        }

        if let Some(model) = &options.model {
            // Find the provider config and update the model
            let provider_str = config.translation.provider.to_lowercase_string();
            if let Some(provider_config) = config.translation.available_providers.iter_mut()
                .find(|p| p.provider_type == provider_str) {
                provider_config.model = model.clone();
            }
        }

        if let Some(target_lang) = &options.target_language {
            config.target_language = target_lang.clone();
        }

        if let Some(batch_size) = options.batch_size {
            config.translation.common.batch_size = batch_size;
        }

        if options.join_lines {
            config.translation.common.join_lines = true;
        }

        // Update log level in config if specified via command line
        if let Some(log_level) = &options.log_level {
            config.log_level = log_level.clone().into();
        }

        config
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", config_path);

        let mut config = Config::default();

        if let Some(provider) = &options.provider {
            config.translation.provider = provider.clone().into();
        }

        if let Some(model) = &options.model {
            let provider_str = config.translation.provider.to_lowercase_string();
            if let Some(provider_config) = config.translation.available_providers.iter_mut()
                .find(|p| p.provider_type == provider_str) {
                provider_config.model = model.clone();
            }
        }

        if let Some(target_lang) = &options.target_language {
            config.target_language = target_lang.clone();
        }

        if let Some(batch_size) = options.batch_size {
            config.translation.common.batch_size = batch_size;
        }

        if options.join_lines {
            config.translation.common.join_lines = true;
        }

        // Apply command line log level to default config if specified
        if let Some(log_level) = &options.log_level {
            config.log_level = log_level.clone().into();
        }

        // Save default config
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Validate the configuration after loading and overriding
    config.validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        // Just update the max level without reinitializing the logger
        log::set_max_level(config.log_level.to_level_filter());
    }

    // Create controller
    let controller = Controller::with_config(config)?;

    // Run the controller with the input file or directory
    if options.input_path.is_file() {
        controller.run_file(
            options.input_path.clone(),
            options.output,
            options.force_overwrite
        ).await?;
    } else if options.input_path.is_dir() {
        controller.run_folder(
            options.input_path.clone(),
            options.force_overwrite
        ).await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}

// Helper function to merge short subtitle segments in place
fn run_merge(input: &Path, length: usize) -> Result<()> {
    let entries = read_entries(input)?;
    let original_count = entries.len();

    let merged = reformat::merge_short_entries(&entries, length);
    let merged_count = merged.len();

    let collection = SubtitleCollection::new(input.to_path_buf(), merged);
    FileManager::write_to_file(input, &collection.to_srt_string())?;

    info!("Merged {} entries into {}: {}", original_count, merged_count, input.display());
    Ok(())
}

// Helper function to break over-long subtitle lines
fn run_split(input: &Path, output: Option<PathBuf>, length: usize) -> Result<()> {
    if !FileManager::file_exists(input) {
        return Err(AppError::File(format!("Input file does not exist: {:?}", input)).into());
    }

    let content = FileManager::read_to_string(input)?;
    let processed = reformat::split_file_content(&content, length);

    let output_path = output.unwrap_or_else(|| input.to_path_buf());
    FileManager::write_to_file(&output_path, &processed)?;

    info!("Split long lines: {}", output_path.display());
    Ok(())
}

// Helper function to convert subtitles to ASS dialogue lines
fn run_convert(input: &Path, output: Option<PathBuf>, style: &str, deduplicate: bool) -> Result<()> {
    let entries = read_entries(input)?;
    let dialogues = reformat::to_ass_dialogues(&entries, style, deduplicate);

    let output_path = output.unwrap_or_else(|| input.with_extension("dialogue.ass"));

    let mut content = dialogues.join("\n");
    content.push('\n');
    FileManager::write_to_file(&output_path, &content)?;

    info!("Converted {} dialogue lines from '{}' to '{}'",
        dialogues.len(), input.display(), output_path.display());
    Ok(())
}

// Read and parse a subtitle file for the reshaping helpers
fn read_entries(input: &Path) -> Result<Vec<SubtitleEntry>> {
    if !FileManager::file_exists(input) {
        return Err(AppError::File(format!("Input file does not exist: {:?}", input)).into());
    }

    let content = FileManager::read_to_string(input)?;
    Ok(SubtitleCollection::parse_srt_string(&content, TextJoin::Space))
}
