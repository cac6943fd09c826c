use anyhow::Result;
use log::{error, warn, info};
use std::path::{Path, PathBuf};
use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::subtitle_processor::{SubtitleCollection, TextJoin};
use crate::translation::{BatchTranslator, RunOutcome, TranslationReport, TranslationService};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

// @module: Application controller for subtitle processing

/// Name of the log file collecting issues from translation runs
const ISSUES_LOG_FILE: &str = "subtran.issues.log";

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Translate a single subtitle file
    pub async fn run_file(&self, input_file: PathBuf, output_file: Option<PathBuf>, force_overwrite: bool) -> Result<()> {
        let multi_progress = MultiProgress::new();
        self.run_file_with_progress(input_file, output_file, &multi_progress, force_overwrite).await
    }

    /// Run the translation workflow for one file with progress reporting
    async fn run_file_with_progress(
        &self,
        input_file: PathBuf,
        output_file: Option<PathBuf>,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<()> {
        if !FileManager::file_exists(&input_file) {
            return Err(anyhow::anyhow!("Input file does not exist: {:?}", input_file));
        }

        // Default the output next to the input, tagged with the target language
        let output_path = match output_file {
            Some(path) => path,
            None => {
                let output_dir = input_file.parent().map(Path::to_path_buf).unwrap_or_default();
                FileManager::generate_output_path(&input_file, output_dir, &self.config.target_language, "srt")
            },
        };

        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, translation already exists (use -f to force overwrite)");
            return Ok(());
        }

        let service = TranslationService::new(self.config.translation.clone())?;
        let report = self
            .run_file_with_service(service, &input_file, &output_path, multi_progress)
            .await?;

        match report.outcome() {
            RunOutcome::Complete => {},
            RunOutcome::Partial { failed_batches } => {
                warn!(
                    "Partial translation: {} of {} batches kept their source text",
                    failed_batches, report.total_batches
                );
            },
        }

        Ok(())
    }

    /// Translate one file through the given service and write the result
    ///
    /// This is the core of the workflow: parse, batch, translate, report,
    /// write. The service is passed in so callers can supply their own.
    pub async fn run_file_with_service(
        &self,
        service: TranslationService,
        input_file: &Path,
        output_path: &Path,
        multi_progress: &MultiProgress,
    ) -> Result<TranslationReport> {
        let start_time = std::time::Instant::now();

        let join = if self.config.translation.common.join_lines {
            TextJoin::Space
        } else {
            TextJoin::Newline
        };

        let subtitles = SubtitleCollection::from_srt_file(input_file, join)?;
        let total_entries_count = subtitles.entries.len();

        let batches = subtitles.split_into_batches(self.config.translation.common.batch_size)?;

        // Create a progress bar for translation tracking
        let total_batches = batches.len() as u64;
        let progress_bar = multi_progress.add(ProgressBar::new(total_batches));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        info!("subtran: {} - {}",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model());
        info!("Translating, please wait...");
        progress_bar.set_message("Translating");

        let batch_translator = BatchTranslator::new(service, &self.config.target_language);

        // Clone the progress_bar for use in the callback
        let pb = progress_bar.clone();

        let (translated_entries, report) = batch_translator
            .translate_batches(&batches, move |completed, _total| {
                pb.set_position(completed as u64);
            })
            .await;

        // Finish and clear the progress bar so follow-up logs print cleanly
        progress_bar.finish_and_clear();

        if !report.failures.is_empty() || report.missing_entries > 0 {
            info!(
                "Translation completed with {} failed batches and {} missing entries.",
                report.failed_batches, report.missing_entries
            );

            for failure in &report.failures {
                warn!("{}", failure);
            }

            self.log_run_issues(output_path, input_file, &report);
        }

        if translated_entries.len() != total_entries_count {
            error!(
                "Number of entries changed during translation! Before: {}, After: {}",
                total_entries_count,
                translated_entries.len()
            );
        }

        let translated = SubtitleCollection::new(input_file.to_path_buf(), translated_entries);
        translated.write_to_srt(output_path)?;
        info!("Success: {}", output_path.display());

        if report.token_usage.total_tokens > 0 {
            info!("{}", report.token_usage.summary());
        }

        info!("Translation completed in {}.", Self::format_duration(start_time.elapsed()));

        Ok(report)
    }

    /// Run the workflow in folder mode, translating every subtitle file in a directory
    /// Files that already have a translation will be skipped
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow::anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        // Collect subtitle files, leaving out previous translation outputs
        let subtitle_files: Vec<PathBuf> = FileManager::find_files(&input_dir, "srt")?
            .into_iter()
            .filter(|path| !FileManager::has_language_suffix(path, &self.config.target_language))
            .collect();

        if subtitle_files.is_empty() {
            return Err(anyhow::anyhow!("No subtitle files found in directory: {:?}", input_dir));
        }

        // Create multi-progress instance for multiple file processing
        let multi_progress = MultiProgress::new();

        // Create a progress bar for folder processing
        let folder_pb = multi_progress.add(ProgressBar::new(subtitle_files.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        // Track success and failure counts
        let mut success_count = 0;
        let mut partial_count = 0;
        let mut error_count = 0;
        let mut skip_count = 0;

        for subtitle_file in subtitle_files.iter() {
            let file_name = subtitle_file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            folder_pb.set_message(format!("Processing: {}", file_name));

            // Write each translation next to its source file
            let output_dir = match subtitle_file.parent() {
                Some(parent) => parent.to_path_buf(),
                None => input_dir.clone(),
            };

            let output_path =
                FileManager::generate_output_path(subtitle_file, &output_dir, &self.config.target_language, "srt");
            if output_path.exists() && !force_overwrite {
                warn!("Skipping {}, translation already exists (use -f to force overwrite)", file_name);
                skip_count += 1;
                folder_pb.inc(1);
                continue;
            }

            let run_result = match TranslationService::new(self.config.translation.clone()) {
                Ok(service) => {
                    self.run_file_with_service(service, subtitle_file, &output_path, &multi_progress)
                        .await
                },
                Err(e) => Err(e),
            };

            match run_result {
                Ok(report) => match report.outcome() {
                    RunOutcome::Complete => success_count += 1,
                    RunOutcome::Partial { failed_batches } => {
                        warn!(
                            "Partial translation for {}: {} of {} batches kept their source text",
                            file_name, failed_batches, report.total_batches
                        );
                        partial_count += 1;
                    },
                },
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    error_count += 1;
                },
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        let summary_message = format!(
            "Folder processing completed: {} translated, {} partial, {} skipped, {} errors",
            success_count, partial_count, skip_count, error_count
        );
        info!("{}", summary_message);

        let log_path = input_dir.join(ISSUES_LOG_FILE);
        let summary_line = format!(
            "Folder {} - {} - Duration: {}",
            input_dir.display(),
            summary_message,
            Self::format_duration(start_time.elapsed())
        );
        if let Err(e) = FileManager::append_to_log_file(&log_path, &summary_line) {
            warn!("Failed to write folder logs to file: {}", e);
        }

        Ok(())
    }

    /// Append the failures of one run to the issues log beside the output
    fn log_run_issues(&self, output_path: &Path, input_file: &Path, report: &TranslationReport) {
        let log_dir = output_path.parent().map(Path::to_path_buf).unwrap_or_default();
        let log_path = log_dir.join(ISSUES_LOG_FILE);

        let context = format!(
            "{} - {} - {}",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model(),
            input_file.display()
        );

        let mut lines: Vec<String> = report.failures.clone();
        if report.missing_entries > 0 {
            lines.push(format!(
                "{} entries missing from responses kept their source text",
                report.missing_entries
            ));
        }

        if let Err(e) = FileManager::append_to_log_file(&log_path, &format!("{}: {}", context, lines.join("; "))) {
            warn!("Failed to write issues log: {}", e);
        } else {
            info!("Issues written to {}", log_path.display());
        }
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
