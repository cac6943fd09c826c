use std::fs;
use std::fs::File;
use std::fmt;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context};
use std::io::Write;
use std::path::{Path, PathBuf};
use log::{warn, debug};

use crate::errors::ConfigError;

// @module: Subtitle parsing, batching and serialization

// @const: Blank-line block separator (tolerates CRLF)
static BLOCK_SPLIT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\r?\n){2,}").unwrap()
});

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: Index as written in the source file, not necessarily contiguous
    pub index: usize,

    // @field: Timing line, kept verbatim and never reinterpreted
    pub timing: String,

    // @field: Original text
    pub source_text: String,

    // @field: Translated text, starts as a copy of the source
    pub translated_text: String,
}

impl SubtitleEntry {
    /// Creates a new entry; the translation defaults to the source text
    /// until the pipeline overwrites it.
    pub fn new(index: usize, timing: String, source_text: String) -> Self {
        let translated_text = source_text.clone();
        SubtitleEntry {
            index,
            timing,
            source_text,
            translated_text,
        }
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{}", self.timing)?;
        writeln!(f, "{}", self.translated_text)?;
        writeln!(f)
    }
}

/// How multi-line subtitle text is joined during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TextJoin {
    /// Keep line breaks inside an entry
    #[default]
    Newline,
    /// Collapse an entry onto one line
    Space,
}

/// Collection of subtitle entries with metadata
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create a new subtitle collection
    pub fn new(source_file: PathBuf, entries: Vec<SubtitleEntry>) -> Self {
        SubtitleCollection {
            source_file,
            entries,
        }
    }

    /// Read and parse an SRT file
    pub fn from_srt_file<P: AsRef<Path>>(path: P, join: TextJoin) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;

        Ok(SubtitleCollection {
            source_file: path.to_path_buf(),
            entries: Self::parse_srt_string(&content, join),
        })
    }

    /// Parse SRT format string into subtitle entries.
    ///
    /// Blocks are separated by one or more blank lines. Each block needs an
    /// index line, a timing line and at least one text line; blocks that
    /// don't fit are reported and dropped, they never abort the parse. The
    /// timing line is carried verbatim. Entries come back in file order
    /// whatever their indices claim.
    pub fn parse_srt_string(content: &str, join: TextJoin) -> Vec<SubtitleEntry> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content).trim();
        if content.is_empty() {
            return Vec::new();
        }

        let mut entries = Vec::new();

        for block in BLOCK_SPLIT_REGEX.split(content) {
            let lines: Vec<&str> = block.split('\n')
                .map(|line| line.trim_end_matches('\r'))
                .collect();

            if lines.len() < 3 {
                warn!("Skipping subtitle block with fewer than 3 lines: {}", block_preview(block));
                continue;
            }

            let index = match lines[0].trim().parse::<usize>() {
                Ok(num) => num,
                Err(_) => {
                    warn!("Skipping subtitle block with invalid index: {}", block_preview(block));
                    continue;
                }
            };

            let timing = lines[1].trim().to_string();

            let text = match join {
                TextJoin::Newline => lines[2..].join("\n"),
                TextJoin::Space => lines[2..].iter()
                    .map(|line| line.trim())
                    .collect::<Vec<_>>()
                    .join(" "),
            };

            entries.push(SubtitleEntry::new(index, timing, text.trim().to_string()));
        }

        if entries.is_empty() {
            warn!("No valid subtitle entries found in content");
        }

        entries
    }

    /// Split entries into contiguous batches of at most batch_size,
    /// preserving order. The last batch holds the remainder.
    pub fn split_into_batches(&self, batch_size: usize) -> Result<Vec<Vec<SubtitleEntry>>> {
        if batch_size < 1 {
            return Err(ConfigError::InvalidBatchSize(batch_size).into());
        }

        let batches: Vec<Vec<SubtitleEntry>> = self.entries
            .chunks(batch_size)
            .map(|chunk| chunk.to_vec())
            .collect();

        debug!("Split {} entries into {} batches of up to {}",
               self.entries.len(), batches.len(), batch_size);

        Ok(batches)
    }

    /// Write subtitles to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;

        // Write each entry to the file
        for entry in &self.entries {
            write!(file, "{}", entry)?;
        }

        Ok(())
    }

    /// Serialize the collection to an SRT string
    pub fn to_srt_string(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.to_string());
        }
        out
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}

// @returns: First 50 chars of a block for log messages
fn block_preview(block: &str) -> String {
    let preview: String = block.chars().take(50).collect();
    if preview.len() < block.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}
