/*!
 * Subtitle reshaping utilities.
 *
 * This module contains the standalone cleanup passes that run outside of
 * translation: merging segments that are too short to stand alone,
 * breaking over-long lines, and converting entries to ASS dialogue events.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::subtitle_processor::SubtitleEntry;

// @const: Matches an SRT timing token at the start of a line
static ASS_TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+:\d+:\d+,\d+)\s+-->\s+(\d+:\d+:\d+,\d+)").unwrap()
});

// @const: Matches HTML-style formatting tags
static HTML_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

// @const: Block boundary used by the raw-content split pass
static BLOCK_BOUNDARY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Punctuation stripped around inserted line breaks
const BREAK_PUNCTUATION: &[char] = &['，', '。', '、', '；', '：', ',', '.', ';', ':'];

/// Merge entries followed by a segment shorter than `min_length` characters
///
/// Whenever the successor of an entry has fewer than `min_length` characters
/// of trimmed text, the two are merged: the result spans from the current
/// start time to the successor's end time and joins both texts with a space.
/// A merged pair is not reconsidered for further merging. Entries are
/// renumbered from 1 afterwards.
pub fn merge_short_entries(entries: &[SubtitleEntry], min_length: usize) -> Vec<SubtitleEntry> {
    let mut merged: Vec<SubtitleEntry> = Vec::new();
    let mut i = 0;

    while i < entries.len() {
        let current = &entries[i];

        let absorb_next = entries
            .get(i + 1)
            .map(|next| next.translated_text.trim().chars().count() < min_length)
            .unwrap_or(false);

        if absorb_next {
            let next = &entries[i + 1];

            // Keep the current timing when either token lacks the arrow separator
            let timing = match (current.timing.split_once(" --> "), next.timing.split_once(" --> ")) {
                (Some((start, _)), Some((_, end))) => format!("{} --> {}", start, end),
                _ => current.timing.clone(),
            };

            let text = format!(
                "{} {}",
                current.translated_text.trim(),
                next.translated_text.trim()
            );

            merged.push(SubtitleEntry::new(merged.len() + 1, timing, text));
            i += 2;
        } else {
            let mut entry = current.clone();
            entry.index = merged.len() + 1;
            merged.push(entry);
            i += 1;
        }
    }

    merged
}

/// Break a line longer than `max_length` characters near its middle
///
/// Lines that already contain `\N` breaks only get their segment-final
/// punctuation stripped. Otherwise the split point is the period closest to
/// the middle, then the comma closest to the middle, then the exact middle.
/// Punctuation around the inserted break is removed on both sides.
pub fn split_long_line(text: &str, max_length: usize) -> String {
    if text.contains("\\N") {
        let cleaned: Vec<&str> = text
            .split("\\N")
            .map(|part| part.trim_end_matches(BREAK_PUNCTUATION))
            .collect();
        return cleaned.join("\\N");
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_length {
        return text.trim_end_matches(BREAK_PUNCTUATION).to_string();
    }

    let mid_point = chars.len() / 2;

    for candidates in [&['。', '.'][..], &['，', ','][..]] {
        let best = chars
            .iter()
            .enumerate()
            .filter(|(_, c)| candidates.contains(c))
            .map(|(pos, _)| pos)
            .min_by_key(|pos| pos.abs_diff(mid_point));

        if let Some(best) = best {
            if best > 0 && best < chars.len() - 1 {
                return break_at(&chars, best + 1);
            }
        }
    }

    break_at(&chars, mid_point)
}

/// Join two character ranges with a `\N` break, trimming punctuation at the seam
fn break_at(chars: &[char], at: usize) -> String {
    let first: String = chars[..at].iter().collect();
    let second: String = chars[at..].iter().collect();

    format!(
        "{}\\N{}",
        first.trim_end_matches(BREAK_PUNCTUATION),
        second.trim_start_matches(BREAK_PUNCTUATION)
    )
}

/// Apply [`split_long_line`] to the text of every entry
pub fn split_long_lines(entries: &[SubtitleEntry], max_length: usize) -> Vec<SubtitleEntry> {
    entries
        .iter()
        .map(|entry| {
            let mut split = entry.clone();
            split.translated_text = split_long_line(&entry.translated_text, max_length);
            split
        })
        .collect()
}

/// Apply [`split_long_line`] to raw SRT content, block by block
///
/// A block whose first line is a bare number is rebuilt with its text lines
/// space-joined and rewritten; any other block is kept exactly as read, so
/// malformed input survives the pass untouched.
pub fn split_file_content(content: &str, max_length: usize) -> String {
    let mut processed: Vec<String> = Vec::new();

    for block in BLOCK_BOUNDARY_REGEX.split(content.trim()) {
        if block.trim().is_empty() {
            continue;
        }

        let mut lines = block.lines();
        let index_line = lines.next().unwrap_or("").trim();

        if !index_line.is_empty() && index_line.chars().all(|c| c.is_ascii_digit()) {
            let timing = lines.next().unwrap_or("");
            let text = lines.map(str::trim).collect::<Vec<_>>().join(" ");

            let rewritten = if text.is_empty() {
                text
            } else {
                split_long_line(&text, max_length)
            };
            processed.push(format!("{}\n{}\n{}", index_line, timing, rewritten));
        } else {
            processed.push(block.to_string());
        }
    }

    processed.join("\n\n")
}

/// Render entries as ASS dialogue event lines
///
/// Timing tokens are converted from `00:00:00,000` to the ASS `0:00:00.00`
/// form and HTML-style tags are stripped from the text. Entries whose timing
/// token cannot be read are skipped. With `deduplicate` set, an entry whose
/// text repeats the previously emitted one is dropped.
pub fn to_ass_dialogues(entries: &[SubtitleEntry], style_name: &str, deduplicate: bool) -> Vec<String> {
    let mut dialogues = Vec::new();
    let mut prev_text: Option<String> = None;

    for entry in entries {
        let Some(caps) = ASS_TIMING_REGEX.captures(&entry.timing) else {
            warn!("Skipping entry {}: unrecognized timing '{}'", entry.index, entry.timing);
            continue;
        };

        let (start, end) = match (convert_timestamp(&caps[1]), convert_timestamp(&caps[2])) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                warn!("Skipping entry {}: unreadable timestamp in '{}'", entry.index, entry.timing);
                continue;
            },
        };

        let text = HTML_TAG_REGEX.replace_all(&entry.translated_text, "").to_string();

        if deduplicate && prev_text.as_deref() == Some(text.as_str()) {
            continue;
        }
        prev_text = Some(text.clone());

        dialogues.push(format!(
            "Dialogue: 1,{},{},{},,0,0,0,,{}",
            start, end, style_name, text
        ));
    }

    dialogues
}

/// Convert an SRT timestamp (`00:00:00,000`) to the ASS format (`0:00:00.00`)
///
/// Minutes and seconds pass through as written; hours lose leading zeros and
/// milliseconds become centiseconds.
fn convert_timestamp(srt_time: &str) -> Option<String> {
    let mut parts = srt_time.split(':');
    let hours = parts.next()?;
    let minutes = parts.next()?;
    let seconds_ms = parts.next()?;
    let (seconds, milliseconds) = seconds_ms.split_once(',')?;

    let hours: u32 = hours.parse().ok()?;
    let centiseconds = milliseconds.parse::<u32>().ok()? / 10;

    Some(format!("{}:{}:{}.{:02}", hours, minutes, seconds, centiseconds))
}
