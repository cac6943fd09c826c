/*!
 * Marker protocol for batch translation requests.
 *
 * Each entry in a batch is wrapped in numbered segment markers before being
 * sent, and the response is scanned for the same markers to recover per-entry
 * translations. Marker numbers are 1-based positions within one batch and
 * reset for every batch; they are unrelated to subtitle indices.
 */

use std::collections::HashMap;

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::subtitle_processor::SubtitleEntry;

// @const: Opening segment marker
static START_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[START_SEG\d+\]").unwrap()
});

// @const: Any marker-shaped substring, used to flag collisions in source text
static MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(?:START|END)_SEG\d+\]").unwrap()
});

/// Build the payload body for one batch: every entry wrapped in
/// `[START_SEGp]` / `[END_SEGp]` with a blank line between units.
///
/// Entry text goes out verbatim, markers are not escaped. Source text that
/// itself looks like a marker is flagged because the response scan cannot
/// tell it apart from the real ones.
pub fn encode_batch(batch: &[SubtitleEntry]) -> String {
    let mut units = Vec::with_capacity(batch.len());

    for (i, entry) in batch.iter().enumerate() {
        let position = i + 1;

        if MARKER_REGEX.is_match(&entry.source_text) {
            warn!("Batch position {} contains marker-shaped text, alignment for this batch may be unreliable",
                  position);
        }

        units.push(format!("[START_SEG{}]\n{}\n[END_SEG{}]", position, entry.source_text, position));
    }

    units.join("\n\n")
}

/// Scan a raw response for `[START_SEGk] ... [END_SEGk]` units and map each
/// position number to its trimmed inner text.
///
/// The scan walks left to right: each start marker is paired with the first
/// matching end marker that follows it, the span in between is captured, and
/// scanning resumes after the end marker. A start marker whose end never
/// appears (or appears with a different number) is skipped. Duplicate
/// position numbers keep the last occurrence. The result may cover only a
/// subset of the batch, missing positions are the caller's problem.
pub fn decode_response(response: &str) -> HashMap<usize, String> {
    let mut translations = HashMap::new();
    let mut cursor = 0;

    while let Some(start_match) = START_MARKER_REGEX.find_at(response, cursor) {
        let digits = start_match.as_str()
            .trim_start_matches("[START_SEG")
            .trim_end_matches(']');

        let position: usize = match digits.parse() {
            Ok(num) => num,
            Err(_) => {
                // Number too large to be a batch position, skip the marker
                cursor = start_match.end();
                continue;
            }
        };

        // The end marker must carry the same digit string as the start
        let end_marker = format!("[END_SEG{}]", digits);
        let rest = &response[start_match.end()..];

        match rest.find(&end_marker) {
            Some(rel_end) => {
                let inner = &rest[..rel_end];
                translations.insert(position, inner.trim().to_string());
                cursor = start_match.end() + rel_end + end_marker.len();
            },
            None => {
                cursor = start_match.end();
            }
        }
    }

    translations
}
