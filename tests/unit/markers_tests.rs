/*!
 * Tests for the segment marker protocol
 */

use subtran::subtitle_processor::SubtitleEntry;
use subtran::translation::markers::{decode_response, encode_batch};

fn entry(index: usize, text: &str) -> SubtitleEntry {
    SubtitleEntry::new(index, "00:00:01,000 --> 00:00:02,000".to_string(), text.to_string())
}

/// Test payload encoding for a single entry
#[test]
fn test_encode_batch_withSingleEntry_shouldWrapInMarkers() {
    let batch = vec![entry(1, "Hello")];

    let payload = encode_batch(&batch);

    assert_eq!(payload, "[START_SEG1]\nHello\n[END_SEG1]");
}

/// Test payload encoding for several entries
#[test]
fn test_encode_batch_withMultipleEntries_shouldNumberByPosition() {
    let batch = vec![entry(7, "Hello"), entry(9, "World")];

    let payload = encode_batch(&batch);

    // Marker numbers follow batch position, not subtitle index
    assert_eq!(
        payload,
        "[START_SEG1]\nHello\n[END_SEG1]\n\n[START_SEG2]\nWorld\n[END_SEG2]"
    );
}

/// Test that multi-line entry text goes out verbatim
#[test]
fn test_encode_batch_withMultilineText_shouldKeepLineBreaks() {
    let batch = vec![entry(1, "First line\nSecond line")];

    let payload = encode_batch(&batch);

    assert_eq!(payload, "[START_SEG1]\nFirst line\nSecond line\n[END_SEG1]");
}

/// Test that marker-shaped source text is embedded without escaping
#[test]
fn test_encode_batch_withMarkerShapedText_shouldEmbedVerbatim() {
    let batch = vec![entry(1, "Quote: [END_SEG1] appears here")];

    let payload = encode_batch(&batch);

    assert!(payload.contains("Quote: [END_SEG1] appears here"));
}

/// Test that an unmodified payload decodes back to the source texts
#[test]
fn test_decode_response_withEchoedPayload_shouldRecoverEveryPosition() {
    let batch = vec![entry(1, "Hello"), entry(2, "World"), entry(3, "Again")];

    let decoded = decode_response(&encode_batch(&batch));

    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded[&1], "Hello");
    assert_eq!(decoded[&2], "World");
    assert_eq!(decoded[&3], "Again");
}

/// Test decoding a well-formed response
#[test]
fn test_decode_response_withWellFormedResponse_shouldMapAllPositions() {
    let response = "[START_SEG1]\nHola\n[END_SEG1]\n\n[START_SEG2]\nMundo\n[END_SEG2]";

    let decoded = decode_response(response);

    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[&1], "Hola");
    assert_eq!(decoded[&2], "Mundo");
}

/// Test decoding when the model wraps the units in prose
#[test]
fn test_decode_response_withSurroundingProse_shouldIgnoreProse() {
    let response = "Here is the translation you asked for:\n\n\
                    [START_SEG1]\nHola\n[END_SEG1]\n\n\
                    I hope this helps!";

    let decoded = decode_response(response);

    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[&1], "Hola");
}

/// Test decoding a response with one unit missing
#[test]
fn test_decode_response_withMissingPosition_shouldReturnSubset() {
    let response = "[START_SEG1]\nUno\n[END_SEG1]\n\n[START_SEG3]\nTres\n[END_SEG3]";

    let decoded = decode_response(response);

    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[&1], "Uno");
    assert_eq!(decoded[&3], "Tres");
    assert!(!decoded.contains_key(&2));
}

/// Test decoding a response with reordered units
#[test]
fn test_decode_response_withReorderedUnits_shouldMapByNumber() {
    let response = "[START_SEG2]\nMundo\n[END_SEG2]\n\n[START_SEG1]\nHola\n[END_SEG1]";

    let decoded = decode_response(response);

    assert_eq!(decoded[&1], "Hola");
    assert_eq!(decoded[&2], "Mundo");
}

/// Test that a repeated position number keeps the last occurrence
#[test]
fn test_decode_response_withDuplicatePosition_shouldKeepLast() {
    let response = "[START_SEG1]\nfirst\n[END_SEG1]\n\n[START_SEG1]\nsecond\n[END_SEG1]";

    let decoded = decode_response(response);

    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[&1], "second");
}

/// Test that mismatched start and end numbers do not pair up
#[test]
fn test_decode_response_withMismatchedNumbers_shouldMatchNothing() {
    let response = "[START_SEG1]\nHola\n[END_SEG2]";

    let decoded = decode_response(response);

    assert!(decoded.is_empty());
}

/// Test that an unterminated unit does not swallow later ones
#[test]
fn test_decode_response_withUnterminatedUnit_shouldRecoverLaterUnits() {
    let response = "[START_SEG1]\ntruncated\n[START_SEG2]\nMundo\n[END_SEG2]";

    let decoded = decode_response(response);

    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[&2], "Mundo");
}

/// Test that zero-padded numbers pair literally and parse numerically
#[test]
fn test_decode_response_withZeroPaddedNumbers_shouldPairLiterally() {
    let padded = decode_response("[START_SEG01]\npadded\n[END_SEG01]");
    assert_eq!(padded[&1], "padded");

    // A start with padding and an end without it never pair
    let mixed = decode_response("[START_SEG01]\nx\n[END_SEG1]");
    assert!(mixed.is_empty());
}

/// Test that inner text is trimmed
#[test]
fn test_decode_response_withPaddedInnerText_shouldTrim() {
    let response = "[START_SEG1]\n   Hola  \n\n[END_SEG1]";

    let decoded = decode_response(response);

    assert_eq!(decoded[&1], "Hola");
}

/// Test decoding an empty response
#[test]
fn test_decode_response_withEmptyResponse_shouldReturnEmptyMap() {
    assert!(decode_response("").is_empty());
}

/// Test that a number too large for a batch position is skipped
#[test]
fn test_decode_response_withOverflowingNumber_shouldSkipMarker() {
    let response = "[START_SEG99999999999999999999999]\nx\n[END_SEG99999999999999999999999]";

    let decoded = decode_response(response);

    assert!(decoded.is_empty());
}
