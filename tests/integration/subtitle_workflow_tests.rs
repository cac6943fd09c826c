/*!
 * Integration tests for the file-level subtitle workflows
 */

use anyhow::Result;

use subtran::file_utils::FileManager;
use subtran::reformat::{merge_short_entries, split_long_lines, to_ass_dialogues};
use subtran::subtitle_processor::{SubtitleCollection, TextJoin};

use crate::common;

/// Test parsing a file and writing it back
#[test]
fn test_workflow_parseAndWrite_shouldRoundTripThroughFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_path = common::create_test_subtitle(&temp_dir.path().to_path_buf(), "sample.srt")?;

    let collection = SubtitleCollection::from_srt_file(&input_path, TextJoin::Newline)?;
    assert_eq!(collection.entries.len(), 3);

    let output_path = temp_dir.path().join("copied").join("sample.srt");
    collection.write_to_srt(&output_path)?;

    let reparsed = SubtitleCollection::from_srt_file(&output_path, TextJoin::Newline)?;
    assert_eq!(reparsed.entries, collection.entries);
    Ok(())
}

/// Test the merge pass applied to a parsed file
#[test]
fn test_workflow_mergeShortEntries_shouldRewriteFileInPlace() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_path = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "choppy.srt",
        "1\n00:00:01,000 --> 00:00:02,000\nA reasonably long opening line\n\n\
         2\n00:00:02,000 --> 00:00:03,000\nYes.\n\n\
         3\n00:00:03,000 --> 00:00:04,000\nAnother line that stands on its own\n\n",
    )?;

    let content = FileManager::read_to_string(&input_path)?;
    let entries = SubtitleCollection::parse_srt_string(&content, TextJoin::Space);
    let merged = merge_short_entries(&entries, 10);

    let collection = SubtitleCollection::new(input_path.clone(), merged);
    FileManager::write_to_file(&input_path, &collection.to_srt_string())?;

    let reparsed = SubtitleCollection::from_srt_file(&input_path, TextJoin::Newline)?;
    assert_eq!(reparsed.entries.len(), 2);
    assert_eq!(reparsed.entries[0].index, 1);
    assert_eq!(
        reparsed.entries[0].source_text,
        "A reasonably long opening line Yes."
    );
    assert_eq!(reparsed.entries[0].timing, "00:00:01,000 --> 00:00:03,000");
    assert_eq!(reparsed.entries[1].index, 2);
    Ok(())
}

/// Test the split pass applied to a parsed file
#[test]
fn test_workflow_splitLongLines_shouldInsertBreaks() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_path = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "long.srt",
        "1\n00:00:01,000 --> 00:00:02,000\nabcdefghijklmnopqrstuvwxyz\n\n",
    )?;

    let content = FileManager::read_to_string(&input_path)?;
    let entries = SubtitleCollection::parse_srt_string(&content, TextJoin::Space);
    let split = split_long_lines(&entries, 10);

    assert_eq!(split[0].translated_text, "abcdefghijklm\\Nnopqrstuvwxyz");
    Ok(())
}

/// Test converting a parsed file into ASS dialogue lines
#[test]
fn test_workflow_assConversion_shouldProduceDialogueLines() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_path = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "styled.srt",
        "1\n00:00:01,000 --> 00:00:02,000\n<i>Hello</i>\n\n\
         2\n00:00:02,000 --> 00:00:03,000\nWorld\n\n",
    )?;

    let content = FileManager::read_to_string(&input_path)?;
    let entries = SubtitleCollection::parse_srt_string(&content, TextJoin::Space);
    let dialogues = to_ass_dialogues(&entries, "Default", true);

    let output_path = temp_dir.path().join("styled.dialogue.ass");
    FileManager::write_to_file(&output_path, &format!("{}\n", dialogues.join("\n")))?;

    let written = FileManager::read_to_string(&output_path)?;
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "Dialogue: 1,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hello");
    assert_eq!(lines[1], "Dialogue: 1,0:00:02.00,0:00:03.00,Default,,0,0,0,,World");
    Ok(())
}

/// Test folder discovery leaves previous translation outputs alone
#[test]
fn test_workflow_folderDiscovery_shouldSkipExistingTranslations() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path().to_path_buf();
    common::create_test_subtitle(&root, "movie.srt")?;
    common::create_test_subtitle(&root, "movie.Spanish.srt")?;
    FileManager::ensure_dir(root.join("season2"))?;
    common::create_test_subtitle(&root.join("season2"), "episode.srt")?;

    let pending: Vec<_> = FileManager::find_files(&root, "srt")?
        .into_iter()
        .filter(|path| !FileManager::has_language_suffix(path, "Spanish"))
        .collect();

    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|p| !p.ends_with("movie.Spanish.srt")));
    Ok(())
}
