/*!
 * Tests for file utility functions
 */

use std::path::Path;
use anyhow::Result;
use subtran::file_utils::FileManager;
use crate::common;

/// Test that file_exists returns true for existing files only
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file_path = common::create_test_file(&temp_dir.path().to_path_buf(), "test.txt", "content")?;

    assert!(FileManager::file_exists(&file_path));
    assert!(!FileManager::file_exists(temp_dir.path().join("missing.txt")));
    // A directory is not a file
    assert!(!FileManager::file_exists(temp_dir.path()));
    Ok(())
}

/// Test that dir_exists distinguishes directories from files
#[test]
fn test_dir_exists_withExistingDir_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file_path = common::create_test_file(&temp_dir.path().to_path_buf(), "test.txt", "content")?;

    assert!(FileManager::dir_exists(temp_dir.path()));
    assert!(!FileManager::dir_exists(&file_path));
    assert!(!FileManager::dir_exists(temp_dir.path().join("missing")));
    Ok(())
}

/// Test nested directory creation
#[test]
fn test_ensure_dir_withNestedPath_shouldCreateAllLevels() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b").join("c");

    FileManager::ensure_dir(&nested)?;

    assert!(FileManager::dir_exists(&nested));
    // Creating an existing directory is a no-op
    FileManager::ensure_dir(&nested)?;
    Ok(())
}

/// Test the output path naming convention
#[test]
fn test_generate_output_path_withSrtInput_shouldInsertLanguageSuffix() {
    let output = FileManager::generate_output_path(
        Path::new("/videos/movie.srt"),
        Path::new("/videos"),
        "Spanish",
        "srt",
    );

    assert_eq!(output, Path::new("/videos/movie.Spanish.srt"));
}

/// Test language suffix detection on generated output names
#[test]
fn test_has_language_suffix_withGeneratedName_shouldMatchCaseInsensitive() {
    assert!(FileManager::has_language_suffix(Path::new("movie.Spanish.srt"), "Spanish"));
    assert!(FileManager::has_language_suffix(Path::new("movie.spanish.srt"), "Spanish"));
    assert!(FileManager::has_language_suffix(Path::new("movie.SPANISH.srt"), "spanish"));
    assert!(!FileManager::has_language_suffix(Path::new("movie.srt"), "Spanish"));
    assert!(!FileManager::has_language_suffix(Path::new("movie.French.srt"), "Spanish"));
}

/// Test recursive file discovery filtered by extension
#[test]
fn test_find_files_withMixedTree_shouldReturnMatchingExtensionOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path().to_path_buf();
    common::create_test_file(&root, "first.srt", "1\n")?;
    common::create_test_file(&root, "notes.txt", "notes")?;
    FileManager::ensure_dir(root.join("nested"))?;
    common::create_test_file(&root.join("nested"), "second.SRT", "2\n")?;

    let mut found = FileManager::find_files(&root, "srt")?;
    found.sort();

    assert_eq!(found.len(), 2);
    assert!(found.iter().any(|p| p.ends_with("first.srt")));
    // Extension matching ignores case
    assert!(found.iter().any(|p| p.ends_with("second.SRT")));
    Ok(())
}

/// Test that writing creates missing parent directories
#[test]
fn test_write_to_file_withMissingParent_shouldCreateAndRoundTrip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let target = temp_dir.path().join("out").join("result.srt");

    FileManager::write_to_file(&target, "subtitle content")?;

    assert_eq!(FileManager::read_to_string(&target)?, "subtitle content");
    Ok(())
}

/// Test that reading a missing file reports the path
#[test]
fn test_read_to_string_withMissingFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let result = FileManager::read_to_string(temp_dir.path().join("missing.srt"));

    assert!(result.is_err());
    assert!(format!("{:#}", result.unwrap_err()).contains("Failed to read file"));
    Ok(())
}

/// Test appending timestamped lines to a log file
#[test]
fn test_append_to_log_file_withTwoWrites_shouldKeepBothLines() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let log_path = temp_dir.path().join("run.log");

    FileManager::append_to_log_file(&log_path, "first message")?;
    FileManager::append_to_log_file(&log_path, "second message")?;

    let content = FileManager::read_to_string(&log_path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with('['));
    assert!(lines[0].ends_with("first message"));
    assert!(lines[1].ends_with("second message"));
    Ok(())
}
