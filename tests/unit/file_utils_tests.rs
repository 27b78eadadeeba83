/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use boardcast::file_utils::FileManager;
use std::path::{Path, PathBuf};

use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "test_file_exists.tmp",
        "test content",
    )?;

    assert!(FileManager::file_exists(&test_file));

    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

/// Test that ensure_dir creates directories as needed
#[test]
fn test_ensure_dir_withNonExistentDir_shouldCreateDirectory() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_subdir = temp_dir.path().join("nested").join("work");

    FileManager::ensure_dir(&test_subdir)?;

    assert!(test_subdir.exists());
    assert!(test_subdir.is_dir());

    Ok(())
}

/// Test that session paths are scoped under the session identifier
#[test]
fn test_sessionPaths_shouldBeScopedBySessionId() {
    let work_dir = Path::new("/var/lib/boardcast");

    assert_eq!(
        FileManager::session_work_dir(work_dir, "abc"),
        Path::new("/var/lib/boardcast/sessions/abc")
    );
    assert_eq!(
        FileManager::video_output_path(work_dir, "abc"),
        Path::new("/var/lib/boardcast/videos/abc.mp4")
    );
    assert_eq!(
        FileManager::project_output_path(work_dir, "abc"),
        Path::new("/var/lib/boardcast/projects/abc.json")
    );
}

/// Test that the concat manifest carries file and duration lines
#[test]
fn test_write_concat_manifest_withDurations_shouldWriteDirectives() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let manifest = temp_dir.path().join("slides.txt");

    let entries = vec![
        (PathBuf::from("/work/slide_1.png"), Some(5.0)),
        (PathBuf::from("/work/slide_2.png"), Some(5.0)),
        (PathBuf::from("/work/slide_2.png"), None),
    ];
    FileManager::write_concat_manifest(&manifest, &entries)?;

    let content = FileManager::read_to_string(&manifest)?;
    assert_eq!(
        content,
        "file '/work/slide_1.png'\nduration 5\nfile '/work/slide_2.png'\nduration 5\nfile '/work/slide_2.png'\n"
    );

    Ok(())
}

/// Test that single quotes in manifest paths are escaped
#[test]
fn test_write_concat_manifest_withQuoteInPath_shouldEscapeQuote() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let manifest = temp_dir.path().join("audio.txt");

    let entries = vec![(PathBuf::from("/work/it's.mp3"), None)];
    FileManager::write_concat_manifest(&manifest, &entries)?;

    let content = FileManager::read_to_string(&manifest)?;
    assert!(content.contains("file '/work/it'\\''s.mp3'"));

    Ok(())
}

/// Test that copy_file creates the target directory
#[test]
fn test_copy_file_withMissingTargetDir_shouldCreateAndCopy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "source.txt",
        "exam content",
    )?;
    let target = temp_dir.path().join("uploads").join("exam.txt");

    FileManager::copy_file(&source, &target)?;

    assert!(FileManager::file_exists(&target));
    assert_eq!(FileManager::read_to_string(&target)?, "exam content");

    Ok(())
}
