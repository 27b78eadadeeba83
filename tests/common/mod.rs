/*!
 * Common test utilities for the boardcast test suite
 */

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// Re-export the mock providers module
pub mod mock_providers;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Sample exam paper text with three numbered questions
pub fn sample_exam_text() -> &'static str {
    "PHYSICAL SCIENCES PAPER 1\n\
     Instructions: answer all questions.\n\
     \n\
     1.1 Define velocity. (2)\n\
     \n\
     1.2 A trolley accelerates from rest at 2 m/s^2.\n\
     Calculate the net force acting on the trolley if its mass is 10 kg. (4 marks)\n\
     \n\
     2 Explain the difference between mass and weight. (3)\n"
}

/// Sample memo text answering the exam questions
pub fn sample_memo_text() -> &'static str {
    "MARKING GUIDELINES\n\
     \n\
     1.1 Velocity is the rate of change of position.\n\
     \n\
     1.2 F = ma = 10 x 2 = 20 N\n\
     \n\
     2 Mass is the amount of matter; weight is the gravitational force on that mass.\n"
}
