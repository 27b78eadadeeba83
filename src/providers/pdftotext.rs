use async_trait::async_trait;
use log::{debug, info};
use std::path::Path;

use crate::errors::ToolError;
use crate::file_utils::FileManager;
use crate::providers::DocumentExtractor;
use crate::tools::{non_zero_exit, run_tool};

// @const: Extraction subprocess timeout
const EXTRACT_TIMEOUT_SECS: u64 = 120;

/// Document extractor backed by the poppler `pdftotext` CLI
///
/// Plain-text uploads (.txt, .md) are read directly so test fixtures and
/// pre-extracted papers skip the subprocess entirely.
#[derive(Debug, Default)]
pub struct PdfTextExtractor;

#[async_trait]
impl DocumentExtractor for PdfTextExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String, ToolError> {
        if !FileManager::file_exists(path) {
            return Err(ToolError::WorkFile(format!(
                "document does not exist: {:?}",
                path
            )));
        }

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if extension == "txt" || extension == "md" {
            debug!("Reading plain-text document directly: {:?}", path);
            return FileManager::read_to_string(path)
                .map_err(|e| ToolError::WorkFile(e.to_string()));
        }

        let output_file = tempfile::Builder::new()
            .suffix(".txt")
            .tempfile()
            .map_err(|e| ToolError::WorkFile(e.to_string()))?;

        // -layout preserves column structure so question numbers stay at
        // line starts
        let args: Vec<String> = vec![
            "-layout".to_string(),
            path.to_string_lossy().into_owned(),
            output_file.path().to_string_lossy().into_owned(),
        ];

        info!("Extracting text from {:?}", path);
        let result = run_tool("pdftotext", &args, EXTRACT_TIMEOUT_SECS).await?;
        if !result.status.success() {
            return Err(non_zero_exit("pdftotext", &result));
        }

        FileManager::read_to_string(output_file.path())
            .map_err(|e| ToolError::WorkFile(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_extractText_withPlainTextFile_shouldReadDirectly() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "1.1 Define velocity. (2)").unwrap();

        let extractor = PdfTextExtractor;
        let text = extractor.extract_text(file.path()).await.unwrap();

        assert!(text.contains("Define velocity"));
    }

    #[tokio::test]
    async fn test_extractText_withMissingFile_shouldReturnWorkFileError() {
        let extractor = PdfTextExtractor;
        let result = extractor
            .extract_text(Path::new("/nonexistent/paper.pdf"))
            .await;

        assert!(matches!(result, Err(ToolError::WorkFile(_))));
    }
}
