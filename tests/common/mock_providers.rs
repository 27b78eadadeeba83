/*!
 * Mock provider implementations for pipeline tests
 */

use async_trait::async_trait;
use std::path::Path;

use boardcast::errors::ToolError;
use boardcast::providers::{DocumentExtractor, NarrationSynthesizer};
use boardcast::session::SessionAudio;
use boardcast::teaching::NarrationScript;

/// Extractor that returns canned text based on the staged file name
#[derive(Debug)]
pub struct MockExtractor {
    pub exam_text: String,
    pub memo_text: String,
}

#[async_trait]
impl DocumentExtractor for MockExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String, ToolError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.starts_with("exam") {
            Ok(self.exam_text.clone())
        } else if name.starts_with("memo") {
            Ok(self.memo_text.clone())
        } else {
            Err(ToolError::WorkFile(format!("unexpected document: {}", name)))
        }
    }
}

/// Synthesizer that writes an empty file per script
#[derive(Debug)]
pub struct MockSynthesizer;

#[async_trait]
impl NarrationSynthesizer for MockSynthesizer {
    async fn synthesize(
        &self,
        scripts: &[NarrationScript],
        output_dir: &Path,
    ) -> Result<Vec<SessionAudio>, ToolError> {
        let mut tracks = Vec::new();
        for script in scripts {
            let audio_path = output_dir.join(format!(
                "narration_{}.mp3",
                script.question_number.replace('.', "_")
            ));
            std::fs::write(&audio_path, b"").map_err(|e| ToolError::WorkFile(e.to_string()))?;
            tracks.push(SessionAudio {
                question_number: script.question_number.clone(),
                audio_path,
            });
        }
        Ok(tracks)
    }
}
