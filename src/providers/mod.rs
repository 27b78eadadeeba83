/*!
 * Provider implementations for external collaborators.
 *
 * This module contains the pluggable seams the pipeline calls out through:
 * - pdftotext: document text extraction via the poppler CLI
 * - azure_tts: narration synthesis via the Azure speech REST endpoint
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

use crate::errors::ToolError;
use crate::session::SessionAudio;
use crate::teaching::NarrationScript;

/// Extracts plain text from an uploaded document
///
/// Implementations must be safe to call concurrently for different sessions.
#[async_trait]
pub trait DocumentExtractor: Send + Sync + Debug {
    /// Extract the full text of a document
    async fn extract_text(&self, path: &Path) -> Result<String, ToolError>;
}

/// Synthesizes narration audio from per-question scripts
///
/// An unconfigured synthesizer returns an empty list rather than an error;
/// rendering then proceeds without narration.
#[async_trait]
pub trait NarrationSynthesizer: Send + Sync + Debug {
    /// Synthesize one audio track per script into the given directory
    async fn synthesize(
        &self,
        scripts: &[NarrationScript],
        output_dir: &Path,
    ) -> Result<Vec<SessionAudio>, ToolError>;
}

pub mod azure_tts;
pub mod pdftotext;
