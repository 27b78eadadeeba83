use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

use crate::app_config::SpeechConfig;
use crate::errors::ToolError;
use crate::providers::NarrationSynthesizer;
use crate::session::SessionAudio;
use crate::teaching::NarrationScript;

// @const: Output encoding requested from the speech endpoint
const OUTPUT_FORMAT: &str = "audio-16khz-128kbitrate-mono-mp3";

/// Narration synthesizer backed by the Azure speech REST endpoint
///
/// Each narration script becomes one SSML request and one mp3 file. With no
/// credentials configured, synthesis is a no-op that returns an empty list.
#[derive(Debug)]
pub struct AzureSynthesizer {
    client: Client,
    config: SpeechConfig,
}

impl AzureSynthesizer {
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    fn configured(&self) -> bool {
        !self.config.api_key.is_empty() && !self.config.region.is_empty()
    }

    fn endpoint(&self) -> String {
        format!(
            "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
            self.config.region
        )
    }

    fn build_ssml(&self, voice_text: &str) -> String {
        format!(
            "<speak version='1.0' xml:lang='en-US'><voice name='{}'>{}</voice></speak>",
            self.config.voice,
            escape_xml(voice_text)
        )
    }

    async fn synthesize_one(
        &self,
        script: &NarrationScript,
        output_dir: &Path,
    ) -> Result<SessionAudio, ToolError> {
        let ssml = self.build_ssml(&script.voice_text);

        let response = self
            .client
            .post(self.endpoint())
            .header("Ocp-Apim-Subscription-Key", &self.config.api_key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .body(ssml)
            .send()
            .await
            .map_err(|e| ToolError::LaunchFailed {
                tool: "speech-synthesizer".to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Speech synthesis error ({}): {}", status, error_text);
            return Err(ToolError::NonZeroExit {
                tool: "speech-synthesizer".to_string(),
                status: status.to_string(),
                stderr: error_text,
            });
        }

        let audio = response.bytes().await.map_err(|e| ToolError::LaunchFailed {
            tool: "speech-synthesizer".to_string(),
            message: e.to_string(),
        })?;

        let file_name = format!("narration_{}.mp3", sanitize_number(&script.question_number));
        let audio_path = output_dir.join(file_name);
        std::fs::write(&audio_path, &audio).map_err(|e| ToolError::WorkFile(e.to_string()))?;

        debug!(
            "Synthesized narration for question {} ({} bytes)",
            script.question_number,
            audio.len()
        );
        Ok(SessionAudio {
            question_number: script.question_number.clone(),
            audio_path,
        })
    }
}

#[async_trait]
impl NarrationSynthesizer for AzureSynthesizer {
    async fn synthesize(
        &self,
        scripts: &[NarrationScript],
        output_dir: &Path,
    ) -> Result<Vec<SessionAudio>, ToolError> {
        if !self.configured() {
            info!("Narration synthesizer not configured, rendering without narration");
            return Ok(Vec::new());
        }

        let mut tracks = Vec::with_capacity(scripts.len());
        for script in scripts {
            tracks.push(self.synthesize_one(script, output_dir).await?);
        }
        Ok(tracks)
    }
}

// Question numbers contain dots; keep filenames portable
fn sanitize_number(number: &str) -> String {
    number
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
