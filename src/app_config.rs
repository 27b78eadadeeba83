use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Root directory for uploads, work files and rendered output
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Render settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Narration synthesizer settings
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Settings for the external render tool invocation
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RenderConfig {
    /// Output frame width in pixels
    #[serde(default = "default_frame_width")]
    pub frame_width: u32,

    /// Output frame height in pixels
    #[serde(default = "default_frame_height")]
    pub frame_height: u32,

    /// Output frame rate
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    /// Board background color (hex, ffmpeg color syntax)
    #[serde(default = "default_board_color")]
    pub board_color: String,

    /// Font file used for drawtext overlays
    #[serde(default = "default_font_file")]
    pub font_file: String,

    /// Render subprocess timeout in seconds
    #[serde(default = "default_render_timeout_secs")]
    pub timeout_secs: u64,
}

/// Settings for the narration synthesizer (Azure TTS REST endpoint)
///
/// An empty key or region means the synthesizer is unconfigured: narration
/// synthesis returns no audio and rendering proceeds silent.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpeechConfig {
    /// Subscription key for the speech service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service region (e.g. "westeurope")
    #[serde(default = "String::new")]
    pub region: String,

    /// Voice name used for synthesis
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Request timeout in seconds
    #[serde(default = "default_speech_timeout_secs")]
    pub timeout_secs: u64,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("workdir")
}

fn default_frame_width() -> u32 {
    1920
}

fn default_frame_height() -> u32 {
    1080
}

fn default_frame_rate() -> u32 {
    30
}

fn default_board_color() -> String {
    "#0b3d2e".to_string()
}

fn default_font_file() -> String {
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string()
}

fn default_render_timeout_secs() -> u64 {
    600
}

fn default_speech_timeout_secs() -> u64 {
    60
}

fn default_voice() -> String {
    "en-US-JennyNeural".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.render.frame_width == 0 || self.render.frame_height == 0 {
            return Err(anyhow!("Render frame dimensions must be non-zero"));
        }

        if self.render.frame_rate == 0 {
            return Err(anyhow!("Render frame rate must be non-zero"));
        }

        // A key without a region (or the reverse) is a misconfiguration, not
        // an unconfigured synthesizer
        let speech = &self.speech;
        if speech.api_key.is_empty() != speech.region.is_empty() {
            return Err(anyhow!(
                "Speech config requires both api_key and region, or neither"
            ));
        }

        Ok(())
    }

    /// Whether the narration synthesizer has credentials configured
    pub fn speech_configured(&self) -> bool {
        !self.speech.api_key.is_empty() && !self.speech.region.is_empty()
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            work_dir: default_work_dir(),
            render: RenderConfig::default(),
            speech: SpeechConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            region: String::new(),
            voice: default_voice(),
            timeout_secs: default_speech_timeout_secs(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frame_width: default_frame_width(),
            frame_height: default_frame_height(),
            frame_rate: default_frame_rate(),
            board_color: default_board_color(),
            font_file: default_font_file(),
            timeout_secs: default_render_timeout_secs(),
        }
    }
}
