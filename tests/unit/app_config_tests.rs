/*!
 * Tests for application configuration
 */

use anyhow::Result;
use boardcast::app_config::{Config, LogLevel};

/// Test that the default configuration is valid
#[test]
fn test_defaultConfig_shouldPassValidation() -> Result<()> {
    let config = Config::default();
    config.validate()?;

    assert_eq!(config.render.frame_width, 1920);
    assert_eq!(config.render.frame_height, 1080);
    assert_eq!(config.render.frame_rate, 30);
    assert_eq!(config.render.board_color, "#0b3d2e");
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(!config.speech_configured());

    Ok(())
}

/// Test that zero frame dimensions fail validation
#[test]
fn test_validate_withZeroFrameWidth_shouldFail() {
    let mut config = Config::default();
    config.render.frame_width = 0;

    assert!(config.validate().is_err());
}

/// Test that a key without a region fails validation
#[test]
fn test_validate_withKeyButNoRegion_shouldFail() {
    let mut config = Config::default();
    config.speech.api_key = "secret".to_string();

    assert!(config.validate().is_err());
}

/// Test that full speech credentials validate and report configured
#[test]
fn test_speechConfigured_withKeyAndRegion_shouldReturnTrue() -> Result<()> {
    let mut config = Config::default();
    config.speech.api_key = "secret".to_string();
    config.speech.region = "westeurope".to_string();

    config.validate()?;
    assert!(config.speech_configured());

    Ok(())
}

/// Test that a partial JSON document fills in defaults
#[test]
fn test_deserialize_withPartialJson_shouldApplyDefaults() -> Result<()> {
    let json = r#"{ "log_level": "debug", "render": { "frame_rate": 25 } }"#;
    let config: Config = serde_json::from_str(json)?;

    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.render.frame_rate, 25);
    assert_eq!(config.render.frame_width, 1920);
    assert_eq!(config.speech.voice, "en-US-JennyNeural");

    Ok(())
}

/// Test that the configuration round-trips through JSON
#[test]
fn test_serialize_shouldRoundTrip() -> Result<()> {
    let config = Config::default();
    let json = serde_json::to_string_pretty(&config)?;
    let parsed: Config = serde_json::from_str(&json)?;

    assert_eq!(parsed.render.board_color, config.render.board_color);
    assert_eq!(parsed.work_dir, config.work_dir);

    Ok(())
}
