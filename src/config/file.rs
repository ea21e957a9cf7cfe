//! TOML configuration file loading
//!
//! Supports `~/.config/reachy-kiosk/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct KioskConfigFile {
    /// Speech input/output
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Device selection
    #[serde(default)]
    pub audio: AudioFileConfig,

    /// Lesson content source
    #[serde(default)]
    pub content: ContentFileConfig,
}

/// Voice processing configuration
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct VoiceFileConfig {
    /// Enable spoken interaction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Recognition model directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,

    /// Listening window in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_seconds: Option<f64>,

    /// Speaking rate in words per minute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_rate: Option<u32>,

    /// Synthesizer voice name (e.g. "en-us")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_voice: Option<String>,

    /// Synthesizer binary (e.g. "espeak-ng")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthesizer: Option<String>,

    /// External recognizer command; receives a WAV path, prints `{"text": ...}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recognizer_command: Option<String>,
}

/// Audio device configuration
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct AudioFileConfig {
    /// Microphone name keywords, highest priority first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mic_keywords: Option<Vec<String>>,

    /// Speaker name keywords, highest priority first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_keywords: Option<Vec<String>>,

    /// Keyword used to find alternate speakers after a failed verification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_keyword: Option<String>,

    /// Play a silent buffer through the chosen speaker at startup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_output: Option<bool>,

    /// Record a short clip at startup and report the mic level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_mic: Option<bool>,
}

/// Lesson content configuration
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct ContentFileConfig {
    /// JSON lesson plan replacing the built-in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `KioskConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> KioskConfigFile {
    config_file_path().map_or_else(KioskConfigFile::default, |path| load_config_file_from(&path))
}

/// Load a TOML config file from an explicit path, with the same fallbacks
pub fn load_config_file_from(path: &Path) -> KioskConfigFile {
    if !path.exists() {
        return KioskConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                KioskConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            KioskConfigFile::default()
        }
    }
}

/// Write a config file, creating parent directories
///
/// # Errors
///
/// Returns error if serialization or the write fails
pub fn save_config_file(path: &Path, config: &KioskConfigFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| crate::Error::Config(format!("failed to serialize config: {e}")))?;
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "saved config file");
    Ok(())
}

/// Return the config file path: `~/.config/reachy-kiosk/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("reachy-kiosk").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_file_from(&dir.path().join("nope.toml"));
        assert_eq!(config, KioskConfigFile::default());
    }

    #[test]
    fn test_partial_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[audio]\nmic_keywords = [\"usb\"]\n\n[voice]\ntts_rate = 140\n",
        )
        .unwrap();

        let config = load_config_file_from(&path);
        assert_eq!(config.audio.mic_keywords, Some(vec!["usb".to_string()]));
        assert_eq!(config.audio.speaker_keywords, None);
        assert_eq!(config.voice.tts_rate, Some(140));
        assert_eq!(config.content.path, None);
    }

    #[test]
    fn test_invalid_toml_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[audio\nmic_keywords = ").unwrap();
        assert_eq!(load_config_file_from(&path), KioskConfigFile::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = KioskConfigFile::default();
        config.audio.speaker_keywords = Some(vec!["output (reachy".to_string()]);
        config.audio.verify_output = Some(false);
        save_config_file(&path, &config).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("model_path"));
        assert_eq!(load_config_file_from(&path), config);
    }
}
