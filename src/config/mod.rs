//! Configuration management for the lesson kiosk

pub mod file;

use std::path::PathBuf;

use self::file::KioskConfigFile;
use crate::{Error, Result};

/// Default recognition model directory
pub const DEFAULT_MODEL_PATH: &str = "models/vosk-model-small-en-us-0.15";

/// Default microphone keywords, highest priority first
pub const DEFAULT_MIC_KEYWORDS: &[&str] =
    &["reachy mini audio", "echo cancelling", "reachy", "pollen"];

/// Default speaker keywords, highest priority first
pub const DEFAULT_SPEAKER_KEYWORDS: &[&str] =
    &["output (reachy", "reachy mini audio", "reachy", "pollen"];

/// Longest accepted listening window, in seconds
pub const MAX_RECORD_SECONDS: f64 = 60.0;

/// Default keyword for alternate speaker search
pub const DEFAULT_FALLBACK_KEYWORD: &str = "reachy";

/// Kiosk configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Voice configuration
    pub voice: VoiceConfig,

    /// Audio device configuration
    pub audio: AudioConfig,

    /// Lesson plan override; `None` uses the built-in plan
    pub content_path: Option<PathBuf>,
}

/// Voice processing configuration
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    /// Enable spoken interaction; text-only when false
    pub enabled: bool,

    /// Recognition model directory (`VOSK_MODEL_PATH`)
    pub model_path: PathBuf,

    /// Listening window in seconds
    pub record_seconds: f64,

    /// Capture sample rate for recognition
    pub sample_rate: u32,

    /// Speaking rate in words per minute
    pub tts_rate: u32,

    /// Synthesizer voice name
    pub tts_voice: Option<String>,

    /// Synthesizer binary; `None` searches for espeak-ng, then espeak
    pub synthesizer: Option<String>,

    /// External recognizer command
    pub recognizer_command: Option<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            record_seconds: 5.0,
            sample_rate: crate::audio::SAMPLE_RATE,
            tts_rate: 165,
            tts_voice: None,
            synthesizer: None,
            recognizer_command: None,
        }
    }
}

/// Audio device selection configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioConfig {
    /// Microphone name keywords, highest priority first
    pub mic_keywords: Vec<String>,

    /// Speaker name keywords, highest priority first
    pub speaker_keywords: Vec<String>,

    /// Keyword for the alternate speaker search
    pub fallback_keyword: String,

    /// Verify the resolved speaker at startup
    pub verify_output: bool,

    /// Probe the resolved microphone at startup
    pub probe_mic: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            mic_keywords: DEFAULT_MIC_KEYWORDS.iter().map(ToString::to_string).collect(),
            speaker_keywords: DEFAULT_SPEAKER_KEYWORDS.iter().map(ToString::to_string).collect(),
            fallback_keyword: DEFAULT_FALLBACK_KEYWORD.to_string(),
            verify_output: true,
            probe_mic: true,
        }
    }
}

/// Command-line overrides applied after env and file
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Force text-only interaction
    pub text_only: bool,

    /// Listening window override
    pub record_seconds: Option<f64>,

    /// Skip speaker verification
    pub no_verify: bool,
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Whether `seconds` is a usable listening or recording window
#[must_use]
pub fn valid_window(seconds: f64) -> bool {
    seconds.is_finite() && seconds > 0.0 && seconds <= MAX_RECORD_SECONDS
}

impl Config {
    /// Load configuration from environment, config file and defaults
    ///
    /// Precedence: CLI options > env > TOML file > defaults.
    ///
    /// # Errors
    ///
    /// Returns error if a resulting value is out of range
    pub fn load(options: &LoadOptions) -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok(), options)
    }

    /// Merge an already-loaded file overlay with an env lookup
    ///
    /// # Errors
    ///
    /// Returns error if a resulting value is out of range
    pub fn from_sources<F>(fc: KioskConfigFile, env: F, options: &LoadOptions) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        let voice = VoiceConfig {
            enabled: !options.text_only
                && env("KIOSK_VOICE")
                    .as_deref()
                    .and_then(parse_flag)
                    .or(fc.voice.enabled)
                    .unwrap_or(default.voice.enabled),
            model_path: env("VOSK_MODEL_PATH")
                .or(fc.voice.model_path)
                .map_or(default.voice.model_path, PathBuf::from),
            record_seconds: options
                .record_seconds
                .or_else(|| env("KIOSK_RECORD_SECONDS").and_then(|s| s.parse().ok()))
                .or(fc.voice.record_seconds)
                .unwrap_or(default.voice.record_seconds),
            sample_rate: default.voice.sample_rate,
            tts_rate: env("KIOSK_TTS_RATE")
                .and_then(|s| s.parse().ok())
                .or(fc.voice.tts_rate)
                .unwrap_or(default.voice.tts_rate),
            tts_voice: env("KIOSK_TTS_VOICE").or(fc.voice.tts_voice),
            synthesizer: env("KIOSK_SYNTHESIZER").or(fc.voice.synthesizer),
            recognizer_command: env("KIOSK_RECOGNIZER_CMD").or(fc.voice.recognizer_command),
        };

        if !valid_window(voice.record_seconds) {
            return Err(Error::Config(format!(
                "record_seconds must be above 0 and at most {MAX_RECORD_SECONDS}, got {}",
                voice.record_seconds
            )));
        }

        let audio = AudioConfig {
            mic_keywords: env("KIOSK_MIC_KEYWORDS")
                .map(|s| split_list(&s))
                .or(fc.audio.mic_keywords)
                .unwrap_or(default.audio.mic_keywords),
            speaker_keywords: env("KIOSK_SPEAKER_KEYWORDS")
                .map(|s| split_list(&s))
                .or(fc.audio.speaker_keywords)
                .unwrap_or(default.audio.speaker_keywords),
            fallback_keyword: env("KIOSK_FALLBACK_KEYWORD")
                .or(fc.audio.fallback_keyword)
                .unwrap_or(default.audio.fallback_keyword),
            verify_output: !options.no_verify
                && env("KIOSK_VERIFY_OUTPUT")
                    .as_deref()
                    .and_then(parse_flag)
                    .or(fc.audio.verify_output)
                    .unwrap_or(default.audio.verify_output),
            probe_mic: env("KIOSK_PROBE_MIC")
                .as_deref()
                .and_then(parse_flag)
                .or(fc.audio.probe_mic)
                .unwrap_or(default.audio.probe_mic),
        };

        let content_path = env("KIOSK_CONTENT_PATH")
            .or(fc.content.path)
            .map(PathBuf::from);

        tracing::debug!(
            voice = voice.enabled,
            model = %voice.model_path.display(),
            verify_output = audio.verify_output,
            "configuration loaded"
        );

        Ok(Self {
            voice,
            audio,
            content_path,
        })
    }
}
