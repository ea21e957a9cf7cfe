//! Speech-to-text (STT) processing
//!
//! Recognition is offline. The built-in backend uses a Vosk model (enabled with
//! the `vosk` feature); an external command can stand in for it.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::audio::samples_to_wav;
use crate::{Error, Result};

/// Final result emitted by the recognizer
#[derive(Debug, Default, serde::Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    text: String,
}

/// Extract the transcript from a recognizer JSON result
///
/// A missing or empty `text` field means nothing was recognized.
///
/// # Errors
///
/// Returns error if the payload is not JSON
pub fn parse_result_json(json: &str) -> Result<String> {
    let result: RecognitionResult = serde_json::from_str(json)?;
    Ok(result.text.trim().to_string())
}

/// Turns one fixed-length mono clip into text
pub trait SpeechRecognizer {
    /// Transcribe mono 16-bit samples recorded at `sample_rate`
    ///
    /// Returns an empty string when nothing was recognized.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails
    fn transcribe(&self, samples: &[i16], sample_rate: u32) -> Result<String>;
}

/// Recognizer backed by a Vosk model loaded once per session
#[cfg(feature = "vosk")]
pub struct VoskRecognizer {
    model: vosk::Model,
}

#[cfg(feature = "vosk")]
impl VoskRecognizer {
    /// Load a model directory
    ///
    /// # Errors
    ///
    /// Returns `BackendUnavailable` if the model cannot be loaded
    pub fn load(model_path: &Path) -> Result<Self> {
        let path = model_path.to_str().ok_or_else(|| {
            Error::BackendUnavailable(format!("model path is not UTF-8: {}", model_path.display()))
        })?;

        let model = vosk::Model::new(path).ok_or_else(|| {
            Error::BackendUnavailable(format!("failed to load Vosk model from {path}"))
        })?;

        tracing::info!(path, "speech recognition model loaded");
        Ok(Self { model })
    }
}

#[cfg(feature = "vosk")]
#[allow(clippy::cast_precision_loss)]
impl SpeechRecognizer for VoskRecognizer {
    fn transcribe(&self, samples: &[i16], sample_rate: u32) -> Result<String> {
        let mut recognizer = vosk::Recognizer::new(&self.model, sample_rate as f32)
            .ok_or_else(|| Error::Stt("failed to create recognizer".to_string()))?;

        recognizer
            .accept_waveform(samples)
            .map_err(|e| Error::Stt(format!("recognizer rejected audio: {e:?}")))?;

        let text = recognizer
            .final_result()
            .single()
            .map(|r| r.text.trim().to_string())
            .unwrap_or_default();

        tracing::debug!(transcript = %text, "transcription complete");
        Ok(text)
    }
}

/// Recognizer that shells out to an external program
///
/// The program receives the WAV path as its last argument and the model
/// directory in `VOSK_MODEL_PATH`, and prints a JSON object with a `text` field.
///
/// Each clip starts a new process, so the model is not kept loaded between
/// turns. Used only when `VoskRecognizer` is not compiled in or fails to load.
pub struct CommandRecognizer {
    program: PathBuf,
    args: Vec<String>,
    model_path: PathBuf,
}

impl CommandRecognizer {
    /// Parse a command line such as `vosk-transcribe --json`
    ///
    /// # Errors
    ///
    /// Returns `BackendUnavailable` if the command is empty or not installed
    pub fn new(command: &str, model_path: &Path) -> Result<Self> {
        let mut parts = command.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| Error::BackendUnavailable("recognizer command is empty".to_string()))?;

        let program = which::which(name).map_err(|e| {
            Error::BackendUnavailable(format!("recognizer command `{name}` not found: {e}"))
        })?;

        Ok(Self {
            program,
            args: parts.map(ToString::to_string).collect(),
            model_path: model_path.to_path_buf(),
        })
    }
}

impl SpeechRecognizer for CommandRecognizer {
    fn transcribe(&self, samples: &[i16], sample_rate: u32) -> Result<String> {
        let wav = samples_to_wav(samples, sample_rate)?;
        let file = tempfile::Builder::new()
            .prefix("reachy-kiosk-")
            .suffix(".wav")
            .tempfile()?;
        std::fs::write(file.path(), wav)?;

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(file.path())
            .env("VOSK_MODEL_PATH", &self.model_path)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Stt(format!(
                "recognizer exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json = stdout.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("{}");
        let text = parse_result_json(json)?;

        tracing::debug!(transcript = %text, "transcription complete");
        Ok(text)
    }
}

/// Build the recognizer configured for this session
///
/// The in-process Vosk backend is preferred whenever it is compiled in; the
/// configured command is used only when it is not, or when the model fails
/// to load in-process.
///
/// # Errors
///
/// Returns `BackendUnavailable` if the model directory is missing or no
/// backend can be constructed
pub fn load_recognizer(
    model_path: &Path,
    command: Option<&str>,
) -> Result<Box<dyn SpeechRecognizer>> {
    if !model_path.is_dir() {
        return Err(Error::BackendUnavailable(format!(
            "speech model not found at {}; download it or set VOSK_MODEL_PATH",
            model_path.display()
        )));
    }

    #[cfg(feature = "vosk")]
    match VoskRecognizer::load(model_path) {
        Ok(recognizer) => return Ok(Box::new(recognizer)),
        Err(e) if command.is_some() => {
            tracing::warn!(error = %e, "in-process recognizer failed, using recognizer command");
        }
        Err(e) => return Err(e),
    }

    match command {
        Some(command) => {
            tracing::info!(command, "using external recognizer command");
            Ok(Box::new(CommandRecognizer::new(command, model_path)?))
        }
        None => Err(Error::BackendUnavailable(
            "built without the `vosk` feature and no recognizer command configured".to_string(),
        )),
    }
}
