//! Text-to-speech (TTS) through a local espeak-ng/espeak binary

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::audio::{DeviceCatalog, play_wav};
use crate::{Error, Result};

/// Synthesizers searched when none is configured, in order
const SYNTHESIZER_CANDIDATES: &[&str] = &["espeak-ng", "espeak"];

/// Find the synthesizer binary
///
/// # Errors
///
/// Returns `BackendUnavailable` if no synthesizer is installed
pub fn locate_synthesizer(configured: Option<&str>) -> Result<PathBuf> {
    if let Some(name) = configured {
        return which::which(name).map_err(|e| {
            Error::BackendUnavailable(format!("speech synthesizer `{name}` not found: {e}"))
        });
    }

    SYNTHESIZER_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or_else(|| {
            Error::BackendUnavailable(format!(
                "no speech synthesizer found (tried {})",
                SYNTHESIZER_CANDIDATES.join(", ")
            ))
        })
}

/// One synthesis engine; each utterance gets a fresh process
#[derive(Debug, Clone)]
pub struct SpeechSynthesizer {
    binary: PathBuf,
    rate: u32,
    voice: Option<String>,
}

impl SpeechSynthesizer {
    /// Create an engine bound to a binary
    #[must_use]
    pub const fn new(binary: PathBuf, rate: u32, voice: Option<String>) -> Self {
        Self {
            binary,
            rate,
            voice,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-s").arg(self.rate.to_string());
        if let Some(voice) = &self.voice {
            cmd.arg("-v").arg(voice);
        }
        cmd
    }

    fn run(mut cmd: Command) -> Result<()> {
        let output = cmd.output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(Error::Tts(format!(
                "synthesizer exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }

    /// Render `text` to a WAV file at the synthesizer's native rate
    ///
    /// # Errors
    ///
    /// Returns error if the synthesizer fails
    pub fn render_to_wav(&self, text: &str, path: &Path) -> Result<()> {
        let mut cmd = self.command();
        cmd.arg("-w").arg(path).arg("--").arg(text);
        Self::run(cmd)?;

        tracing::trace!(path = %path.display(), chars = text.len(), "speech rendered");
        Ok(())
    }

    /// Speak `text` straight to the system default output
    ///
    /// # Errors
    ///
    /// Returns error if the synthesizer fails
    pub fn speak_default(&self, text: &str) -> Result<()> {
        let mut cmd = self.command();
        cmd.arg("--").arg(text);
        Self::run(cmd)
    }
}

/// Where spoken output ends up
pub trait SpeechOutput {
    /// Speak `text` through the output device at `index`
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or playback fails
    fn speak_on_device(&self, text: &str, index: usize) -> Result<()>;

    /// Speak `text` through the system default output
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    fn speak_default(&self, text: &str) -> Result<()>;
}

/// espeak rendering played back through cpal
pub struct EspeakOutput {
    catalog: DeviceCatalog,
    engine: SpeechSynthesizer,
}

impl EspeakOutput {
    /// Bind a synthesizer to a device catalog
    #[must_use]
    pub fn new(catalog: DeviceCatalog, engine: SpeechSynthesizer) -> Self {
        Self { catalog, engine }
    }
}

impl SpeechOutput for EspeakOutput {
    fn speak_on_device(&self, text: &str, index: usize) -> Result<()> {
        let file = tempfile::Builder::new()
            .prefix("reachy-kiosk-")
            .suffix(".wav")
            .tempfile()?;
        self.engine.render_to_wav(text, file.path())?;
        play_wav(&self.catalog, Some(index), file.path())
    }

    fn speak_default(&self, text: &str) -> Result<()> {
        self.engine.speak_default(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args() {
        let engine =
            SpeechSynthesizer::new(PathBuf::from("espeak-ng"), 165, Some("en-us".to_string()));
        let cmd = engine.command();
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["-s", "165", "-v", "en-us"]);
    }

    #[test]
    fn test_missing_configured_synthesizer() {
        let result = locate_synthesizer(Some("definitely-not-a-synthesizer-binary"));
        assert!(matches!(result, Err(Error::BackendUnavailable(_))));
    }
}
