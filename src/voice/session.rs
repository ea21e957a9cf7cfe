//! Blocking listen/speak session bound to the resolved devices

use std::time::Duration;

use super::stt::{SpeechRecognizer, load_recognizer};
use super::tts::{EspeakOutput, SpeechOutput, SpeechSynthesizer, locate_synthesizer};
use crate::audio::{ClipRecorder, DeviceCatalog, DeviceSelection, SILENT_PEAK, peak};
use crate::config::Config;
use crate::{Error, Result};

/// Spoken interaction with one learner
///
/// The recognition model is loaded once and reused for every `listen()`;
/// every `speak()` starts a fresh synthesizer.
pub struct VoiceSession {
    selection: DeviceSelection,
    recorder: Box<dyn ClipRecorder>,
    recognizer: Box<dyn SpeechRecognizer>,
    output: Box<dyn SpeechOutput>,
    window: Duration,
    sample_rate: u32,
}

impl std::fmt::Debug for VoiceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceSession")
            .field("selection", &self.selection)
            .field("window", &self.window)
            .field("sample_rate", &self.sample_rate)
            .finish_non_exhaustive()
    }
}

impl VoiceSession {
    /// Start a session on the selected devices
    ///
    /// # Errors
    ///
    /// Returns `BackendUnavailable` if audio I/O, the recognizer, the model
    /// directory or the synthesizer is missing, and `Config` if the listening
    /// window is out of range
    pub fn new(config: &Config, selection: DeviceSelection) -> Result<Self> {
        let window = Duration::try_from_secs_f64(config.voice.record_seconds)
            .map_err(|e| Error::Config(format!("invalid listening window: {e}")))?;

        let catalog = DeviceCatalog::new();
        catalog
            .enumerate()
            .map_err(|e| Error::BackendUnavailable(format!("audio I/O unavailable: {e}")))?;

        let recognizer = load_recognizer(
            &config.voice.model_path,
            config.voice.recognizer_command.as_deref(),
        )?;
        let synthesizer = locate_synthesizer(config.voice.synthesizer.as_deref())?;

        tracing::info!(
            %selection,
            synthesizer = %synthesizer.display(),
            window_s = config.voice.record_seconds,
            "voice session ready"
        );

        let engine = SpeechSynthesizer::new(
            synthesizer,
            config.voice.tts_rate,
            config.voice.tts_voice.clone(),
        );

        Ok(Self::from_parts(
            selection,
            Box::new(DeviceCatalog::new()),
            recognizer,
            Box::new(EspeakOutput::new(catalog, engine)),
            window,
            config.voice.sample_rate,
        ))
    }

    /// Assemble a session from already-built backends
    #[must_use]
    pub fn from_parts(
        selection: DeviceSelection,
        recorder: Box<dyn ClipRecorder>,
        recognizer: Box<dyn SpeechRecognizer>,
        output: Box<dyn SpeechOutput>,
        window: Duration,
        sample_rate: u32,
    ) -> Self {
        Self {
            selection,
            recorder,
            recognizer,
            output,
            window,
            sample_rate,
        }
    }

    /// Record one fixed window and return the recognized text
    ///
    /// An empty string means nothing was recognized.
    ///
    /// # Errors
    ///
    /// Returns error if recording or recognition fails
    pub fn listen(&self) -> Result<String> {
        println!("Listening... (speak now, {:.0} seconds)", self.window.as_secs_f64());

        let samples =
            self.recorder.record(self.selection.input_index, self.sample_rate, self.window)?;

        let level = peak(&samples);
        tracing::info!(peak = level, "audio level (out of 32767)");
        if level < SILENT_PEAK {
            tracing::warn!(
                peak = level,
                "very low audio level, the mic may not be picking up sound"
            );
        }

        let text = self.recognizer.transcribe(&samples, self.sample_rate)?;
        let text = text.trim().to_string();
        if text.is_empty() {
            println!("Nothing recognised.");
        } else {
            println!("Heard: {text:?}");
        }
        Ok(text)
    }

    /// Speak `text`; failures are logged, never returned
    pub fn speak(&self, text: &str) {
        if let Some(index) = self.selection.output_index {
            match self.output.speak_on_device(text, index) {
                Ok(()) => return,
                Err(e) => tracing::warn!(
                    index,
                    error = %e,
                    "could not play on robot speaker, falling back to default output"
                ),
            }
        }

        if let Err(e) = self.output.speak_default(text) {
            tracing::error!(error = %e, "speech synthesis failed");
        }
    }
}
