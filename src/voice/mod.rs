//! Voice processing module
//!
//! Offline speech recognition and synthesis on top of the resolved audio
//! devices. Everything here blocks the caller.

mod session;
pub mod stt;
pub mod tts;

pub use session::VoiceSession;
pub use stt::{CommandRecognizer, SpeechRecognizer, load_recognizer, parse_result_json};
#[cfg(feature = "vosk")]
pub use stt::VoskRecognizer;
pub use tts::{EspeakOutput, SpeechOutput, SpeechSynthesizer, locate_synthesizer};

use crate::Result;

/// Source of spoken learner input
pub trait Listener {
    /// Record one window and return the recognized text (possibly empty)
    ///
    /// # Errors
    ///
    /// Returns error if capture or recognition fails
    fn listen(&self) -> Result<String>;
}

impl Listener for VoiceSession {
    fn listen(&self) -> Result<String> {
        Self::listen(self)
    }
}
