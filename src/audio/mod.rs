//! Audio devices: discovery, resolution, diagnostics, capture and playback
//!
//! All operations block the calling thread. cpal runs its callbacks on
//! internal threads, but every stream is dropped before the call returns.

mod capture;
mod catalog;
pub mod dsp;
mod playback;
mod probe;
mod resolver;

pub use capture::{AudioCapture, ClipRecorder, SAMPLE_RATE, record_clip, samples_to_wav};
pub use catalog::{AudioDevice, DeviceCatalog, Direction, render_listing};
pub use playback::{AudioPlayback, Pcm, decode_wav, decode_wav_bytes, play_wav};
pub use probe::{
    MicrophoneProbe, PROBE_DURATION, ProbeReport, SILENT_PEAK, Verdict, WEAK_PEAK, analyze, peak,
};
pub use resolver::{
    DeviceResolver, DeviceSelection, OutputVerifier, SilentToneVerifier, VERIFY_SAMPLE_RATE,
    VERIFY_SAMPLES,
};
