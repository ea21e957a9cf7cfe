//! Microphone signal-level diagnostics

use std::time::Duration;

use serde::Serialize;

use super::capture::record_clip;
use super::catalog::DeviceCatalog;
use crate::Result;

/// Peak below which a clip counts as silence (out of 32767)
pub const SILENT_PEAK: u32 = 100;

/// Peak below which a clip counts as weak (out of 32767)
pub const WEAK_PEAK: u32 = 1000;

/// Default probe recording length
pub const PROBE_DURATION: Duration = Duration::from_secs(2);

/// Coarse signal-level verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Almost nothing picked up; likely the wrong device or a dead mic
    Silent,
    /// Sound detected but quiet; recognition may struggle
    Weak,
    /// Clear signal
    Working,
}

impl Verdict {
    /// Classify a peak amplitude
    #[must_use]
    pub const fn from_peak(peak: u32) -> Self {
        if peak < SILENT_PEAK {
            Self::Silent
        } else if peak < WEAK_PEAK {
            Self::Weak
        } else {
            Self::Working
        }
    }
}

/// Levels measured over one clip
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbeReport {
    /// Peak absolute amplitude
    pub peak: u32,

    /// Root-mean-square amplitude
    pub rms: f64,

    /// Verdict derived from the peak
    pub verdict: Verdict,
}

/// Peak absolute amplitude of a clip
#[must_use]
pub fn peak(samples: &[i16]) -> u32 {
    samples
        .iter()
        .map(|&s| i32::from(s).unsigned_abs())
        .max()
        .unwrap_or(0)
}

/// Measure a clip
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn analyze(samples: &[i16]) -> ProbeReport {
    let peak = peak(samples);
    let rms = if samples.is_empty() {
        0.0
    } else {
        let sum_squares: f64 = samples.iter().map(|&s| f64::from(s).powi(2)).sum();
        (sum_squares / samples.len() as f64).sqrt()
    };

    ProbeReport {
        peak,
        rms,
        verdict: Verdict::from_peak(peak),
    }
}

/// Records a short clip and reports whether the microphone hears anything
pub struct MicrophoneProbe<'a> {
    catalog: &'a DeviceCatalog,
}

impl<'a> MicrophoneProbe<'a> {
    /// Create a probe bound to a catalog
    #[must_use]
    pub const fn new(catalog: &'a DeviceCatalog) -> Self {
        Self { catalog }
    }

    /// Record `duration` from a device and classify the signal
    ///
    /// Advisory only: `Silent` and `Weak` are logged as warnings, nothing
    /// else changes.
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot record
    pub fn probe(
        &self,
        device_index: Option<usize>,
        sample_rate: u32,
        duration: Duration,
    ) -> Result<ProbeReport> {
        let samples = record_clip(self.catalog, device_index, sample_rate, duration)?;
        let report = analyze(&samples);

        tracing::info!(peak = report.peak, rms = report.rms, "mic test levels (out of 32767)");
        match report.verdict {
            Verdict::Silent => tracing::warn!(concat!(
                "almost no sound detected; the mic may not be working ",
                "or the wrong device was selected"
            )),
            Verdict::Weak => tracing::warn!(concat!(
                "low volume detected; speech recognition may struggle, ",
                "try speaking closer to the mic"
            )),
            Verdict::Working => tracing::info!("mic is working, sound detected"),
        }

        Ok(report)
    }
}
