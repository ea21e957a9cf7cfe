//! Keyword-priority device resolution and playback verification

use super::catalog::{AudioDevice, DeviceCatalog, Direction};
use super::playback::AudioPlayback;
use crate::config::AudioConfig;
use crate::Result;

/// Length of the silent buffer used to verify an output device
pub const VERIFY_SAMPLES: usize = 1000;

/// Sample rate of the verification buffer
pub const VERIFY_SAMPLE_RATE: u32 = 22050;

/// Chosen capture and playback devices; `None` means the system default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceSelection {
    /// Capture device index
    pub input_index: Option<usize>,

    /// Playback device index
    pub output_index: Option<usize>,
}

impl std::fmt::Display for DeviceSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |index: Option<usize>| {
            index.map_or_else(|| "default".to_string(), |i| format!("device {i}"))
        };
        write!(f, "mic={}, speaker={}", show(self.input_index), show(self.output_index))
    }
}

/// Checks that an output device can actually be opened for playback
pub trait OutputVerifier {
    /// Play a short test buffer through the device
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot play
    fn verify(&self, device: &AudioDevice) -> Result<()>;
}

/// Verifies output devices by playing a short silent buffer through them
pub struct SilentToneVerifier<'a> {
    catalog: &'a DeviceCatalog,
}

impl<'a> SilentToneVerifier<'a> {
    /// Create a verifier bound to a catalog
    #[must_use]
    pub const fn new(catalog: &'a DeviceCatalog) -> Self {
        Self { catalog }
    }
}

impl OutputVerifier for SilentToneVerifier<'_> {
    fn verify(&self, device: &AudioDevice) -> Result<()> {
        let silence = vec![0_i16; VERIFY_SAMPLES];
        let playback = AudioPlayback::open(self.catalog, Some(device.index), VERIFY_SAMPLE_RATE)?;
        playback.play_i16(&silence, VERIFY_SAMPLE_RATE)
    }
}

/// Picks the robot's microphone and speaker from the device list
#[derive(Debug, Clone)]
pub struct DeviceResolver {
    input_keywords: Vec<String>,
    output_keywords: Vec<String>,
    fallback_keyword: String,
    verify_output: bool,
}

impl DeviceResolver {
    /// Create a resolver from audio configuration
    #[must_use]
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            input_keywords: config.mic_keywords.clone(),
            output_keywords: config.speaker_keywords.clone(),
            fallback_keyword: config.fallback_keyword.clone(),
            verify_output: config.verify_output,
        }
    }

    /// Resolve one direction against an ordered keyword list
    ///
    /// Keywords are tried in order and, for each, devices in catalog order;
    /// the first device whose name contains the keyword and that can stream
    /// in `direction` wins. Keyword priority dominates device order.
    #[must_use]
    pub fn resolve<S: AsRef<str>>(
        devices: &[AudioDevice],
        direction: Direction,
        priority_keywords: &[S],
    ) -> Option<usize> {
        priority_keywords.iter().find_map(|keyword| {
            devices
                .iter()
                .filter(|d| d.supports(direction))
                .find(|d| d.name_contains(keyword.as_ref()))
                .map(|d| d.index)
        })
    }

    /// Verify an output device, searching alternates on failure
    ///
    /// Alternates are every other output-capable device whose name contains
    /// `fallback_keyword`, in catalog order. Returns `None` (system default)
    /// when nothing verifies.
    pub fn verify_output<V: OutputVerifier + ?Sized>(
        devices: &[AudioDevice],
        index: usize,
        fallback_keyword: &str,
        verifier: &V,
    ) -> Option<usize> {
        let Some(chosen) = devices.iter().find(|d| d.index == index) else {
            tracing::warn!(index, "resolved speaker is no longer listed");
            return None;
        };

        match verifier.verify(chosen) {
            Ok(()) => {
                tracing::info!(
                    index,
                    name = %chosen.name,
                    "speaker device verified, playback works"
                );
                return Some(index);
            }
            Err(e) => {
                tracing::warn!(
                    index,
                    name = %chosen.name,
                    error = %e,
                    "speaker device failed verification, trying alternatives"
                );
            }
        }

        let alternate = devices
            .iter()
            .filter(|d| d.index != index)
            .filter(|d| d.supports(Direction::Output))
            .filter(|d| d.name_contains(fallback_keyword))
            .find(|d| match verifier.verify(d) {
                Ok(()) => true,
                Err(e) => {
                    tracing::debug!(index = d.index, error = %e, "alternative speaker failed");
                    false
                }
            });

        if let Some(device) = alternate {
            tracing::info!(index = device.index, name = %device.name, "alternative speaker found");
            Some(device.index)
        } else {
            tracing::warn!("no working robot speaker found, falling back to system default");
            None
        }
    }

    /// Resolve both directions and verify the speaker
    pub fn select<V: OutputVerifier + ?Sized>(
        &self,
        devices: &[AudioDevice],
        verifier: &V,
    ) -> DeviceSelection {
        let input_index = Self::resolve(devices, Direction::Input, &self.input_keywords);
        let mut output_index = Self::resolve(devices, Direction::Output, &self.output_keywords);

        match input_index.and_then(|i| devices.iter().find(|d| d.index == i)) {
            Some(dev) => tracing::info!(
                index = dev.index,
                name = %dev.name,
                channels = dev.max_input_channels,
                default_sr = dev.default_sample_rate,
                "robot mic detected"
            ),
            None => tracing::info!("robot mic not detected, using system default microphone"),
        }

        match output_index.and_then(|i| devices.iter().find(|d| d.index == i)) {
            Some(dev) => tracing::info!(
                index = dev.index,
                name = %dev.name,
                channels = dev.max_output_channels,
                default_sr = dev.default_sample_rate,
                "robot speaker detected"
            ),
            None => tracing::info!("robot speaker not detected, using system default speaker"),
        }

        if self.verify_output {
            if let Some(index) = output_index {
                output_index =
                    Self::verify_output(devices, index, &self.fallback_keyword, verifier);
            }
        }

        DeviceSelection {
            input_index,
            output_index,
        }
    }
}
