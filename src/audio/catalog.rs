//! Audio device enumeration

use std::fmt::Write;

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};
use serde::Serialize;

use crate::{Error, Result};

/// Stream direction of an audio device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Capture (microphone)
    Input,
    /// Playback (speaker)
    Output,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
        }
    }
}

/// Snapshot of one audio device
///
/// The index is only meaningful within the catalog query that produced it;
/// hosts may renumber devices between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioDevice {
    /// Position in the host's device list
    pub index: usize,

    /// Human-readable device name
    pub name: String,

    /// Maximum capture channels (0 if the device cannot record)
    pub max_input_channels: u16,

    /// Maximum playback channels (0 if the device cannot play)
    pub max_output_channels: u16,

    /// Default sample rate in Hz (0 if unknown)
    pub default_sample_rate: u32,
}

impl AudioDevice {
    /// Channel count for a direction
    #[must_use]
    pub const fn channels(&self, direction: Direction) -> u16 {
        match direction {
            Direction::Input => self.max_input_channels,
            Direction::Output => self.max_output_channels,
        }
    }

    /// Whether the device can stream in a direction
    #[must_use]
    pub const fn supports(&self, direction: Direction) -> bool {
        self.channels(direction) > 0
    }

    /// Case-insensitive name match
    #[must_use]
    pub fn name_contains(&self, keyword: &str) -> bool {
        self.name.to_lowercase().contains(&keyword.to_lowercase())
    }
}

/// Enumerates devices on the default audio host
pub struct DeviceCatalog {
    host: Host,
}

impl Default for DeviceCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceCatalog {
    /// Create a catalog over the platform's default host
    #[must_use]
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    /// Snapshot all devices visible to the host, in host order
    ///
    /// # Errors
    ///
    /// Returns `Error::AudioBackend` if the host cannot be queried
    pub fn enumerate(&self) -> Result<Vec<AudioDevice>> {
        let devices = self
            .host
            .devices()
            .map_err(|e| Error::AudioBackend(e.to_string()))?;

        let snapshot: Vec<AudioDevice> = devices
            .enumerate()
            .map(|(index, device)| describe(index, &device))
            .collect();

        tracing::debug!(
            host = ?self.host.id(),
            count = snapshot.len(),
            "enumerated audio devices"
        );

        Ok(snapshot)
    }

    /// Open the device at an index from the current host listing
    ///
    /// # Errors
    ///
    /// Returns error if the host cannot be queried or the index is gone
    pub fn device(&self, index: usize) -> Result<Device> {
        self.host
            .devices()
            .map_err(|e| Error::AudioBackend(e.to_string()))?
            .nth(index)
            .ok_or_else(|| Error::Audio(format!("no audio device at index {index}")))
    }

    /// Open a device for a direction, falling back to the host default
    ///
    /// # Errors
    ///
    /// Returns error if the indexed device is gone or no default exists
    pub fn open(&self, index: Option<usize>, direction: Direction) -> Result<Device> {
        if let Some(index) = index {
            return self.device(index);
        }

        let default = match direction {
            Direction::Input => self.host.default_input_device(),
            Direction::Output => self.host.default_output_device(),
        };
        default.ok_or_else(|| Error::Audio(format!("no default {direction} device available")))
    }
}

fn describe(index: usize, device: &Device) -> AudioDevice {
    let name = device.name().unwrap_or_else(|_| format!("device {index}"));

    let max_input_channels = device
        .supported_input_configs()
        .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
        .unwrap_or(0);

    let max_output_channels = device
        .supported_output_configs()
        .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
        .unwrap_or(0);

    let default_sample_rate = device
        .default_input_config()
        .or_else(|_| device.default_output_config())
        .map(|c| c.sample_rate().0)
        .unwrap_or(0);

    AudioDevice {
        index,
        name,
        max_input_channels,
        max_output_channels,
        default_sample_rate,
    }
}

/// Render the device listing shown at startup
#[must_use]
pub fn render_listing(devices: &[AudioDevice]) -> String {
    let mut out = String::new();
    let rule = "-".repeat(60);
    let _ = writeln!(out, "  {rule}");
    for device in devices {
        let mut tags = Vec::new();
        if device.supports(Direction::Input) {
            tags.push("mic");
        }
        if device.supports(Direction::Output) {
            tags.push("speaker");
        }
        let _ = writeln!(out, "    {}: {}  [{}]", device.index, device.name, tags.join(", "));
    }
    let _ = writeln!(out, "  {rule}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(index: usize, name: &str, ins: u16, outs: u16) -> AudioDevice {
        AudioDevice {
            index,
            name: name.to_string(),
            max_input_channels: ins,
            max_output_channels: outs,
            default_sample_rate: 48000,
        }
    }

    #[test]
    fn test_direction_channels() {
        let dev = device(0, "USB Mic", 1, 0);
        assert!(dev.supports(Direction::Input));
        assert!(!dev.supports(Direction::Output));
        assert_eq!(dev.channels(Direction::Input), 1);
    }

    #[test]
    fn test_name_contains_case_insensitive() {
        let dev = device(0, "Reachy Mini Audio", 2, 2);
        assert!(dev.name_contains("reachy mini"));
        assert!(dev.name_contains("MINI AUDIO"));
        assert!(!dev.name_contains("pollen"));
    }

    #[test]
    fn test_render_listing_tags() {
        let listing = render_listing(&[
            device(0, "Built-in Mic", 2, 0),
            device(1, "Reachy Mini Audio", 2, 2),
        ]);
        assert!(listing.contains("0: Built-in Mic  [mic]"));
        assert!(listing.contains("1: Reachy Mini Audio  [mic, speaker]"));
    }
}
