//! Audio playback to a selected output device

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SampleRate, SizedSample, StreamConfig};

use super::catalog::{DeviceCatalog, Direction};
use super::dsp;
use crate::{Error, Result};

/// Decoded PCM audio, interleaved f32 in [-1.0, 1.0]
#[derive(Debug, Clone, PartialEq)]
pub struct Pcm {
    /// Interleaved samples
    pub samples: Vec<f32>,

    /// Channel count
    pub channels: u16,

    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl Pcm {
    /// Mono PCM from signed 16-bit samples
    #[must_use]
    pub fn from_i16(samples: &[i16], sample_rate: u32) -> Self {
        Self {
            samples: dsp::from_i16(samples),
            channels: 1,
            sample_rate,
        }
    }

    /// Number of frames (samples per channel)
    #[must_use]
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Playback length
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }
}

/// Decode a WAV file with 16-bit or 32-bit signed integer samples
///
/// # Errors
///
/// Returns error if the file cannot be read or uses another sample format
pub fn decode_wav(path: &Path) -> Result<Pcm> {
    let reader = hound::WavReader::open(path)?;
    decode_wav_reader(reader)
}

/// Decode WAV bytes held in memory
///
/// # Errors
///
/// Returns error if the bytes are not a supported WAV stream
pub fn decode_wav_bytes(bytes: &[u8]) -> Result<Pcm> {
    let reader = hound::WavReader::new(std::io::Cursor::new(bytes))?;
    decode_wav_reader(reader)
}

fn decode_wav_reader<R: std::io::Read>(mut reader: hound::WavReader<R>) -> Result<Pcm> {
    let spec = reader.spec();

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => {
            let raw = reader.samples::<i16>().collect::<std::result::Result<Vec<_>, _>>()?;
            dsp::from_i16(&raw)
        }
        (hound::SampleFormat::Int, 32) => {
            let raw = reader.samples::<i32>().collect::<std::result::Result<Vec<_>, _>>()?;
            dsp::from_i32(&raw)
        }
        (format, bits) => {
            return Err(Error::Audio(format!(
                "unsupported WAV format: {format:?} {bits}-bit"
            )));
        }
    };

    Ok(Pcm {
        samples,
        channels: spec.channels,
        sample_rate: spec.sample_rate,
    })
}

/// Plays audio to one output device
pub struct AudioPlayback {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
}

impl AudioPlayback {
    /// Open an output device by catalog index, or the default when `None`
    ///
    /// Picks a stream config whose rate range covers `preferred_rate`, so
    /// most sources play without resampling.
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be opened or has no usable config
    pub fn open(
        catalog: &DeviceCatalog,
        index: Option<usize>,
        preferred_rate: u32,
    ) -> Result<Self> {
        let device = catalog.open(index, Direction::Output)?;

        let rate = SampleRate(preferred_rate);
        let supported = device
            .supported_output_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .filter(|c| is_playable(c.sample_format()))
            .filter(|c| c.channels() <= 2)
            .find(|c| c.min_sample_rate() <= rate && c.max_sample_rate() >= rate)
            .map(|c| c.with_sample_rate(rate));

        let supported = match supported {
            Some(config) => config,
            None => device
                .default_output_config()
                .map_err(|e| Error::Audio(e.to_string()))?,
        };

        let sample_format = supported.sample_format();
        if !is_playable(sample_format) {
            return Err(Error::Audio(format!(
                "unsupported output sample format: {sample_format:?}"
            )));
        }
        let config = supported.config();

        tracing::debug!(
            device = %device.name().unwrap_or_default(),
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            ?sample_format,
            "audio playback initialized"
        );

        Ok(Self {
            device,
            config,
            sample_format,
        })
    }

    /// Stream sample rate in Hz
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Stream channel count
    #[must_use]
    pub const fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Play PCM audio and block until it has been rendered
    ///
    /// # Errors
    ///
    /// Returns error if conversion, stream construction or playback fails
    pub fn play(&self, pcm: &Pcm) -> Result<()> {
        let samples = self.prepare(pcm)?;
        if samples.is_empty() {
            return Ok(());
        }

        match self.sample_format {
            SampleFormat::F32 => self.play_blocking::<f32>(samples),
            SampleFormat::I16 => self.play_blocking::<i16>(samples),
            SampleFormat::I32 => self.play_blocking::<i32>(samples),
            SampleFormat::U16 => self.play_blocking::<u16>(samples),
            other => Err(Error::Audio(format!(
                "unsupported output sample format: {other:?}"
            ))),
        }
    }

    /// Play signed 16-bit samples
    ///
    /// # Errors
    ///
    /// Returns error if playback fails
    pub fn play_i16(&self, samples: &[i16], sample_rate: u32) -> Result<()> {
        self.play(&Pcm::from_i16(samples, sample_rate))
    }

    /// Convert source PCM to the stream's channel layout and rate
    fn prepare(&self, pcm: &Pcm) -> Result<Vec<f32>> {
        let device_channels = usize::from(self.config.channels);
        let source_channels = usize::from(pcm.channels.max(1));

        if source_channels == device_channels && pcm.sample_rate == self.sample_rate() {
            return Ok(pcm.samples.clone());
        }

        let mono = dsp::downmix(&pcm.samples, source_channels);
        let mono = dsp::resample(&mono, pcm.sample_rate, self.sample_rate())?;
        Ok(dsp::fan_out(&mono, device_channels))
    }

    fn play_blocking<T>(&self, samples: Vec<f32>) -> Result<()>
    where
        T: SizedSample + FromSample<f32>,
    {
        let total = samples.len();
        let finished = Arc::new(AtomicBool::new(false));
        let stream_error: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        let finished_cb = Arc::clone(&finished);
        let error_cb = Arc::clone(&stream_error);
        let mut position = 0usize;

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    for out in data.iter_mut() {
                        let sample = samples.get(position).copied().unwrap_or(0.0);
                        *out = T::from_sample(sample);
                        position += 1;
                    }
                    if position >= samples.len() {
                        finished_cb.store(true, Ordering::SeqCst);
                    }
                },
                move |err| {
                    tracing::error!(error = %err, "audio playback error");
                    if let Ok(mut slot) = error_cb.lock() {
                        *slot = Some(err.to_string());
                    }
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        let frames = total / usize::from(self.config.channels.max(1));
        let duration_ms = (frames as u64 * 1000) / u64::from(self.sample_rate().max(1));

        // Poll for completion with timeout
        let start = Instant::now();
        let timeout = Duration::from_millis(duration_ms + 500);

        while !finished.load(Ordering::SeqCst) {
            if start.elapsed() > timeout {
                tracing::warn!(elapsed_ms = start.elapsed().as_millis(), "playback timed out");
                break;
            }
            if stream_error.lock().map(|e| e.is_some()).unwrap_or(false) {
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }

        // Let the device drain its last buffer
        std::thread::sleep(Duration::from_millis(100));
        drop(stream);

        if let Some(err) = stream_error.lock().ok().and_then(|mut e| e.take()) {
            return Err(Error::Audio(err));
        }

        tracing::debug!(samples = total, "playback complete");
        Ok(())
    }
}

const fn is_playable(format: SampleFormat) -> bool {
    matches!(
        format,
        SampleFormat::F32 | SampleFormat::I16 | SampleFormat::I32 | SampleFormat::U16
    )
}

/// Play a WAV file through an output device
///
/// # Errors
///
/// Returns error if the file cannot be decoded or played
pub fn play_wav(catalog: &DeviceCatalog, index: Option<usize>, path: &Path) -> Result<()> {
    let pcm = decode_wav(path)?;
    let playback = AudioPlayback::open(catalog, index, pcm.sample_rate)?;
    playback.play(&pcm)
}
