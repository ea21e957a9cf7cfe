//! Fixed-window audio capture from a selected microphone

use std::sync::{Arc, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SampleRate, SizedSample, Stream, StreamConfig};

use super::catalog::{DeviceCatalog, Direction};
use super::dsp;
use crate::{Error, Result};

/// Sample rate for speech capture (16kHz for the recognizer)
pub const SAMPLE_RATE: u32 = 16000;

/// Captures audio from one input device
pub struct AudioCapture {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    buffer: Arc<Mutex<Vec<f32>>>,
    stream: Option<Stream>,
}

impl AudioCapture {
    /// Open an input device by catalog index, or the default when `None`
    ///
    /// Prefers a mono config that runs natively at `sample_rate`; otherwise
    /// records at the device default and converts afterwards.
    ///
    /// # Errors
    ///
    /// Returns error if audio device cannot be opened
    pub fn open(catalog: &DeviceCatalog, index: Option<usize>, sample_rate: u32) -> Result<Self> {
        let device = catalog.open(index, Direction::Input)?;

        let rate = SampleRate(sample_rate);
        let ranges: Vec<_> = device
            .supported_input_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .filter(|c| is_capturable(c.sample_format()))
            .filter(|c| c.min_sample_rate() <= rate && c.max_sample_rate() >= rate)
            .collect();

        let native = ranges
            .iter()
            .find(|c| c.channels() == 1)
            .or_else(|| ranges.first())
            .cloned()
            .map(|c| c.with_sample_rate(rate));

        let supported = match native {
            Some(config) => config,
            None => device
                .default_input_config()
                .map_err(|e| Error::Audio(e.to_string()))?,
        };

        let sample_format = supported.sample_format();
        if !is_capturable(sample_format) {
            return Err(Error::Audio(format!(
                "unsupported input sample format: {sample_format:?}"
            )));
        }
        let config = supported.config();

        tracing::debug!(
            device = %device.name().unwrap_or_default(),
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            ?sample_format,
            "audio capture initialized"
        );

        Ok(Self {
            device,
            config,
            sample_format,
            buffer: Arc::new(Mutex::new(Vec::new())),
            stream: None,
        })
    }

    /// Start capturing audio
    ///
    /// # Errors
    ///
    /// Returns error if capture fails
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let stream = match self.sample_format {
            SampleFormat::F32 => self.build_stream::<f32>()?,
            SampleFormat::I16 => self.build_stream::<i16>()?,
            SampleFormat::I32 => self.build_stream::<i32>()?,
            SampleFormat::U16 => self.build_stream::<u16>()?,
            other => {
                return Err(Error::Audio(format!(
                    "unsupported input sample format: {other:?}"
                )));
            }
        };

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        self.stream = Some(stream);

        tracing::debug!("audio capture started");
        Ok(())
    }

    fn build_stream<T>(&self) -> Result<Stream>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let buffer = Arc::clone(&self.buffer);

        self.device
            .build_input_stream(
                &self.config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend(data.iter().map(|&s| f32::from_sample(s)));
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))
    }

    /// Stop capturing audio
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            tracing::debug!("audio capture stopped");
        }
    }

    /// Get captured interleaved samples and clear the buffer
    #[must_use]
    pub fn take_buffer(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }

    /// Clear the audio buffer
    pub fn clear_buffer(&self) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
    }

    /// Native stream sample rate
    #[must_use]
    pub const fn device_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Native stream channel count
    #[must_use]
    pub const fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Record for exactly `duration`, returning mono 16-bit samples at
    /// `sample_rate`
    ///
    /// Blocks the calling thread for the whole window. The result always has
    /// `sample_rate * duration` samples; a short device buffer is padded with
    /// silence.
    ///
    /// # Errors
    ///
    /// Returns error if the stream fails or conversion fails
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn record(&mut self, duration: Duration, sample_rate: u32) -> Result<Vec<i16>> {
        self.clear_buffer();
        self.start()?;
        std::thread::sleep(duration);
        self.stop();

        let raw = self.take_buffer();
        let mono = dsp::downmix(&raw, usize::from(self.channels()));
        let mut samples = dsp::resample(&mono, self.device_rate(), sample_rate)?;

        let frames = (f64::from(sample_rate) * duration.as_secs_f64()).round() as usize;
        dsp::fit_length(&mut samples, frames);

        tracing::trace!(captured = raw.len(), frames, "recording complete");
        Ok(dsp::to_i16(&samples))
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

const fn is_capturable(format: SampleFormat) -> bool {
    matches!(
        format,
        SampleFormat::F32 | SampleFormat::I16 | SampleFormat::I32 | SampleFormat::U16
    )
}

/// Record a fixed-length mono clip from a device
///
/// # Errors
///
/// Returns error if the device cannot be opened or recording fails
pub fn record_clip(
    catalog: &DeviceCatalog,
    index: Option<usize>,
    sample_rate: u32,
    duration: Duration,
) -> Result<Vec<i16>> {
    let mut capture = AudioCapture::open(catalog, index, sample_rate)?;
    capture.record(duration, sample_rate)
}

/// Records fixed-length mono clips from a device index
pub trait ClipRecorder {
    /// Record `duration` of mono 16-bit audio at `sample_rate`
    ///
    /// `None` records from the system default input.
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be opened or recording fails
    fn record(
        &self,
        index: Option<usize>,
        sample_rate: u32,
        duration: Duration,
    ) -> Result<Vec<i16>>;
}

impl ClipRecorder for DeviceCatalog {
    fn record(
        &self,
        index: Option<usize>,
        sample_rate: u32,
        duration: Duration,
    ) -> Result<Vec<i16>> {
        record_clip(self, index, sample_rate, duration)
    }
}

/// Encode mono 16-bit samples as WAV bytes
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_to_wav_header() {
        let wav = samples_to_wav(&[0, 1000, -1000, 32767], SAMPLE_RATE).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + 8);
    }

    #[test]
    fn test_wav_roundtrip_keeps_spec() {
        let wav = samples_to_wav(&[1, 2, 3], SAMPLE_RATE).unwrap();
        let reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, SAMPLE_RATE);
        assert_eq!(spec.channels, 1);
        assert_eq!(reader.len(), 3);
    }
}
