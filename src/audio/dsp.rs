//! Sample conversion helpers shared by capture and playback

use crate::{Error, Result};

/// Full-scale amplitude of a signed 16-bit sample
pub const I16_FULL_SCALE: f32 = 32767.0;

/// Average interleaved frames down to a single channel
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Repeat each mono sample across `channels` output slots
#[must_use]
pub fn fan_out(mono: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return mono.to_vec();
    }

    mono.iter()
        .flat_map(|&s| std::iter::repeat_n(s, channels))
        .collect()
}

/// Convert f32 samples in [-1.0, 1.0] to signed 16-bit
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s * I16_FULL_SCALE).clamp(-32768.0, I16_FULL_SCALE) as i16)
        .collect()
}

/// Convert signed 16-bit samples to f32
#[must_use]
pub fn from_i16(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| f32::from(s) / 32768.0).collect()
}

/// Convert signed 32-bit samples to f32
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn from_i32(samples: &[i32]) -> Vec<f32> {
    samples
        .iter()
        .map(|&s| (f64::from(s) / 2_147_483_648.0) as f32)
        .collect()
}

/// Pad with silence or truncate to exactly `len` samples
pub fn fit_length(samples: &mut Vec<f32>, len: usize) {
    samples.resize(len, 0.0);
}

/// Resample mono audio using rubato
///
/// The final partial chunk is zero-padded so no trailing audio is dropped;
/// the output is trimmed back to the expected length.
///
/// # Errors
///
/// Returns error if the resampler cannot be constructed or fails
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    use rubato::{FftFixedIn, Resampler};

    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let sub_chunks = 2;

    let mut resampler =
        FftFixedIn::<f64>::new(from_rate as usize, to_rate as usize, 1024, sub_chunks, 1)
            .map_err(|e| Error::Audio(format!("resampler init failed: {e}")))?;

    // The resampler rounds the chunk size to fit its FFT
    let chunk_size = resampler.input_frames_next();
    let delay = resampler.output_delay();

    let input: Vec<f64> = samples.iter().map(|&s| f64::from(s)).collect();
    let mut output = Vec::new();

    // One extra silent chunk flushes the resampler's delay line
    let flush = vec![0.0; chunk_size];
    for chunk in input.chunks(chunk_size).chain(std::iter::once(flush.as_slice())) {
        let mut block = chunk.to_vec();
        block.resize(chunk_size, 0.0);
        let result = resampler
            .process(&[block], None)
            .map_err(|e| Error::Audio(format!("resample failed: {e}")))?;
        output.extend_from_slice(&result[0]);
    }

    let expected =
        (samples.len() as f64 * f64::from(to_rate) / f64::from(from_rate)).round() as usize;
    output.drain(..delay.min(output.len()));
    output.truncate(expected);

    Ok(output.iter().map(|&s| s as f32).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_stereo() {
        let stereo = [0.5, -0.5, 1.0, 0.0];
        assert_eq!(downmix(&stereo, 2), vec![0.0, 0.5]);
        assert_eq!(downmix(&stereo, 1), stereo.to_vec());
    }

    #[test]
    fn test_fan_out() {
        assert_eq!(fan_out(&[0.1, 0.2], 2), vec![0.1, 0.1, 0.2, 0.2]);
    }

    #[test]
    fn test_i16_conversion_clamps() {
        assert_eq!(to_i16(&[0.0, 1.0, -1.0, 2.0]), vec![0, 32767, -32767, 32767]);
        let back = from_i16(&[0, -32768]);
        assert!((back[1] + 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_fit_length() {
        let mut samples = vec![1.0; 10];
        fit_length(&mut samples, 4);
        assert_eq!(samples.len(), 4);
        fit_length(&mut samples, 6);
        assert_eq!(samples, vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_resample_identity_rate() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample(&samples, 16000, 16000).unwrap(), samples);
    }

    #[test]
    fn test_resample_halves_length() {
        let samples = vec![0.0; 4800];
        let out = resample(&samples, 48000, 16000).unwrap();
        assert_eq!(out.len(), 1600);
    }
}
