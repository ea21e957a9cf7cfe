//! Audio integration tests
//!
//! Exercises device resolution, mic analysis and sample conversion without
//! audio hardware

use std::cell::RefCell;

use reachy_kiosk::audio::{
    OutputVerifier, SAMPLE_RATE, Verdict, analyze, decode_wav_bytes, dsp, peak, samples_to_wav,
};
use reachy_kiosk::config::AudioConfig;
use reachy_kiosk::{AudioDevice, DeviceResolver, DeviceSelection, Direction, Error, Result};

mod common;
use common::device;

/// Verifier that fails a fixed set of device indices
struct ScriptedVerifier {
    failing: Vec<usize>,
    attempts: RefCell<Vec<usize>>,
}

impl ScriptedVerifier {
    fn new(failing: &[usize]) -> Self {
        Self {
            failing: failing.to_vec(),
            attempts: RefCell::new(Vec::new()),
        }
    }
}

impl OutputVerifier for ScriptedVerifier {
    fn verify(&self, device: &AudioDevice) -> Result<()> {
        self.attempts.borrow_mut().push(device.index);
        if self.failing.contains(&device.index) {
            Err(Error::Audio(format!("cannot open {}", device.name)))
        } else {
            Ok(())
        }
    }
}

/// Generate a sine tone as i16 samples
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn sine_i16(frequency: f32, seconds: f32, amplitude: f32) -> Vec<i16> {
    let count = (SAMPLE_RATE as f32 * seconds) as usize;
    (0..count)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            (amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()) as i16
        })
        .collect()
}

#[test]
fn test_single_robot_device_serves_both_directions() {
    let devices = vec![device(0, "Reachy Mini Audio", 2, 2)];
    let keywords = ["reachy mini audio", "reachy"];

    assert_eq!(DeviceResolver::resolve(&devices, Direction::Input, &keywords), Some(0));
    assert_eq!(DeviceResolver::resolve(&devices, Direction::Output, &keywords), Some(0));
}

#[test]
fn test_robot_device_resolves_both_directions() {
    let devices = vec![
        device(0, "HDA Intel PCH: ALC257 Analog", 2, 2),
        device(1, "Reachy Mini Audio", 2, 2),
    ];
    let resolver = DeviceResolver::new(&AudioConfig::default());
    let verifier = ScriptedVerifier::new(&[]);

    let selection = resolver.select(&devices, &verifier);
    assert_eq!(
        selection,
        DeviceSelection {
            input_index: Some(1),
            output_index: Some(1),
        }
    );
    assert_eq!(*verifier.attempts.borrow(), vec![1]);
}

#[test]
fn test_no_robot_uses_system_default() {
    let devices = vec![device(0, "HDA Intel PCH", 2, 2), device(1, "USB Headset", 1, 2)];
    let resolver = DeviceResolver::new(&AudioConfig::default());
    let verifier = ScriptedVerifier::new(&[]);

    assert_eq!(resolver.select(&devices, &verifier), DeviceSelection::default());
    assert!(verifier.attempts.borrow().is_empty());
}

#[test]
fn test_failed_speaker_falls_back_to_alternate() {
    let devices = vec![
        device(0, "Built-in Audio", 2, 2),
        device(1, "Output (Reachy Mini Audio)", 0, 2),
        device(2, "Reachy Mini Audio", 2, 2),
    ];
    let resolver = DeviceResolver::new(&AudioConfig::default());
    let verifier = ScriptedVerifier::new(&[1]);

    let selection = resolver.select(&devices, &verifier);
    assert_eq!(selection.input_index, Some(2));
    assert_eq!(selection.output_index, Some(2));
    assert_eq!(*verifier.attempts.borrow(), vec![1, 2]);
}

#[test]
fn test_failed_speaker_without_alternate_is_default() {
    let devices = vec![
        device(0, "Built-in Audio", 2, 2),
        device(1, "Reachy Mini Audio", 2, 2),
    ];
    let resolver = DeviceResolver::new(&AudioConfig::default());
    let verifier = ScriptedVerifier::new(&[1]);

    let selection = resolver.select(&devices, &verifier);
    assert_eq!(selection.input_index, Some(1));
    assert_eq!(selection.output_index, None);
}

#[test]
fn test_verification_disabled_keeps_keyword_match() {
    let devices = vec![device(0, "Reachy Mini Audio", 2, 2)];
    let config = AudioConfig {
        verify_output: false,
        ..AudioConfig::default()
    };
    let verifier = ScriptedVerifier::new(&[0]);

    let selection = DeviceResolver::new(&config).select(&devices, &verifier);
    assert_eq!(selection.output_index, Some(0));
    assert!(verifier.attempts.borrow().is_empty());
}

#[test]
fn test_custom_keywords_take_priority() {
    let devices = vec![
        device(0, "Reachy Mini Audio", 2, 2),
        device(1, "Jabra Speak 510", 1, 2),
    ];
    let config = AudioConfig {
        mic_keywords: vec!["jabra".to_string(), "reachy".to_string()],
        ..AudioConfig::default()
    };

    assert_eq!(
        DeviceResolver::resolve(&devices, Direction::Input, &config.mic_keywords),
        Some(1)
    );
}

#[test]
fn test_probe_silent_clip() {
    let report = analyze(&vec![0_i16; 32000]);
    assert_eq!(report.peak, 0);
    assert_eq!(report.verdict, Verdict::Silent);
}

#[test]
fn test_probe_working_clip() {
    let mut clip = vec![0_i16; 32000];
    clip[100] = 5000;
    clip[200] = -4000;

    let report = analyze(&clip);
    assert_eq!(report.peak, 5000);
    assert_eq!(report.verdict, Verdict::Working);
}

#[test]
fn test_probe_weak_tone() {
    let tone = sine_i16(440.0, 0.5, 500.0);
    let report = analyze(&tone);
    assert_eq!(report.verdict, Verdict::Weak);
    assert!(report.rms > 300.0 && report.rms < 400.0, "rms {}", report.rms);
}

#[test]
fn test_peak_bounds() {
    assert_eq!(peak(&[]), 0);
    assert_eq!(peak(&[i16::MIN, 1]), 32768);
    assert_eq!(peak(&[-7, 3]), 7);
}

#[test]
fn test_captured_clip_wav_roundtrip() {
    let tone = sine_i16(440.0, 0.25, 8000.0);
    let wav = samples_to_wav(&tone, SAMPLE_RATE).unwrap();

    let pcm = decode_wav_bytes(&wav).unwrap();
    assert_eq!(pcm.channels, 1);
    assert_eq!(pcm.sample_rate, SAMPLE_RATE);
    assert_eq!(pcm.frames(), tone.len());
    let decoded = dsp::to_i16(&pcm.samples);
    assert!(
        decoded
            .iter()
            .zip(&tone)
            .all(|(a, b)| (i32::from(*a) - i32::from(*b)).abs() <= 1)
    );
}

#[test]
fn test_decode_rejects_garbage() {
    assert!(decode_wav_bytes(b"not a wav file").is_err());
}

#[test]
fn test_resample_device_rate_to_recognizer_rate() {
    let input = vec![0.25_f32; 48000];
    let output = dsp::resample(&input, 48000, SAMPLE_RATE).unwrap();

    assert!((15_900..=16_000).contains(&output.len()), "len {}", output.len());
    let middle = &output[4000..12000];
    assert!(middle.iter().all(|s| (s - 0.25).abs() < 0.01));
}

#[test]
fn test_stereo_capture_pipeline() {
    let stereo: Vec<f32> = (0..4800).flat_map(|_| [0.5_f32, 0.0]).collect();

    let mut mono = dsp::downmix(&stereo, 2);
    assert_eq!(mono.len(), 4800);

    dsp::fit_length(&mut mono, 4000);
    assert_eq!(mono.len(), 4000);
    assert!(dsp::to_i16(&mono).iter().all(|&s| s == 8191 || s == 8192));
}
