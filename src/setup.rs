//! Interactive setup wizard (`reachy-kiosk setup`)

use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};

use crate::audio::{
    AudioDevice, DeviceCatalog, Direction, MicrophoneProbe, PROBE_DURATION, SAMPLE_RATE,
};
use crate::config::file::{AudioFileConfig, KioskConfigFile, VoiceFileConfig};
use crate::config::{DEFAULT_MIC_KEYWORDS, DEFAULT_MODEL_PATH, DEFAULT_SPEAKER_KEYWORDS};

/// Label for keeping keyword-based auto-detection
const AUTO_DETECT: &str = "(auto-detect by keyword)";

/// Put a picked device's name first, keeping the remaining keywords as fallbacks
fn keywords_for(picked: Option<&str>, current: &[String]) -> Vec<String> {
    let Some(name) = picked else {
        return current.to_vec();
    };

    let name = name.to_lowercase();
    std::iter::once(name.clone())
        .chain(current.iter().filter(|k| **k != name).cloned())
        .collect()
}

fn pick_device(
    devices: &[AudioDevice],
    direction: Direction,
    prompt: &str,
) -> anyhow::Result<Option<String>> {
    let candidates: Vec<&AudioDevice> = devices.iter().filter(|d| d.supports(direction)).collect();

    let mut labels = vec![AUTO_DETECT.to_string()];
    labels.extend(
        candidates
            .iter()
            .map(|d| format!("{}: {} ({} ch)", d.index, d.name, d.channels(direction))),
    );

    let choice = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(choice
        .checked_sub(1)
        .and_then(|i| candidates.get(i))
        .map(|d| d.name.clone()))
}

/// Run the interactive setup wizard
///
/// # Errors
///
/// Returns error if user input fails or config cannot be written
pub fn run_setup() -> anyhow::Result<()> {
    println!("Reachy Kiosk Setup\n");

    let existing = crate::config::file::load_config_file();
    let config_path = crate::config::file::config_file_path()
        .unwrap_or_else(|| PathBuf::from("~/.config/reachy-kiosk/config.toml"));

    if config_path.exists() {
        println!("Existing config found at {}\n", config_path.display());
    }

    // 1. Devices
    let catalog = DeviceCatalog::new();
    let devices = catalog.enumerate()?;
    println!("{}", crate::audio::render_listing(&devices));

    let current_mic = existing
        .audio
        .mic_keywords
        .clone()
        .unwrap_or_else(|| DEFAULT_MIC_KEYWORDS.iter().map(ToString::to_string).collect());
    let current_speaker = existing
        .audio
        .speaker_keywords
        .clone()
        .unwrap_or_else(|| DEFAULT_SPEAKER_KEYWORDS.iter().map(ToString::to_string).collect());

    let mic = pick_device(&devices, Direction::Input, "Select the robot microphone")?;
    let speaker = pick_device(&devices, Direction::Output, "Select the robot speaker")?;

    let verify_output = Confirm::new()
        .with_prompt("Verify the speaker with a silent test tone at startup?")
        .default(existing.audio.verify_output.unwrap_or(true))
        .interact()?;

    // 2. Voice
    let enable_voice = Confirm::new()
        .with_prompt("Enable voice (offline STT/TTS)?")
        .default(existing.voice.enabled.unwrap_or(true))
        .interact()?;

    let voice = if enable_voice {
        let model_path: String = Input::new()
            .with_prompt("Speech model directory")
            .default(
                existing
                    .voice
                    .model_path
                    .clone()
                    .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string()),
            )
            .interact_text()?;

        if !std::path::Path::new(&model_path).is_dir() {
            println!("Warning: {model_path} does not exist yet; voice will stay off until it does");
        }

        let tts_rate: u32 = Input::new()
            .with_prompt("Speaking rate (words per minute)")
            .default(existing.voice.tts_rate.unwrap_or(165))
            .interact_text()?;

        VoiceFileConfig {
            enabled: Some(true),
            model_path: Some(model_path),
            tts_rate: Some(tts_rate),
            ..existing.voice.clone()
        }
    } else {
        VoiceFileConfig {
            enabled: Some(false),
            ..existing.voice.clone()
        }
    };

    // 3. Write config
    let config_file = KioskConfigFile {
        voice,
        audio: AudioFileConfig {
            mic_keywords: Some(keywords_for(mic.as_deref(), &current_mic)),
            speaker_keywords: Some(keywords_for(speaker.as_deref(), &current_speaker)),
            verify_output: Some(verify_output),
            ..existing.audio.clone()
        },
        content: existing.content,
    };

    crate::config::file::save_config_file(&config_path, &config_file)?;
    println!("\nConfig written to {}", config_path.display());

    // 4. Mic check (optional)
    let test_mic = Confirm::new()
        .with_prompt("Test the microphone now?")
        .default(true)
        .interact()?;

    if test_mic {
        let index = mic
            .as_deref()
            .and_then(|name| {
                devices
                    .iter()
                    .find(|d| d.name == name && d.supports(Direction::Input))
            })
            .map(|d| d.index);

        println!("Speak now for {} seconds...", PROBE_DURATION.as_secs());
        match MicrophoneProbe::new(&catalog).probe(index, SAMPLE_RATE, PROBE_DURATION) {
            Ok(report) => println!("Peak {} (out of 32767): {:?}", report.peak, report.verdict),
            Err(e) => println!("Mic test failed: {e}"),
        }
    }

    println!("\nSetup complete! Run `reachy-kiosk run -v` to start.");

    Ok(())
}
