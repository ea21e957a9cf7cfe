use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reachy_kiosk::audio::{
    AudioPlayback, MicrophoneProbe, Pcm, PROBE_DURATION, SilentToneVerifier, render_listing,
};
use reachy_kiosk::config::{LoadOptions, MAX_RECORD_SECONDS, valid_window};
use reachy_kiosk::{
    Config, ConsoleInput, DeviceCatalog, DeviceResolver, DeviceSelection, GesturePlayer,
    KioskRobot, LessonPlan, LessonRunner, NoMotion, SimulatedMotion, VoiceSession,
};

/// Reachy Kiosk - Offline voice lesson kiosk for the Reachy Mini robot
#[derive(Parser)]
#[command(name = "reachy-kiosk", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Type answers only; skip speech recognition and synthesis
    #[arg(long, env = "KIOSK_TEXT_ONLY")]
    text_only: bool,

    /// Listening window in seconds
    #[arg(long)]
    record_seconds: Option<f64>,

    /// Skip the silent speaker check at startup
    #[arg(long)]
    no_verify: bool,

    /// Do not simulate gestures
    #[arg(long)]
    no_motion: bool,

    /// Lesson plan JSON replacing the built-in one
    #[arg(long)]
    content: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the lesson kiosk (default)
    Run,
    /// List audio devices and the robot devices they resolve to
    Devices,
    /// Record a short clip and report the microphone level
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "2")]
        duration: f64,

        /// Device index (defaults to the resolved robot mic)
        #[arg(long)]
        device: Option<usize>,
    },
    /// Play a test tone through the speaker
    TestSpeaker {
        /// Device index (defaults to the resolved robot speaker)
        #[arg(long)]
        device: Option<usize>,
    },
    /// Speak a line through the resolved speaker
    Say {
        /// Text to speak
        #[arg(default_value = "Hello! I'm Reachy. Can you hear me?")]
        text: String,
    },
    /// Interactive first-run setup
    Setup,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,reachy_kiosk=info",
        1 => "info,reachy_kiosk=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let options = LoadOptions {
        text_only: cli.text_only,
        record_seconds: cli.record_seconds,
        no_verify: cli.no_verify,
    };

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let mut config = Config::load(&options)?;
            if cli.content.is_some() {
                config.content_path = cli.content;
            }
            run_kiosk(&config, cli.no_motion)
        }
        Command::Devices => list_devices(&Config::load(&options)?),
        Command::TestMic { duration, device } => {
            test_mic(&Config::load(&options)?, duration, device)
        }
        Command::TestSpeaker { device } => test_speaker(&Config::load(&options)?, device),
        Command::Say { text } => say(&Config::load(&options)?, &text),
        Command::Setup => reachy_kiosk::setup::run_setup(),
    }
}

/// Resolve the robot's devices, verifying the speaker if configured
fn resolve_devices(config: &Config, catalog: &DeviceCatalog) -> anyhow::Result<DeviceSelection> {
    let devices = catalog.enumerate()?;
    let resolver = DeviceResolver::new(&config.audio);
    let selection = resolver.select(&devices, &SilentToneVerifier::new(catalog));
    tracing::info!(%selection, "audio devices resolved");
    Ok(selection)
}

/// Start voice, or explain why the kiosk is text-only
fn build_voice(config: &Config) -> Option<Rc<VoiceSession>> {
    let catalog = DeviceCatalog::new();
    let selection = match resolve_devices(config, &catalog) {
        Ok(selection) => selection,
        Err(e) => {
            tracing::warn!(error = %e, "could not list audio devices");
            DeviceSelection::default()
        }
    };

    if config.audio.probe_mic {
        let probe = MicrophoneProbe::new(&catalog);
        println!(
            "Testing the microphone for {} seconds, say something...",
            PROBE_DURATION.as_secs()
        );
        let rate = config.voice.sample_rate;
        if let Err(e) = probe.probe(selection.input_index, rate, PROBE_DURATION) {
            tracing::warn!(error = %e, "mic test failed");
        }
    }

    match VoiceSession::new(config, selection) {
        Ok(session) => {
            println!("[Voice] Offline TTS + STT ready ({selection}).");
            Some(Rc::new(session))
        }
        Err(e) => {
            tracing::warn!(error = %e, "offline voice disabled");
            println!("[Voice] Falling back to text-only mode (type your answers).");
            None
        }
    }
}

fn run_kiosk(config: &Config, no_motion: bool) -> anyhow::Result<()> {
    let plan = LessonPlan::load_or_embedded(config.content_path.as_deref())?;

    println!(
        r"
    =============================================
      Reachy Mini Lite  --  {}
      Offline Voice (TTS & STT)
    =============================================

    Type an answer and press Enter, or press Enter
    on an empty line to speak instead.
    ",
        plan.title
    );

    let voice = if config.voice.enabled {
        build_voice(config)
    } else {
        tracing::info!("voice disabled, running text-only");
        None
    };

    let motion: Box<dyn GesturePlayer> = if no_motion {
        Box::new(NoMotion)
    } else {
        Box::new(SimulatedMotion::default())
    };

    let robot = KioskRobot::new(voice.clone(), motion);
    let mut runner = LessonRunner::new(&plan, robot, ConsoleInput::new());
    if let Some(voice) = voice {
        runner = runner.with_listener(voice);
    }

    runner.run();
    Ok(())
}

/// List every audio device and the resolved robot devices
fn list_devices(config: &Config) -> anyhow::Result<()> {
    let catalog = DeviceCatalog::new();
    let devices = catalog.enumerate()?;
    println!("{}", render_listing(&devices));

    let resolver = DeviceResolver::new(&config.audio);
    let selection = resolver.select(&devices, &SilentToneVerifier::new(&catalog));
    println!("Resolved: {selection}");
    Ok(())
}

/// Record a clip and report the mic level
fn test_mic(config: &Config, duration: f64, device: Option<usize>) -> anyhow::Result<()> {
    if !valid_window(duration) {
        anyhow::bail!("duration must be above 0 and at most {MAX_RECORD_SECONDS} seconds");
    }
    let window = Duration::try_from_secs_f64(duration)?;

    let catalog = DeviceCatalog::new();
    let index = match device {
        Some(index) => Some(index),
        None => resolve_devices(config, &catalog)?.input_index,
    };

    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let report = MicrophoneProbe::new(&catalog).probe(index, config.voice.sample_rate, window)?;

    println!("\n---");
    println!("Peak: {} / 32767 | RMS: {:.1} | {:?}", report.peak, report.rms, report.verdict);
    println!("If the level stayed near 0, check:");
    println!("  1. Is the robot plugged in over USB?");
    println!("  2. Run: reachy-kiosk devices");
    println!("  3. Run: arecord -l (to list devices)");
    println!("  4. Try: pavucontrol (to check levels)");

    Ok(())
}

/// Play a 440Hz tone through the speaker
fn test_speaker(config: &Config, device: Option<usize>) -> anyhow::Result<()> {
    let catalog = DeviceCatalog::new();
    let index = match device {
        Some(index) => Some(index),
        None => resolve_devices(config, &catalog)?.output_index,
    };

    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let sample_rate = 22050_u32;
    let frequency = 440.0_f32;
    let num_samples = sample_rate as usize * 2;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 // 30% volume
        })
        .collect();

    let playback = AudioPlayback::open(&catalog, index, sample_rate)?;
    println!(
        "Playing {} samples at {} Hz (device runs at {} Hz)...",
        samples.len(),
        sample_rate,
        playback.sample_rate()
    );
    playback.play(&Pcm {
        samples,
        channels: 1,
        sample_rate,
    })?;

    println!("\n---");
    println!("If you heard the tone, your speaker is working!");
    println!("If you didn't hear anything, check:");
    println!("  1. Run: reachy-kiosk devices");
    println!("  2. Run: pactl list sinks short");
    println!("  3. Try: pavucontrol (to check output levels)");

    Ok(())
}

/// Speak one line through the voice session
fn say(config: &Config, text: &str) -> anyhow::Result<()> {
    let catalog = DeviceCatalog::new();
    let selection = resolve_devices(config, &catalog)?;
    let session = VoiceSession::new(config, selection)?;

    println!("Speaking: \"{text}\"");
    session.speak(text);
    Ok(())
}
