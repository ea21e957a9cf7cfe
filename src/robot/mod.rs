//! Robot capability interface used by the lesson runner
//!
//! The runner only needs three things from a body: say a line, play a named
//! gesture and pause. [`KioskRobot`] composes an optional voice session with
//! a gesture backend to provide them.

pub mod gesture;
mod motion;

use std::rc::Rc;
use std::time::Duration;

pub use gesture::{GESTURES, Interpolation, Pose};
pub use motion::{GesturePlayer, NoMotion, SimulatedMotion};

use crate::voice::VoiceSession;

/// What the lesson runner can ask of the robot
pub trait Robot {
    /// Show and, when voice is available, speak a line
    fn say(&self, text: &str);

    /// Play a named gesture, blocking; unknown ids are a no-op
    fn play_gesture(&self, gesture: &str, duration_s: f64);

    /// Pause between lesson steps
    fn wait(&self, seconds: f64) {
        std::thread::sleep(Duration::try_from_secs_f64(seconds).unwrap_or_default());
    }
}

/// Terminal output plus optional speech and motion
pub struct KioskRobot {
    voice: Option<Rc<VoiceSession>>,
    motion: Box<dyn GesturePlayer>,
}

impl KioskRobot {
    /// Compose a robot and move it to the rest pose
    #[must_use]
    pub fn new(voice: Option<Rc<VoiceSession>>, motion: Box<dyn GesturePlayer>) -> Self {
        motion.neutral();
        Self { voice, motion }
    }

    /// Whether lines are spoken aloud
    #[must_use]
    pub const fn has_voice(&self) -> bool {
        self.voice.is_some()
    }
}

impl Robot for KioskRobot {
    fn say(&self, text: &str) {
        println!("\nReachy: {text}");
        if let Some(voice) = &self.voice {
            voice.speak(text);
        }
    }

    fn play_gesture(&self, gesture: &str, duration_s: f64) {
        self.motion.play(gesture, duration_s);
    }
}
