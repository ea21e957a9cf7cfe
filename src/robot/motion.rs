//! Gesture playback backends

use super::gesture::{self, Pose};

/// Plays named gestures on some body
pub trait GesturePlayer {
    /// Play a gesture and block until it finishes; unknown ids do nothing
    fn play(&self, gesture: &str, duration_s: f64);

    /// Return to the rest pose
    fn neutral(&self) {}
}

/// Ignores every gesture
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMotion;

impl GesturePlayer for NoMotion {
    fn play(&self, gesture: &str, _duration_s: f64) {
        tracing::trace!(gesture, "motion disabled, skipping gesture");
    }
}

/// Logs each pose and, in real time mode, waits out its duration
#[derive(Debug, Clone, Copy)]
pub struct SimulatedMotion {
    realtime: bool,
}

impl SimulatedMotion {
    /// Create a simulator; `realtime` sleeps for every pose
    #[must_use]
    pub const fn new(realtime: bool) -> Self {
        Self { realtime }
    }

    fn apply(&self, pose: &Pose) {
        tracing::debug!(
            head_mm = ?pose.head_mm,
            antennas_deg = ?pose.antennas_deg,
            duration_ms = pose.duration.as_millis(),
            interpolation = ?pose.interpolation,
            "pose"
        );
        if self.realtime {
            std::thread::sleep(pose.duration);
        }
    }
}

impl Default for SimulatedMotion {
    fn default() -> Self {
        Self::new(true)
    }
}

impl GesturePlayer for SimulatedMotion {
    fn play(&self, gesture: &str, duration_s: f64) {
        let Some(poses) = gesture::expand(gesture, duration_s) else {
            tracing::debug!(gesture, "unknown gesture ignored");
            return;
        };

        tracing::info!(gesture, steps = poses.len(), "playing gesture");
        for pose in &poses {
            self.apply(pose);
        }
    }

    fn neutral(&self) {
        self.apply(&gesture::neutral());
    }
}
