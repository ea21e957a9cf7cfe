//! Named gestures expanded into timed head and antenna poses

use std::f64::consts::TAU;
use std::time::Duration;

use serde::Serialize;

/// Interpolation profile between two poses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Minimum-jerk (smooth start and stop)
    MinJerk,
    /// Constant speed
    Linear,
    /// Accelerate then decelerate
    EaseInOut,
    /// Exaggerated overshoot
    Cartoon,
}

/// One step of a gesture
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pose {
    /// Head position (x, y, z) in millimetres
    pub head_mm: (f64, f64, f64),

    /// Antenna angles (left, right) in degrees; `None` leaves them where they are
    pub antennas_deg: Option<(f64, f64)>,

    /// Time to reach the pose
    pub duration: Duration,

    /// Interpolation profile
    pub interpolation: Interpolation,
}

impl Pose {
    fn head(x: f64, y: f64, z: f64, seconds: f64, interpolation: Interpolation) -> Self {
        Self {
            head_mm: (x, y, z),
            antennas_deg: None,
            duration: Duration::try_from_secs_f64(seconds).unwrap_or_default(),
            interpolation,
        }
    }

    const fn with_antennas(mut self, left: f64, right: f64) -> Self {
        self.antennas_deg = Some((left, right));
        self
    }
}

/// Names of every gesture [`expand`] knows
pub const GESTURES: &[&str] = &[
    "gas_spin",
    "fusion_snap",
    "random_walk",
    "convection_wave",
    "magnetic_twist",
    "solar_wind_shiver",
];

/// Rest pose: head slightly raised, antennas level
#[must_use]
pub fn neutral() -> Pose {
    Pose::head(0.0, 0.0, 5.0, 1.0, Interpolation::MinJerk).with_antennas(0.0, 0.0)
}

/// Expand a gesture into poses spanning roughly `duration_s`
///
/// Steps have a per-gesture minimum length, so very short durations stretch.
/// Unknown ids return `None`.
#[must_use]
pub fn expand(gesture: &str, duration_s: f64) -> Option<Vec<Pose>> {
    let poses = match gesture {
        "gas_spin" => gas_spin(duration_s),
        "fusion_snap" => fusion_snap(duration_s),
        "random_walk" => through_points(
            &[(-6.0, 0.0, 6.0), (6.0, 4.0, 8.0), (-4.0, -6.0, 5.0), (4.0, -2.0, 9.0)],
            duration_s,
            0.4,
            Interpolation::Linear,
        ),
        "convection_wave" => through_points(
            &[(0.0, 0.0, 12.0), (6.0, 0.0, 8.0), (0.0, 0.0, 2.0), (-6.0, 0.0, 6.0)],
            duration_s,
            0.5,
            Interpolation::MinJerk,
        ),
        "magnetic_twist" => magnetic_twist(duration_s),
        "solar_wind_shiver" => through_points(
            &[(2.0, 0.0, 6.0), (-2.0, 0.0, 6.0), (0.0, 2.0, 6.0), (0.0, -2.0, 6.0)],
            duration_s,
            0.2,
            Interpolation::Linear,
        ),
        _ => return None,
    };
    Some(poses)
}

/// Total duration of a pose list
#[must_use]
pub fn total_duration(poses: &[Pose]) -> Duration {
    poses.iter().map(|p| p.duration).sum()
}

#[allow(clippy::cast_precision_loss)]
fn step_length(duration_s: f64, steps: usize, min_step_s: f64) -> f64 {
    (duration_s / steps as f64).max(min_step_s)
}

#[allow(clippy::cast_precision_loss)]
fn gas_spin(duration_s: f64) -> Vec<Pose> {
    const STEPS: usize = 6;
    const RADIUS: f64 = 8.0;

    (0..STEPS)
        .map(|i| {
            let angle = TAU * (i as f64 / STEPS as f64);
            let (left, right) = if i % 2 == 0 { (20.0, -20.0) } else { (-20.0, 20.0) };
            Pose::head(
                RADIUS * angle.cos(),
                RADIUS * angle.sin(),
                8.0,
                duration_s / STEPS as f64,
                Interpolation::MinJerk,
            )
            .with_antennas(left, right)
        })
        .collect()
}

fn fusion_snap(duration_s: f64) -> Vec<Pose> {
    vec![
        Pose::head(0.0, 0.0, 12.0, duration_s * 0.6, Interpolation::EaseInOut),
        Pose::head(0.0, 0.0, 2.0, duration_s * 0.4, Interpolation::Cartoon),
    ]
}

fn magnetic_twist(duration_s: f64) -> Vec<Pose> {
    const SWINGS: [(f64, f64, f64); 4] =
        [(-8.0, 0.0, 6.0), (8.0, 0.0, 6.0), (-8.0, 0.0, 6.0), (8.0, 0.0, 6.0)];

    let step = step_length(duration_s, SWINGS.len(), 0.4);
    SWINGS
        .iter()
        .enumerate()
        .map(|(i, &(x, y, z))| {
            let (left, right) = if i % 2 == 0 { (25.0, -25.0) } else { (-25.0, 25.0) };
            Pose::head(x, y, z, step, Interpolation::MinJerk).with_antennas(left, right)
        })
        .collect()
}

fn through_points(
    points: &[(f64, f64, f64)],
    duration_s: f64,
    min_step_s: f64,
    interpolation: Interpolation,
) -> Vec<Pose> {
    let step = step_length(duration_s, points.len(), min_step_s);
    points
        .iter()
        .map(|&(x, y, z)| Pose::head(x, y, z, step, interpolation))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_gesture() {
        assert!(expand("moonwalk", 2.0).is_none());
        assert!(expand("", 2.0).is_none());
    }

    #[test]
    fn test_all_gestures_expand() {
        for name in GESTURES {
            let poses = expand(name, 2.0).unwrap();
            assert!(!poses.is_empty(), "{name} produced no poses");
        }
    }

    #[test]
    fn test_fusion_snap_split() {
        let poses = expand("fusion_snap", 1.5).unwrap();
        assert_eq!(poses.len(), 2);
        assert!((poses[0].duration.as_secs_f64() - 0.9).abs() < 1e-6);
        assert!((poses[1].duration.as_secs_f64() - 0.6).abs() < 1e-6);
        assert_eq!(poses[0].interpolation, Interpolation::EaseInOut);
        assert_eq!(poses[1].interpolation, Interpolation::Cartoon);
    }

    #[test]
    fn test_gas_spin_circle() {
        let poses = expand("gas_spin", 3.0).unwrap();
        assert_eq!(poses.len(), 6);
        assert!((poses[0].head_mm.0 - 8.0).abs() < 1e-9);
        assert!(poses[3].head_mm.0 < -7.9);
        assert_eq!(poses[0].antennas_deg, Some((20.0, -20.0)));
        assert_eq!(poses[1].antennas_deg, Some((-20.0, 20.0)));
        assert!((total_duration(&poses).as_secs_f64() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_minimum_step_stretches_short_gestures() {
        let poses = expand("convection_wave", 0.4).unwrap();
        assert!(poses.iter().all(|p| p.duration == Duration::from_secs_f64(0.5)));

        let poses = expand("solar_wind_shiver", 2.0).unwrap();
        assert!(poses.iter().all(|p| p.duration == Duration::from_secs_f64(0.5)));
    }

    #[test]
    fn test_neutral_pose() {
        let pose = neutral();
        assert_eq!(pose.head_mm, (0.0, 0.0, 5.0));
        assert_eq!(pose.antennas_deg, Some((0.0, 0.0)));
        assert_eq!(pose.duration, Duration::from_secs(1));
    }
}
