//! Reachy Kiosk - Offline voice lesson kiosk for the Reachy Mini robot
//!
//! This library provides the pieces of the kiosk loop:
//! - Audio device discovery, resolution and playback verification
//! - Offline voice I/O (fixed-window capture, recognition, synthesis)
//! - Fuzzy interpretation of typed or recognized input
//! - Lesson sequencing against a robot capability interface
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   LessonRunner                       │
//! │   menu  │  levels  │  Q&A rounds  │  FAQ loop        │
//! └──────┬──────────────────┬───────────────────┬───────┘
//!        │                  │                   │
//! ┌──────▼──────┐   ┌───────▼────────┐   ┌──────▼──────┐
//! │    Robot    │   │ Interpretation │   │   Content   │
//! │ say/gesture │   │ normalize/match│   │ levels, FAQ │
//! └──────┬──────┘   └────────────────┘   └─────────────┘
//!        │
//! ┌──────▼──────────────────────────────────────────────┐
//! │                  VoiceSession                        │
//! │  listen: capture → recognize  │  speak: synth → play │
//! └──────┬──────────────────────────────────────────────┘
//!        │
//! ┌──────▼──────────────────────────────────────────────┐
//! │     DeviceCatalog → DeviceResolver → MicrophoneProbe │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod audio;
pub mod config;
pub mod content;
pub mod error;
pub mod interpret;
pub mod lesson;
pub mod robot;
pub mod setup;
pub mod voice;

pub use audio::{AudioDevice, DeviceCatalog, DeviceResolver, DeviceSelection, Direction};
pub use config::Config;
pub use content::{LessonLevel, LessonPlan};
pub use error::{Error, Result};
pub use interpret::{FaqEntry, MenuKeywordTable, is_correct, match_faq, normalize, parse_choice};
pub use lesson::{ConsoleInput, LessonRunner, LineInput, ScriptedInput, SessionStats};
pub use robot::{GesturePlayer, KioskRobot, NoMotion, Robot, SimulatedMotion};
pub use voice::{Listener, VoiceSession};
