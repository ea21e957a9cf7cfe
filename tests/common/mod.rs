//! Shared test utilities

#![allow(dead_code)]

use std::cell::RefCell;

use reachy_kiosk::{AudioDevice, LessonPlan, Robot};

/// Build a device snapshot
#[must_use]
pub fn device(index: usize, name: &str, ins: u16, outs: u16) -> AudioDevice {
    AudioDevice {
        index,
        name: name.to_string(),
        max_input_channels: ins,
        max_output_channels: outs,
        default_sample_rate: 48000,
    }
}

/// The built-in solar system lesson
#[must_use]
pub fn plan() -> LessonPlan {
    LessonPlan::embedded().expect("embedded lesson plan should parse")
}

/// Something the robot did
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Said(String),
    Gesture(String),
    Waited,
}

/// Robot that records every action instead of moving or speaking
#[derive(Default)]
pub struct ScriptedRobot {
    actions: RefCell<Vec<Action>>,
}

impl ScriptedRobot {
    /// Every action in order
    pub fn actions(&self) -> Vec<Action> {
        self.actions.borrow().clone()
    }

    /// Spoken lines in order
    pub fn said(&self) -> Vec<String> {
        self.actions
            .borrow()
            .iter()
            .filter_map(|a| match a {
                Action::Said(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Gestures played in order
    pub fn gestures(&self) -> Vec<String> {
        self.actions
            .borrow()
            .iter()
            .filter_map(|a| match a {
                Action::Gesture(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether any spoken line contains `needle`
    pub fn said_containing(&self, needle: &str) -> bool {
        self.said().iter().any(|line| line.contains(needle))
    }
}

impl Robot for ScriptedRobot {
    fn say(&self, text: &str) {
        self.actions.borrow_mut().push(Action::Said(text.to_string()));
    }

    fn play_gesture(&self, gesture: &str, _duration_s: f64) {
        self.actions
            .borrow_mut()
            .push(Action::Gesture(gesture.to_string()));
    }

    fn wait(&self, _seconds: f64) {
        self.actions.borrow_mut().push(Action::Waited);
    }
}
