//! Lesson content: levels, FAQ and menu tables
//!
//! The built-in solar-system plan is compiled into the binary; a JSON file
//! with the same schema can replace it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::interpret::{FaqEntry, MenuKeywordTable};
use crate::{Error, Result};

/// Built-in lesson plan
const EMBEDDED_PLAN: &str = include_str!("../../content/solar_system.json");

/// One taught level with its question round
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LessonLevel {
    /// Spoken title, e.g. "Level 1: The Foundation (Chemistry & Density)"
    pub title: String,

    /// Learning goal
    pub goal: String,

    /// Physics explanation
    pub explanation: String,

    /// Question posed to the learner
    pub question: String,

    /// Answer revealed when the learner gives up or misses twice
    pub correct_answer: String,

    /// Short phrasings accepted as correct
    pub accepted_answers: Vec<String>,

    /// Gesture played after the question round
    pub gesture: String,

    /// Operator-facing description of the gesture
    #[serde(default)]
    pub gesture_cue: String,

    /// Gesture duration in seconds
    #[serde(default = "default_gesture_duration")]
    pub gesture_duration_s: f64,

    /// Bonus facts spoken after the gesture
    #[serde(default)]
    pub extra_facts: Vec<String>,
}

/// Longest gesture a level may request, in seconds
pub const MAX_GESTURE_SECONDS: f64 = 30.0;

const fn default_gesture_duration() -> f64 {
    2.0
}

/// Everything the kiosk says and understands
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LessonPlan {
    /// Course title shown in the banner
    #[serde(default)]
    pub title: String,

    /// Opening line
    pub greeting: String,

    /// Closing line
    pub farewell: String,

    /// Levels in teaching order
    pub levels: Vec<LessonLevel>,

    /// Knowledge base for free-form questions; order breaks score ties
    #[serde(default)]
    pub faq: Vec<FaqEntry>,

    /// Topics offered when the learner asks for help
    #[serde(default)]
    pub suggested_topics: Vec<String>,

    /// Main menu phrases mapped to choices "1".."4"
    pub main_menu: MenuKeywordTable,

    /// Level menu phrases mapped to level numbers
    pub level_menu: MenuKeywordTable,
}

impl LessonPlan {
    /// The built-in solar-system plan
    ///
    /// # Errors
    ///
    /// Returns error if the embedded asset fails to parse or validate
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_PLAN)
    }

    /// Load a plan from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let plan = Self::from_json(&json)
            .map_err(|e| Error::Content(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), levels = plan.levels.len(), "loaded lesson plan");
        Ok(plan)
    }

    /// Load from an override path, or the built-in plan when `None`
    ///
    /// # Errors
    ///
    /// Returns error if the chosen plan cannot be loaded
    pub fn load_or_embedded(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(Self::embedded, Self::load)
    }

    /// Parse and validate plan JSON
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or the plan is inconsistent
    pub fn from_json(json: &str) -> Result<Self> {
        let plan: Self = serde_json::from_str(json)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Check that every level can be asked and every level-menu token
    /// names a level
    ///
    /// # Errors
    ///
    /// Returns `Error::Content` describing the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.levels.is_empty() {
            return Err(Error::Content("lesson plan has no levels".to_string()));
        }

        if let Some(level) = self.levels.iter().find(|l| l.accepted_answers.is_empty()) {
            return Err(Error::Content(format!(
                "level {:?} has no accepted answers",
                level.title
            )));
        }

        let bounded = |seconds: f64| (0.0..=MAX_GESTURE_SECONDS).contains(&seconds);
        if let Some(level) = self.levels.iter().find(|l| !bounded(l.gesture_duration_s)) {
            return Err(Error::Content(format!(
                "level {:?} has gesture duration {} outside 0..={MAX_GESTURE_SECONDS} seconds",
                level.title, level.gesture_duration_s
            )));
        }

        for (phrase, token) in self.level_menu.iter() {
            if self.level_by_token(token).is_none() {
                return Err(Error::Content(format!(
                    "level menu phrase {phrase:?} points at missing level {token:?}"
                )));
            }
        }

        Ok(())
    }

    /// Look up a level by its 1-based number token
    #[must_use]
    pub fn level_by_token(&self, token: &str) -> Option<&LessonLevel> {
        let number: usize = token.parse().ok()?;
        number.checked_sub(1).and_then(|i| self.levels.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_plan_parses() {
        let plan = LessonPlan::embedded().unwrap();
        assert_eq!(plan.levels.len(), 6);
        assert_eq!(plan.faq.len(), 16);
        assert_eq!(plan.levels[1].gesture, "fusion_snap");
        assert!((plan.levels[1].gesture_duration_s - 1.5).abs() < f64::EPSILON);
        assert_eq!(plan.main_menu.iter().next(), Some(("full lesson", "1")));
    }

    #[test]
    fn test_level_by_token() {
        let plan = LessonPlan::embedded().unwrap();
        assert!(plan.level_by_token("1").unwrap().title.starts_with("Level 1"));
        assert!(plan.level_by_token("6").is_some());
        assert!(plan.level_by_token("0").is_none());
        assert!(plan.level_by_token("7").is_none());
        assert!(plan.level_by_token("two").is_none());
    }

    #[test]
    fn test_validate_rejects_dangling_level_token() {
        let mut plan = LessonPlan::embedded().unwrap();
        plan.levels.truncate(5);
        let err = plan.validate().unwrap_err();
        assert!(matches!(err, Error::Content(msg) if msg.contains("\"6\"")));
    }

    #[test]
    fn test_validate_rejects_empty_answers() {
        let mut plan = LessonPlan::embedded().unwrap();
        plan.levels[2].accepted_answers.clear();
        assert!(matches!(plan.validate(), Err(Error::Content(_))));
    }

    #[test]
    fn test_validate_rejects_unbounded_gesture() {
        let mut plan = LessonPlan::embedded().unwrap();
        plan.levels[0].gesture_duration_s = 1e30;
        assert!(matches!(plan.validate(), Err(Error::Content(_))));

        plan.levels[0].gesture_duration_s = -1.0;
        assert!(matches!(plan.validate(), Err(Error::Content(_))));
    }

    #[test]
    fn test_validate_rejects_no_levels() {
        let mut plan = LessonPlan::embedded().unwrap();
        plan.levels.clear();
        assert!(matches!(plan.validate(), Err(Error::Content(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        let mut plan = LessonPlan::embedded().unwrap();
        plan.greeting = "Hi there.".to_string();
        std::fs::write(&path, serde_json::to_string(&plan).unwrap()).unwrap();

        let loaded = LessonPlan::load_or_embedded(Some(&path)).unwrap();
        assert_eq!(loaded.greeting, "Hi there.");
        assert_eq!(loaded, plan);
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"levels\": []}").unwrap();
        let err = LessonPlan::load(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
