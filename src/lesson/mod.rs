//! Lesson sequencing: main menu, levels, question rounds and the FAQ loop

mod input;

use std::rc::Rc;

pub use input::{ConsoleInput, LineInput, ScriptedInput};

use crate::content::{LessonLevel, LessonPlan};
use crate::interpret::{is_correct, match_faq, normalize, parse_choice};
use crate::robot::Robot;
use crate::voice::Listener;

/// Words that leave the FAQ loop
const LEAVE_WORDS: &[&str] = &["back", "exit", "quit", "menu"];

/// Words that list the suggested topics
const HELP_WORDS: &[&str] = &["topics", "help"];

/// How many topics to suggest after an unanswered question
const FALLBACK_TOPICS: usize = 5;

/// Pause between levels of the full lesson, in seconds
const LEVEL_PAUSE_S: f64 = 0.5;

/// The learner's input source closed; the session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputClosed;

/// Result of a step that reads learner input
pub type Flow<T> = std::result::Result<T, InputClosed>;

/// Counters reported at the end of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Levels taught
    pub levels_delivered: usize,

    /// Question rounds answered correctly
    pub correct_answers: usize,

    /// Free-form questions answered from the FAQ
    pub questions_answered: usize,
}

/// Main-menu choices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    FullLesson,
    SingleLevel,
    Questions,
    Exit,
}

impl MenuChoice {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "1" => Some(Self::FullLesson),
            "2" => Some(Self::SingleLevel),
            "3" => Some(Self::Questions),
            "4" => Some(Self::Exit),
            _ => None,
        }
    }
}

fn count_word(n: usize) -> String {
    const WORDS: [&str; 11] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    ];
    WORDS.get(n).map_or_else(|| n.to_string(), |w| (*w).to_string())
}

/// Drives one kiosk session against a robot
pub struct LessonRunner<'a, R: Robot, I: LineInput> {
    plan: &'a LessonPlan,
    robot: R,
    input: I,
    listener: Option<Rc<dyn Listener>>,
    stats: SessionStats,
}

impl<'a, R: Robot, I: LineInput> LessonRunner<'a, R, I> {
    /// Create a text-only runner
    pub const fn new(plan: &'a LessonPlan, robot: R, input: I) -> Self {
        Self {
            plan,
            robot,
            input,
            listener: None,
            stats: SessionStats {
                levels_delivered: 0,
                correct_answers: 0,
                questions_answered: 0,
            },
        }
    }

    /// Fall back to listening when the learner presses Enter on an empty line
    #[must_use]
    pub fn with_listener(mut self, listener: Rc<dyn Listener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// The robot this runner talks through
    pub const fn robot(&self) -> &R {
        &self.robot
    }

    /// The input this runner reads from
    pub const fn input(&self) -> &I {
        &self.input
    }

    /// Counters so far
    pub const fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Run the menu loop until the learner exits or input closes
    pub fn run(&mut self) -> SessionStats {
        self.robot.say(&self.plan.greeting);

        if self.menu_loop() == Err(InputClosed) {
            tracing::info!("input closed, ending session");
        }

        tracing::info!(
            levels = self.stats.levels_delivered,
            correct = self.stats.correct_answers,
            questions = self.stats.questions_answered,
            "session finished"
        );
        self.stats
    }

    fn menu_loop(&mut self) -> Flow<()> {
        loop {
            self.program_menu();
            let raw = self.user_text(
                "Pick a number, or tell me what you'd like to do.",
                "Your choice",
            )?;

            let choice = parse_choice(&raw, &self.plan.main_menu).and_then(MenuChoice::from_token);
            tracing::debug!(input = %raw, ?choice, "main menu");

            match choice {
                None => self.robot.say(concat!(
                    "I didn't catch that. Please say a number from 1 to 4, ",
                    "or describe what you'd like to do."
                )),
                Some(MenuChoice::FullLesson) => self.full_lesson()?,
                Some(MenuChoice::SingleLevel) => match self.select_level()? {
                    Some(level) => self.deliver_level(level)?,
                    None => self
                        .robot
                        .say("I didn't recognise that level. Let's go back to the menu."),
                },
                Some(MenuChoice::Questions) => self.question_loop()?,
                Some(MenuChoice::Exit) => {
                    self.robot.say(&self.plan.farewell);
                    return Ok(());
                }
            }
        }
    }

    fn program_menu(&self) {
        let levels = self.plan.levels.len();
        self.robot.say("What would you like to do?");
        self.robot
            .say(&format!("Option 1: Run full lesson, levels 1 through {levels}."));
        self.robot.say("Option 2: Run a single level.");
        self.robot.say("Option 3: Ask a question.");
        self.robot.say("Option 4: Exit.");
    }

    fn full_lesson(&mut self) -> Flow<()> {
        let count = count_word(self.plan.levels.len());
        self.robot
            .say(&format!("Great! Let's run through all {count} levels."));

        let plan = self.plan;
        for level in &plan.levels {
            self.deliver_level(level)?;
            self.robot.wait(LEVEL_PAUSE_S);
        }

        self.robot
            .say(&format!("Great job completing all {count} levels!"));
        Ok(())
    }

    /// Read typed input; an empty line falls back to one listening window
    ///
    /// Returns an empty string when nothing was typed or heard.
    ///
    /// # Errors
    ///
    /// Returns `InputClosed` when the input source is exhausted
    pub fn user_text(&mut self, voice_prompt: &str, terminal_prompt: &str) -> Flow<String> {
        if !voice_prompt.is_empty() {
            self.robot.say(voice_prompt);
        }

        let typed = match self.input.read_line(terminal_prompt) {
            Ok(Some(line)) => line.trim().to_string(),
            Ok(None) => return Err(InputClosed),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read input");
                return Err(InputClosed);
            }
        };
        if !typed.is_empty() {
            return Ok(typed);
        }

        let Some(listener) = self.listener.clone() else {
            return Ok(String::new());
        };

        self.robot.say("I'm listening.");
        match listener.listen() {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!(error = %e, "listening failed");
                Ok(String::new())
            }
        }
    }

    /// One question round with a single retry
    ///
    /// Returns whether the learner answered correctly.
    ///
    /// # Errors
    ///
    /// Returns `InputClosed` when the input source is exhausted
    pub fn ask_and_answer(&mut self, level: &LessonLevel) -> Flow<bool> {
        self.robot.say(&level.question);

        let first = self.user_text("What do you think?", "Your answer")?;
        if first.is_empty() {
            self.reveal(level);
            return Ok(false);
        }
        if is_correct(&first, &level.accepted_answers) {
            self.praise();
            return Ok(true);
        }

        self.robot.say("Not quite. Try one more time.");
        let retry = self.user_text("Give it another try.", "Your answer")?;
        if !retry.is_empty() && is_correct(&retry, &level.accepted_answers) {
            self.praise();
            Ok(true)
        } else {
            self.reveal(level);
            Ok(false)
        }
    }

    fn praise(&mut self) {
        self.stats.correct_answers += 1;
        self.robot.say("Nice! You got it.");
    }

    fn reveal(&self, level: &LessonLevel) {
        self.robot
            .say(&format!("The answer is: {}", level.correct_answer));
    }

    /// Teach one level: title, goal, explanation, question round, gesture,
    /// bonus facts
    ///
    /// # Errors
    ///
    /// Returns `InputClosed` when the input source is exhausted
    pub fn deliver_level(&mut self, level: &LessonLevel) -> Flow<()> {
        tracing::info!(level = %level.title, "delivering level");

        self.robot.say(&level.title);
        self.robot.say(&level.goal);
        self.robot.say(&level.explanation);
        self.ask_and_answer(level)?;
        self.robot.play_gesture(&level.gesture, level.gesture_duration_s);
        for fact in &level.extra_facts {
            self.robot.say(&format!("Bonus fact: {fact}"));
        }

        self.stats.levels_delivered += 1;
        Ok(())
    }

    /// List the levels and resolve the learner's pick
    ///
    /// Accepts digits, spoken numbers and level keywords. Returns `None` when
    /// nothing matches an existing level.
    ///
    /// # Errors
    ///
    /// Returns `InputClosed` when the input source is exhausted
    pub fn select_level(&mut self) -> Flow<Option<&'a LessonLevel>> {
        let plan = self.plan;

        self.robot.say("Pick a level:");
        for level in &plan.levels {
            self.robot.say(&level.title);
        }

        let raw = self.user_text("Which level would you like?", "Level number")?;
        if raw.is_empty() {
            return Ok(None);
        }

        let token = parse_choice(&raw, &plan.level_menu).map(ToString::to_string).or_else(|| {
            let cleaned = normalize(&raw);
            (!cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit())).then_some(cleaned)
        });

        let level = token.as_deref().and_then(|t| plan.level_by_token(t));
        tracing::debug!(input = %raw, ?token, found = level.is_some(), "level menu");
        Ok(level)
    }

    /// Answer free-form questions until the learner goes back
    ///
    /// # Errors
    ///
    /// Returns `InputClosed` when the input source is exhausted
    pub fn question_loop(&mut self) -> Flow<()> {
        let plan = self.plan;

        self.robot
            .say("Ask me anything about the Sun or the solar system!");
        self.robot
            .say("Say 'topics' for suggestions, or 'back' to return to the menu.");

        let mut prompt = "Go ahead, ask me something!";
        loop {
            let question = self.user_text(prompt, "Your question")?;
            prompt = "Any other questions?";

            let command = normalize(&question);
            if LEAVE_WORDS.contains(&command.as_str()) {
                self.robot.say("Okay, let's go back to the menu.");
                return Ok(());
            }
            if HELP_WORDS.contains(&command.as_str()) {
                self.robot.say(&format!(
                    "Here are some topics you can ask about: {}",
                    plan.suggested_topics.join(", ")
                ));
                continue;
            }
            if question.is_empty() {
                self.robot.say(
                    "I didn't hear anything. Try again, or say 'back' to return to the menu.",
                );
                continue;
            }

            if let Some(answer) = match_faq(&question, &plan.faq) {
                self.stats.questions_answered += 1;
                self.robot.say(answer);
            } else {
                let topics: Vec<&str> = plan
                    .suggested_topics
                    .iter()
                    .take(FALLBACK_TOPICS)
                    .map(String::as_str)
                    .collect();
                self.robot.say(&format!(
                    "I'm not sure about that one. Try asking about: {}",
                    topics.join(", ")
                ));
            }
        }
    }
}
