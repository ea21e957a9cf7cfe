//! Lesson runner integration tests
//!
//! Drives whole sessions with scripted input against a recording robot

use std::rc::Rc;

use reachy_kiosk::{LessonRunner, Listener, Result, ScriptedInput, SessionStats};

mod common;
use common::{Action, ScriptedRobot, plan};

/// Listener that always hears the same thing
struct FixedListener(&'static str);

impl Listener for FixedListener {
    fn listen(&self) -> Result<String> {
        Ok(self.0.to_string())
    }
}

#[test]
fn test_correct_first_answer() {
    let plan = plan();
    let level = &plan.levels[0];
    let input = ScriptedInput::new(["plasma"]);
    let mut runner = LessonRunner::new(&plan, ScriptedRobot::default(), input);

    runner.deliver_level(level).unwrap();

    let robot = runner.robot();
    let said = robot.said();
    assert_eq!(said[0], level.title);
    assert_eq!(said[1], level.goal);
    assert_eq!(said[2], level.explanation);
    assert_eq!(said[3], level.question);
    assert!(robot.said_containing("Nice! You got it."));
    assert!(!robot.said_containing("Not quite"));
    assert_eq!(robot.gestures(), vec!["gas_spin"]);
    assert!(said.last().is_some_and(|l| l.starts_with("Bonus fact: ")));

    assert_eq!(
        runner.stats(),
        SessionStats {
            levels_delivered: 1,
            correct_answers: 1,
            questions_answered: 0,
        }
    );
}

#[test]
fn test_gesture_follows_question_round() {
    let plan = plan();
    let input = ScriptedInput::new(["fuse"]);
    let mut runner = LessonRunner::new(&plan, ScriptedRobot::default(), input);

    runner.deliver_level(&plan.levels[1]).unwrap();

    let actions = runner.robot().actions();
    let praise = actions
        .iter()
        .position(|a| *a == Action::Said("Nice! You got it.".to_string()))
        .unwrap();
    let gesture = actions
        .iter()
        .position(|a| *a == Action::Gesture("fusion_snap".to_string()))
        .unwrap();
    assert!(praise < gesture);
}

#[test]
fn test_retry_then_correct() {
    let plan = plan();
    let input = ScriptedInput::new(["no idea", "a glowing soup"]);
    let mut runner = LessonRunner::new(&plan, ScriptedRobot::default(), input);

    assert_eq!(runner.ask_and_answer(&plan.levels[0]), Ok(true));

    let robot = runner.robot();
    assert!(robot.said_containing("Not quite. Try one more time."));
    assert!(robot.said_containing("Nice! You got it."));
    assert!(!robot.said_containing("The answer is"));
    assert_eq!(runner.stats().correct_answers, 1);
}

#[test]
fn test_retry_then_reveal() {
    let plan = plan();
    let input = ScriptedInput::new(["no idea", "still no idea"]);
    let mut runner = LessonRunner::new(&plan, ScriptedRobot::default(), input);

    assert_eq!(runner.ask_and_answer(&plan.levels[0]), Ok(false));

    let said = runner.robot().said();
    assert_eq!(
        said.last().map(String::as_str),
        Some("The answer is: Glowing soup (plasma).")
    );
    assert_eq!(runner.stats().correct_answers, 0);
    assert_eq!(runner.input().remaining(), 0);
}

#[test]
fn test_empty_answer_reveals_without_retry() {
    let plan = plan();
    let input = ScriptedInput::new(["", "plasma"]);
    let mut runner = LessonRunner::new(&plan, ScriptedRobot::default(), input);

    assert_eq!(runner.ask_and_answer(&plan.levels[0]), Ok(false));

    let robot = runner.robot();
    assert!(robot.said_containing("The answer is: Glowing soup (plasma)."));
    assert!(!robot.said_containing("Not quite"));
    assert_eq!(runner.input().remaining(), 1);
}

#[test]
fn test_empty_line_falls_back_to_listening() {
    let plan = plan();
    let mut runner = LessonRunner::new(&plan, ScriptedRobot::default(), ScriptedInput::new([""]))
        .with_listener(Rc::new(FixedListener("i think it is plasma")));

    assert_eq!(runner.ask_and_answer(&plan.levels[0]), Ok(true));
    assert!(runner.robot().said_containing("I'm listening."));
}

#[test]
fn test_exit_from_menu() {
    let plan = plan();
    let mut runner = LessonRunner::new(&plan, ScriptedRobot::default(), ScriptedInput::new(["4"]));

    let stats = runner.run();

    let said = runner.robot().said();
    assert_eq!(said.first(), Some(&plan.greeting));
    assert_eq!(said.last(), Some(&plan.farewell));
    assert!(said.contains(&"Option 1: Run full lesson, levels 1 through 6.".to_string()));
    assert_eq!(stats, SessionStats::default());
    assert_eq!(runner.input().prompts(), ["Your choice"]);
}

#[test]
fn test_unrecognized_menu_choice_repeats_menu() {
    let plan = plan();
    let input = ScriptedInput::new(["xyz", "quit"]);
    let mut runner = LessonRunner::new(&plan, ScriptedRobot::default(), input);

    runner.run();

    let robot = runner.robot();
    assert!(robot.said_containing("I didn't catch that."));
    let menus = robot
        .said()
        .iter()
        .filter(|l| *l == "What would you like to do?")
        .count();
    assert_eq!(menus, 2);
    assert_eq!(robot.said().last(), Some(&plan.farewell));
}

#[test]
fn test_full_lesson() {
    let plan = plan();
    let input =
        ScriptedInput::new(["1", "plasma", "fuse", "zigzag", "both", "knot", "electric", "4"]);
    let mut runner = LessonRunner::new(&plan, ScriptedRobot::default(), input);

    let stats = runner.run();

    assert_eq!(
        stats,
        SessionStats {
            levels_delivered: 6,
            correct_answers: 6,
            questions_answered: 0,
        }
    );

    let robot = runner.robot();
    assert!(robot.said_containing("Great! Let's run through all six levels."));
    assert!(robot.said_containing("Great job completing all six levels!"));
    assert_eq!(
        robot.gestures(),
        vec![
            "gas_spin",
            "fusion_snap",
            "random_walk",
            "convection_wave",
            "magnetic_twist",
            "solar_wind_shiver",
        ]
    );
    let pauses = robot.actions().iter().filter(|a| **a == Action::Waited).count();
    assert_eq!(pauses, 6);
}

#[test]
fn test_single_level_by_number_and_keyword() {
    let plan = plan();
    let input = ScriptedInput::new([
        "2",
        "three",
        "zig zag",
        "pick a level",
        "lava lamp",
        "both",
        "exit",
    ]);
    let mut runner = LessonRunner::new(&plan, ScriptedRobot::default(), input);

    let stats = runner.run();

    assert_eq!(stats.levels_delivered, 2);
    assert_eq!(runner.robot().gestures(), vec!["random_walk", "convection_wave"]);
}

#[test]
fn test_unknown_level_returns_to_menu() {
    let plan = plan();
    let input = ScriptedInput::new(["2", "pluto", "2", "9", "4"]);
    let mut runner = LessonRunner::new(&plan, ScriptedRobot::default(), input);

    let stats = runner.run();

    assert_eq!(stats.levels_delivered, 0);
    let misses = runner
        .robot()
        .said()
        .iter()
        .filter(|l| l.starts_with("I didn't recognise that level"))
        .count();
    assert_eq!(misses, 2);
}

#[test]
fn test_select_level_lists_titles() {
    let plan = plan();
    let mut runner = LessonRunner::new(&plan, ScriptedRobot::default(), ScriptedInput::new(["6"]));

    let level = runner.select_level().unwrap();

    assert_eq!(level.map(|l| l.gesture.as_str()), Some("solar_wind_shiver"));
    let said = runner.robot().said();
    for level in &plan.levels {
        assert!(said.contains(&level.title));
    }
}

#[test]
fn test_question_loop() {
    let plan = plan();
    let input = ScriptedInput::new([
        "3",
        "how old is the sun",
        "topics",
        "what about pluto",
        "",
        "back",
        "4",
    ]);
    let mut runner = LessonRunner::new(&plan, ScriptedRobot::default(), input);

    let stats = runner.run();
    assert_eq!(stats.questions_answered, 1);

    let robot = runner.robot();
    assert!(robot.said_containing("The Sun is about 4.6 billion years old."));
    assert!(robot.said_containing("Here are some topics you can ask about: plasma, fusion,"));
    assert!(robot.said_containing(concat!(
        "I'm not sure about that one. Try asking about: ",
        "plasma, fusion, sunspots, solar wind, magnetic fields"
    )));
    assert!(robot.said_containing("I didn't hear anything."));
    assert!(robot.said_containing("Okay, let's go back to the menu."));
    assert_eq!(robot.said().last(), Some(&plan.farewell));
}

#[test]
fn test_input_closed_ends_session() {
    let plan = plan();
    let input = ScriptedInput::new(["1", "plasma"]);
    let mut runner = LessonRunner::new(&plan, ScriptedRobot::default(), input);

    let stats = runner.run();

    assert_eq!(stats.levels_delivered, 1);
    assert_eq!(stats.correct_answers, 1);
    assert!(!runner.robot().said_containing(&plan.farewell));
}

#[test]
fn test_input_closed_at_menu() {
    let plan = plan();
    let mut runner = LessonRunner::new(&plan, ScriptedRobot::default(), ScriptedInput::default());

    assert_eq!(runner.run(), SessionStats::default());
    assert_eq!(runner.input().prompts(), ["Your choice"]);
}
