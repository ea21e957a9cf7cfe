//! Line-oriented learner input

use std::collections::VecDeque;
use std::io::{BufRead, IsTerminal, Write};

use dialoguer::Input;

use crate::Result;

/// Source of typed learner input
pub trait LineInput {
    /// Show `prompt` and read one line
    ///
    /// `Ok(None)` means the input is closed and the session should end.
    ///
    /// # Errors
    ///
    /// Returns error if reading fails
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Reads from the terminal with dialoguer, or plain stdin when piped
#[derive(Debug, Clone, Copy)]
pub struct ConsoleInput {
    interactive: bool,
}

impl ConsoleInput {
    /// Detect whether stdin is a terminal
    #[must_use]
    pub fn new() -> Self {
        Self {
            interactive: std::io::stdin().is_terminal(),
        }
    }
}

impl Default for ConsoleInput {
    fn default() -> Self {
        Self::new()
    }
}

impl LineInput for ConsoleInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        if self.interactive {
            return match Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
            {
                Ok(line) => Ok(Some(line)),
                Err(e) => {
                    let dialoguer::Error::IO(e) = e;
                    if e.kind() == std::io::ErrorKind::Interrupted {
                        Ok(None)
                    } else {
                        Err(e.into())
                    }
                }
            };
        }

        print!("{prompt} > ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Replays a fixed list of lines, then reports the input as closed
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    /// Create input that yields `lines` in order
    #[must_use]
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far
    #[must_use]
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Lines not yet consumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineInput for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}
