//! ui::scripted
//!
//! Prompter that replays queued answers, for driving the dialogue in tests.
//!
//! # Example
//!
//! ```
//! use commit_vibes::ui::prompts::{Choice, Prompter};
//! use commit_vibes::ui::scripted::{Answer, ScriptedPrompter};
//!
//! let mut prompter = ScriptedPrompter::new([Answer::Select(1), Answer::Confirm(false)]);
//! assert_eq!(prompter.select("pick", &[Choice::new("a"), Choice::new("b")]).unwrap(), 1);
//! assert!(!prompter.confirm("sure?", true).unwrap());
//! assert!(prompter.is_exhausted());
//! ```

use std::collections::VecDeque;

use super::prompts::{Choice, PromptError, Prompter};

/// A queued answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Select(usize),
    Multi(Vec<usize>),
    Confirm(bool),
    Secret(String),
    /// The user pressed Esc at this prompt.
    Cancel,
}

impl Answer {
    pub fn text(s: impl Into<String>) -> Self {
        Answer::Text(s.into())
    }

    fn kind(&self) -> &'static str {
        match self {
            Answer::Text(_) => "text",
            Answer::Select(_) => "select",
            Answer::Multi(_) => "multiselect",
            Answer::Confirm(_) => "confirm",
            Answer::Secret(_) => "secret",
            Answer::Cancel => "cancel",
        }
    }
}

/// Replays answers in order and records every prompt message.
///
/// Running out of answers behaves like a non-interactive session.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Messages of every prompt shown so far, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    pub fn is_exhausted(&self) -> bool {
        self.answers.is_empty()
    }

    fn next(&mut self, message: &str, expected: &'static str) -> Result<Answer, PromptError> {
        self.asked.push(message.to_string());
        match self.answers.pop_front() {
            None => Err(PromptError::NotInteractive),
            Some(Answer::Cancel) => Err(PromptError::Cancelled),
            Some(answer) if answer.kind() == expected => Ok(answer),
            Some(answer) => Err(PromptError::Io(format!(
                "scripted {} answer given to {} prompt '{}'",
                answer.kind(),
                expected,
                message
            ))),
        }
    }
}

fn check_index(index: usize, choices: &[Choice]) -> Result<usize, PromptError> {
    if index < choices.len() {
        Ok(index)
    } else {
        Err(PromptError::Io(format!(
            "scripted index {} out of range for {} choices",
            index,
            choices.len()
        )))
    }
}

impl Prompter for ScriptedPrompter {
    fn text(&mut self, message: &str, _placeholder: Option<&str>) -> Result<String, PromptError> {
        match self.next(message, "text")? {
            Answer::Text(s) => Ok(s),
            _ => unreachable!("kind checked in next"),
        }
    }

    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<usize, PromptError> {
        match self.next(message, "select")? {
            Answer::Select(i) => check_index(i, choices),
            _ => unreachable!("kind checked in next"),
        }
    }

    fn multiselect(
        &mut self,
        message: &str,
        choices: &[Choice],
    ) -> Result<Vec<usize>, PromptError> {
        match self.next(message, "multiselect")? {
            Answer::Multi(mut picked) => {
                for i in &picked {
                    check_index(*i, choices)?;
                }
                picked.sort_unstable();
                picked.dedup();
                Ok(picked)
            }
            _ => unreachable!("kind checked in next"),
        }
    }

    fn confirm(&mut self, message: &str, _default: bool) -> Result<bool, PromptError> {
        match self.next(message, "confirm")? {
            Answer::Confirm(b) => Ok(b),
            _ => unreachable!("kind checked in next"),
        }
    }

    fn secret(&mut self, message: &str) -> Result<String, PromptError> {
        match self.next(message, "secret")? {
            Answer::Secret(s) => Ok(s),
            _ => unreachable!("kind checked in next"),
        }
    }
}
