//! ui::prompts
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! every prompt fails with [`PromptError::NotInteractive`] so callers can
//! report what input was missing.
//!
//! [`TerminalPrompter`] draws small raw-mode widgets on stderr when both
//! stdin and stderr are terminals. Otherwise it falls back to plain line
//! prompts (numbered choices, y/n), which also makes it scriptable through
//! a pipe.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{style, Color, Print, PrintStyledContent, Stylize};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use thiserror::Error;

/// Key poll interval for the raw-mode widgets.
const EVENT_POLL: Duration = Duration::from_millis(50);

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    Io(String),
}

impl From<io::Error> for PromptError {
    fn from(err: io::Error) -> Self {
        PromptError::Io(err.to_string())
    }
}

/// One option in a select or multiselect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub hint: Option<String>,
}

impl Choice {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            hint: None,
        }
    }

    pub fn with_hint(label: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            hint: Some(hint.into()),
        }
    }
}

/// Source of user answers.
///
/// Every method returns [`PromptError::Cancelled`] when the user backs out
/// (Esc, Ctrl-C, or end of input).
pub trait Prompter {
    /// Free text. `placeholder` is shown greyed out while the input is empty.
    fn text(&mut self, message: &str, placeholder: Option<&str>) -> Result<String, PromptError>;

    /// Pick exactly one choice; returns its index.
    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<usize, PromptError>;

    /// Pick any number of choices; returns their indices in ascending order.
    fn multiselect(&mut self, message: &str, choices: &[Choice])
        -> Result<Vec<usize>, PromptError>;

    /// Yes or no.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError>;

    /// Masked input.
    fn secret(&mut self, message: &str) -> Result<String, PromptError>;
}

/// Prompter backed by the real terminal.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompter {
    color: bool,
    interactive: bool,
}

impl TerminalPrompter {
    pub fn new(color: bool, interactive: bool) -> Self {
        Self { color, interactive }
    }

    fn ensure_interactive(&self) -> Result<(), PromptError> {
        if self.interactive {
            Ok(())
        } else {
            Err(PromptError::NotInteractive)
        }
    }

    fn use_widgets() -> bool {
        io::stdin().is_terminal() && io::stderr().is_terminal()
    }
}

impl Prompter for TerminalPrompter {
    fn text(&mut self, message: &str, placeholder: Option<&str>) -> Result<String, PromptError> {
        self.ensure_interactive()?;
        if !Self::use_widgets() {
            return fallback::text(message);
        }
        widgets::text(self.color, message, placeholder)
    }

    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<usize, PromptError> {
        self.ensure_interactive()?;
        if choices.is_empty() {
            return Err(PromptError::Io("nothing to choose from".to_string()));
        }
        if !Self::use_widgets() {
            return fallback::select(message, choices);
        }
        widgets::select(self.color, message, choices)
    }

    fn multiselect(
        &mut self,
        message: &str,
        choices: &[Choice],
    ) -> Result<Vec<usize>, PromptError> {
        self.ensure_interactive()?;
        if choices.is_empty() {
            return Ok(Vec::new());
        }
        if !Self::use_widgets() {
            return fallback::multiselect(message, choices);
        }
        widgets::multiselect(self.color, message, choices)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError> {
        self.ensure_interactive()?;
        if !Self::use_widgets() {
            return fallback::confirm(message, default);
        }
        widgets::confirm(self.color, message, default)
    }

    fn secret(&mut self, message: &str) -> Result<String, PromptError> {
        self.ensure_interactive()?;
        if !Self::use_widgets() {
            return fallback::text(message);
        }
        let value = rpassword::prompt_password(format!("◆ {}: ", message))?;
        Ok(value.trim().to_string())
    }
}

/// Parse a 1-based number list such as `"1, 3 4"`.
///
/// `None` if any entry is not a number in `1..=len`.
fn parse_selection(input: &str, len: usize) -> Option<Vec<usize>> {
    let mut picked = Vec::new();
    for part in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
    {
        let n: usize = part.parse().ok()?;
        if n == 0 || n > len {
            return None;
        }
        picked.push(n - 1);
    }
    picked.sort_unstable();
    picked.dedup();
    Some(picked)
}

/// `Some(answer)` for y/yes/n/no, `default` for empty input.
fn parse_yes_no(input: &str, default: bool) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Line-based prompts for pipes and dumb terminals.
mod fallback {
    use super::*;

    fn read_line() -> Result<String, PromptError> {
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            eprintln!();
            return Err(PromptError::Cancelled);
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    fn ask(prompt: &str) -> Result<String, PromptError> {
        eprint!("{}", prompt);
        io::stderr().flush()?;
        read_line()
    }

    fn list(message: &str, choices: &[Choice]) {
        eprintln!("◆ {}", message);
        for (idx, choice) in choices.iter().enumerate() {
            match &choice.hint {
                Some(hint) => eprintln!("  {}. {} ({})", idx + 1, choice.label, hint),
                None => eprintln!("  {}. {}", idx + 1, choice.label),
            }
        }
    }

    pub(super) fn text(message: &str) -> Result<String, PromptError> {
        ask(&format!("◆ {}: ", message))
    }

    pub(super) fn select(message: &str, choices: &[Choice]) -> Result<usize, PromptError> {
        list(message, choices);
        loop {
            let line = ask("  pick (empty to cancel): ")?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return Err(PromptError::Cancelled);
            }
            match parse_selection(trimmed, choices.len()) {
                Some(picked) if picked.len() == 1 => return Ok(picked[0]),
                _ => eprintln!("  enter one number from 1 to {}", choices.len()),
            }
        }
    }

    pub(super) fn multiselect(
        message: &str,
        choices: &[Choice],
    ) -> Result<Vec<usize>, PromptError> {
        list(message, choices);
        loop {
            let line = ask("  pick numbers, separated by spaces (empty for none): ")?;
            match parse_selection(&line, choices.len()) {
                Some(picked) => return Ok(picked),
                None => eprintln!("  numbers must be between 1 and {}", choices.len()),
            }
        }
    }

    pub(super) fn confirm(message: &str, default: bool) -> Result<bool, PromptError> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let line = ask(&format!("◆ {} ({}): ", message, hint))?;
            match parse_yes_no(&line, default) {
                Some(answer) => return Ok(answer),
                None => eprintln!("  answer y or n"),
            }
        }
    }
}

/// Raw-mode widgets drawn on stderr.
mod widgets {
    use super::*;
    use unicode_width::UnicodeWidthStr;

    /// Raw mode lifetime guard so terminal state is restored on any return path.
    struct RawModeGuard;

    impl RawModeGuard {
        fn acquire() -> io::Result<Self> {
            terminal::enable_raw_mode()?;
            Ok(Self)
        }
    }

    impl Drop for RawModeGuard {
        fn drop(&mut self) {
            let _ = terminal::disable_raw_mode();
        }
    }

    struct Line {
        text: String,
        fg: Option<Color>,
        bold: bool,
    }

    impl Line {
        fn plain(text: impl Into<String>) -> Self {
            Self {
                text: text.into(),
                fg: None,
                bold: false,
            }
        }

        fn colored(text: impl Into<String>, fg: Color) -> Self {
            Self {
                text: text.into(),
                fg: Some(fg),
                bold: false,
            }
        }

        fn title(message: &str) -> Self {
            Self {
                text: format!("◆ {}", message),
                fg: Some(Color::Cyan),
                bold: true,
            }
        }
    }

    /// The block of rows a widget owns, redrawn in place.
    struct Surface {
        stderr: io::Stderr,
        color: bool,
        /// Rows above the cursor that belong to the widget.
        rows: usize,
    }

    impl Surface {
        fn new(color: bool) -> Self {
            Self {
                stderr: io::stderr(),
                color,
                rows: 0,
            }
        }

        fn rewind(&mut self) -> io::Result<()> {
            if self.rows > 0 {
                self.stderr.queue(MoveUp(self.rows as u16))?;
            }
            self.stderr.queue(MoveToColumn(0))?;
            self.stderr.queue(Clear(ClearType::FromCursorDown))?;
            Ok(())
        }

        fn draw(&mut self, lines: &[Line]) -> io::Result<()> {
            self.rewind()?;
            let cols = terminal::size().map(|(c, _)| c as usize).unwrap_or(80).max(1);
            let mut total = 0usize;
            for (idx, line) in lines.iter().enumerate() {
                if idx > 0 {
                    self.stderr.queue(Print("\r\n"))?;
                }
                total += wrapped_rows(&line.text, cols);
                match (self.color, line.fg) {
                    (true, Some(fg)) => {
                        let styled = style(line.text.as_str()).with(fg);
                        let styled = if line.bold { styled.bold() } else { styled };
                        self.stderr.queue(PrintStyledContent(styled))?;
                    }
                    _ => {
                        self.stderr.queue(Print(&line.text))?;
                    }
                }
            }
            self.stderr.flush()?;
            self.rows = total.saturating_sub(1);
            Ok(())
        }

        fn clear(&mut self) -> io::Result<()> {
            self.rewind()?;
            self.stderr.flush()?;
            self.rows = 0;
            Ok(())
        }

        /// Replace the widget with a one-line record of the answer.
        fn finish(&mut self, message: &str, answer: &str) -> io::Result<()> {
            self.rewind()?;
            let record = format!("◇ {} · {}", message, answer);
            if self.color {
                self.stderr
                    .queue(PrintStyledContent(style(record.as_str()).with(Color::DarkGrey)))?;
            } else {
                self.stderr.queue(Print(&record))?;
            }
            self.stderr.queue(Print("\r\n"))?;
            self.stderr.flush()?;
            self.rows = 0;
            Ok(())
        }
    }

    /// Terminal rows `text` occupies at `cols` columns. Emoji count as two.
    pub(super) fn wrapped_rows(text: &str, cols: usize) -> usize {
        UnicodeWidthStr::width(text).div_ceil(cols.max(1)).max(1)
    }

    fn next_key() -> io::Result<Option<KeyEvent>> {
        if !event::poll(EVENT_POLL)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press || key.kind == KeyEventKind::Repeat => {
                Ok(Some(key))
            }
            _ => Ok(None),
        }
    }

    fn is_cancel(key: &KeyEvent) -> bool {
        key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
    }

    fn move_up(selected: usize, len: usize) -> usize {
        if selected == 0 {
            len.saturating_sub(1)
        } else {
            selected - 1
        }
    }

    pub(super) fn text(
        color: bool,
        message: &str,
        placeholder: Option<&str>,
    ) -> Result<String, PromptError> {
        let _guard = RawModeGuard::acquire()?;
        let mut surface = Surface::new(color);
        let mut buffer = String::new();
        let mut dirty = true;

        loop {
            if dirty {
                let input = if buffer.is_empty() {
                    Line::colored(format!("  {}", placeholder.unwrap_or("")), Color::DarkGrey)
                } else {
                    Line::plain(format!("  {}", buffer))
                };
                surface.draw(&[Line::title(message), input])?;
                dirty = false;
            }

            let Some(key) = next_key()? else {
                continue;
            };
            if is_cancel(&key) {
                surface.clear()?;
                return Err(PromptError::Cancelled);
            }
            match key.code {
                KeyCode::Enter => {
                    surface.finish(message, &buffer)?;
                    return Ok(buffer);
                }
                KeyCode::Backspace => {
                    buffer.pop();
                    dirty = true;
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    buffer.push(c);
                    dirty = true;
                }
                _ => {}
            }
        }
    }

    pub(super) fn select(
        color: bool,
        message: &str,
        choices: &[Choice],
    ) -> Result<usize, PromptError> {
        let _guard = RawModeGuard::acquire()?;
        let mut surface = Surface::new(color);
        let mut selected = 0usize;
        let mut dirty = true;

        loop {
            if dirty {
                let mut lines = vec![Line::title(message)];
                for (idx, choice) in choices.iter().enumerate() {
                    if idx == selected {
                        let hint = choice
                            .hint
                            .as_ref()
                            .map(|h| format!(" ({})", h))
                            .unwrap_or_default();
                        lines.push(Line::colored(
                            format!("  ● {}{}", choice.label, hint),
                            Color::Green,
                        ));
                    } else {
                        lines.push(Line::plain(format!("  ○ {}", choice.label)));
                    }
                }
                surface.draw(&lines)?;
                dirty = false;
            }

            let Some(key) = next_key()? else {
                continue;
            };
            if is_cancel(&key) {
                surface.clear()?;
                return Err(PromptError::Cancelled);
            }
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    selected = move_up(selected, choices.len());
                    dirty = true;
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    selected = (selected + 1) % choices.len();
                    dirty = true;
                }
                KeyCode::Enter => {
                    surface.finish(message, &choices[selected].label)?;
                    return Ok(selected);
                }
                _ => {}
            }
        }
    }

    pub(super) fn multiselect(
        color: bool,
        message: &str,
        choices: &[Choice],
    ) -> Result<Vec<usize>, PromptError> {
        let _guard = RawModeGuard::acquire()?;
        let mut surface = Surface::new(color);
        let mut active = 0usize;
        let mut checked = vec![false; choices.len()];
        let mut dirty = true;

        loop {
            if dirty {
                let mut lines = vec![
                    Line::title(message),
                    Line::colored("  ↑/↓ move · space toggle · enter confirm", Color::DarkGrey),
                ];
                for (idx, choice) in choices.iter().enumerate() {
                    let pointer = if idx == active { "›" } else { " " };
                    let mark = if checked[idx] { "◼" } else { "◻" };
                    let text = format!("  {} {} {}", pointer, mark, choice.label);
                    lines.push(if idx == active {
                        Line::colored(text, Color::Green)
                    } else {
                        Line::plain(text)
                    });
                }
                surface.draw(&lines)?;
                dirty = false;
            }

            let Some(key) = next_key()? else {
                continue;
            };
            if is_cancel(&key) {
                surface.clear()?;
                return Err(PromptError::Cancelled);
            }
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    active = move_up(active, choices.len());
                    dirty = true;
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    active = (active + 1) % choices.len();
                    dirty = true;
                }
                KeyCode::Char(' ') => {
                    checked[active] = !checked[active];
                    dirty = true;
                }
                KeyCode::Enter => {
                    let picked: Vec<usize> = (0..choices.len()).filter(|i| checked[*i]).collect();
                    surface.finish(message, &format!("{} selected", picked.len()))?;
                    return Ok(picked);
                }
                _ => {}
            }
        }
    }

    pub(super) fn confirm(color: bool, message: &str, default: bool) -> Result<bool, PromptError> {
        let _guard = RawModeGuard::acquire()?;
        let mut surface = Surface::new(color);
        let mut answer = default;
        let mut dirty = true;

        loop {
            if dirty {
                let (yes, no) = if answer { ("●", "○") } else { ("○", "●") };
                surface.draw(&[
                    Line::title(message),
                    Line::plain(format!("  {} Yes / {} No", yes, no)),
                ])?;
                dirty = false;
            }

            let Some(key) = next_key()? else {
                continue;
            };
            if is_cancel(&key) {
                surface.clear()?;
                return Err(PromptError::Cancelled);
            }
            match key.code {
                KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                    answer = !answer;
                    dirty = true;
                }
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    surface.finish(message, "Yes")?;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    surface.finish(message, "No")?;
                    return Ok(false);
                }
                KeyCode::Enter => {
                    surface.finish(message, if answer { "Yes" } else { "No" })?;
                    return Ok(answer);
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_glyphs_count_two_columns() {
        // "😌 Feelin Confident" is 18 chars but 19 columns wide.
        assert_eq!(widgets::wrapped_rows("😌 Feelin Confident", 19), 1);
        assert_eq!(widgets::wrapped_rows("😌 Feelin Confident", 18), 2);
        assert_eq!(widgets::wrapped_rows("💀💀💀", 5), 2);
        assert_eq!(widgets::wrapped_rows("", 80), 1);
    }

    #[test]
    fn non_interactive_prompts_fail() {
        let mut prompter = TerminalPrompter::new(false, false);
        assert!(matches!(
            prompter.confirm("ok?", true),
            Err(PromptError::NotInteractive)
        ));
        assert!(matches!(
            prompter.text("msg", None),
            Err(PromptError::NotInteractive)
        ));
        assert!(matches!(
            prompter.select("pick", &[Choice::new("a")]),
            Err(PromptError::NotInteractive)
        ));
    }

    #[test]
    fn parse_selection_accepts_commas_and_spaces() {
        assert_eq!(parse_selection("1, 3 2", 3), Some(vec![0, 1, 2]));
        assert_eq!(parse_selection("2 2", 3), Some(vec![1]));
        assert_eq!(parse_selection("", 3), Some(vec![]));
    }

    #[test]
    fn parse_selection_rejects_out_of_range() {
        assert_eq!(parse_selection("0", 3), None);
        assert_eq!(parse_selection("4", 3), None);
        assert_eq!(parse_selection("x", 3), None);
    }

    #[test]
    fn parse_yes_no_variants() {
        assert_eq!(parse_yes_no("", true), Some(true));
        assert_eq!(parse_yes_no("", false), Some(false));
        assert_eq!(parse_yes_no("Y", false), Some(true));
        assert_eq!(parse_yes_no("no", true), Some(false));
        assert_eq!(parse_yes_no("maybe", true), None);
    }

    #[test]
    fn choice_constructors() {
        assert_eq!(Choice::new("a").hint, None);
        assert_eq!(Choice::with_hint("a", "b").hint.as_deref(), Some("b"));
    }
}
