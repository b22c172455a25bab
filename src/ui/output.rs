//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! Styling is applied only at print time; strings handed to git never
//! carry escape codes.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use crossterm::style::{style, Color, Stylize};

use crate::core::types::{RecentTrack, Track};
use crate::music::format_relative_time;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Styled, verbosity-aware printer.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    verbosity: Verbosity,
    color: bool,
}

impl Output {
    pub fn new(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn color(&self) -> bool {
        self.color
    }

    fn quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    fn paint(&self, text: &str, fg: Color, bold: bool) -> String {
        if !self.color {
            return text.to_string();
        }
        let styled = style(text).with(fg);
        if bold {
            styled.bold().to_string()
        } else {
            styled.to_string()
        }
    }

    /// Print a message (respects quiet mode).
    pub fn print(&self, message: impl Display) {
        if !self.quiet() {
            println!("{}", message);
        }
    }

    /// Print a debug message (only in debug mode).
    pub fn debug(&self, message: impl Display) {
        if self.verbosity == Verbosity::Debug {
            eprintln!("[debug] {}", message);
        }
    }

    /// Print an error message (always shown).
    pub fn error(&self, message: impl Display) {
        eprintln!("{}", self.paint(&message.to_string(), Color::Red, false));
    }

    /// Print a warning message (respects quiet mode).
    pub fn warn(&self, message: impl Display) {
        if !self.quiet() {
            eprintln!("{}", self.paint(&message.to_string(), Color::Yellow, false));
        }
    }

    /// Print a success message (respects quiet mode).
    pub fn success(&self, message: impl Display) {
        self.print(self.paint(&message.to_string(), Color::Green, false));
    }

    pub fn info(&self, message: impl Display) {
        self.print(self.paint(&message.to_string(), Color::Blue, false));
    }

    pub fn heading(&self, message: impl Display) {
        self.print(self.paint(&message.to_string(), Color::Cyan, false));
    }

    pub fn dim(&self, message: impl Display) {
        self.print(self.paint(&message.to_string(), Color::DarkGrey, false));
    }

    /// Yellow banner line, e.g. the demo mode notice.
    pub fn banner(&self, message: impl Display) {
        self.print(self.paint(&message.to_string(), Color::Yellow, false));
    }

    pub fn intro(&self) {
        self.print(self.paint("Welcome to Commit Vibes!", Color::Blue, true));
    }

    pub fn staged_files(&self, files: &[String]) {
        self.print(self.paint("\n📂 Staged files:", Color::Green, false));
        self.dim(format_list(files, " - "));
    }

    pub fn now_playing(&self, track: &Track) {
        self.print(self.paint("\n🎵 Now Playing:", Color::Blue, false));
        self.dim(format!("  {}", track));
    }

    pub fn recent_tracks(&self, tracks: &[RecentTrack], now: DateTime<Utc>) {
        self.print(self.paint("\n🎵 No song currently playing", Color::Blue, false));
        self.dim("Recent tracks:");
        for line in recent_track_lines(tracks, now) {
            self.dim(line);
        }
    }

    pub fn final_message(&self, title: &str, message: &str) {
        self.print(self.paint(&format!("\n📝 {}", title), Color::Blue, true));
        self.print(self.paint(&format!("\"{}\"\n", message), Color::Cyan, false));
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `  • "name" - artist (5 mins ago)` for each track.
pub fn recent_track_lines(tracks: &[RecentTrack], now: DateTime<Utc>) -> Vec<String> {
    tracks
        .iter()
        .map(|r| {
            format!(
                "  • \"{}\" - {} ({})",
                r.track.name,
                r.track.artist,
                format_relative_time(r.played_at, now)
            )
        })
        .collect()
}
