//! core::draft
//!
//! Commit message assembly.
//!
//! A draft is the user's message, then ` - <vibe label>`, then optionally
//! one music line separated by a blank line:
//!
//! ```text
//! fix: handle empty input - 😬 Feelin Nervous
//!
//! 🎵 Now playing: "Song - Artist"
//! ```
//!
//! The draft never carries terminal styling.

use super::types::Track;
use super::vibes::Vibe;

/// Separator between the message and the vibe label.
pub const VIBE_SEPARATOR: &str = " - ";

/// A commit message under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDraft {
    message: String,
}

impl CommitDraft {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Append ` - <label>`.
    pub fn with_vibe(mut self, vibe: &Vibe) -> Self {
        self.message.push_str(VIBE_SEPARATOR);
        self.message.push_str(&vibe.label);
        self
    }

    /// Append the line for a song that is playing right now.
    pub fn with_now_playing(self, track: &Track) -> Self {
        self.with_music_line("Now playing", track)
    }

    /// Append the line for the most recently played song.
    pub fn with_last_played(self, track: &Track) -> Self {
        self.with_music_line("Last played", track)
    }

    fn with_music_line(mut self, prefix: &str, track: &Track) -> Self {
        self.message
            .push_str(&format!("\n\n🎵 {}: \"{}\"", prefix, track));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }
}
