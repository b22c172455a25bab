//! core::types
//!
//! Plain domain types shared between the music layer and commit drafting.

use std::fmt;

use chrono::{DateTime, Utc};

/// A song as shown to the user and written into commit messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub name: String,
    /// First listed artist.
    pub artist: String,
}

impl Track {
    pub fn new(name: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artist: artist.into(),
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.artist)
    }
}

/// A track from listening history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentTrack {
    pub track: Track,
    pub played_at: DateTime<Utc>,
}

/// What the music service reports right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NowPlaying {
    Playing(Track),
    /// Nothing playing; most recent first.
    Recent(Vec<RecentTrack>),
    Nothing,
}

/// Which staging action the commit flow decided on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagePlan {
    /// Files were already staged.
    Nothing,
    All,
    Files(Vec<String>),
}
