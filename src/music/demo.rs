//! music::demo
//!
//! Offline music sources: the fabricated data shown by `--demo`, and a
//! fixed-answer source for tests.
//!
//! # Example
//!
//! ```
//! use commit_vibes::core::types::NowPlaying;
//! use commit_vibes::music::{DemoMusic, MusicService};
//!
//! # tokio_test::block_on(async {
//! let music = DemoMusic::new();
//! match music.now_playing().await.unwrap() {
//!     NowPlaying::Playing(track) => assert_eq!(track.name, "Demo Song"),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! # });
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use super::types::{MusicError, MusicService};
use crate::core::types::{NowPlaying, RecentTrack, Track};

/// Fabricated music data. Never touches the network.
#[derive(Debug, Clone, Default)]
pub struct DemoMusic {
    nothing_playing: bool,
}

impl DemoMusic {
    /// "Demo Song" by "Demo Artist" is playing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Nothing playing; "Old Demo Song" was played two hours ago.
    pub fn nothing_playing() -> Self {
        Self {
            nothing_playing: true,
        }
    }
}

#[async_trait]
impl MusicService for DemoMusic {
    fn name(&self) -> &'static str {
        "Demo"
    }

    async fn now_playing(&self) -> Result<NowPlaying, MusicError> {
        if self.nothing_playing {
            return Ok(NowPlaying::Recent(vec![RecentTrack {
                track: Track::new("Old Demo Song", "Old Demo Artist"),
                played_at: Utc::now() - Duration::hours(2),
            }]));
        }
        Ok(NowPlaying::Playing(Track::new("Demo Song", "Demo Artist")))
    }
}

/// Answers every call with the same result and counts the calls.
#[derive(Debug, Clone)]
pub struct FixedMusic {
    result: Result<NowPlaying, MusicError>,
    calls: Arc<Mutex<usize>>,
}

impl FixedMusic {
    pub fn new(result: Result<NowPlaying, MusicError>) -> Self {
        Self {
            result,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// How many times `now_playing` ran.
    pub fn calls(&self) -> usize {
        self.calls.lock().map(|c| *c).unwrap_or(0)
    }
}

#[async_trait]
impl MusicService for FixedMusic {
    fn name(&self) -> &'static str {
        "Fixed"
    }

    async fn now_playing(&self) -> Result<NowPlaying, MusicError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }
        self.result.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::format_relative_time;

    #[tokio::test]
    async fn nothing_playing_demo_has_one_recent_track() {
        let music = DemoMusic::nothing_playing();
        match music.now_playing().await.unwrap() {
            NowPlaying::Recent(tracks) => {
                assert_eq!(tracks.len(), 1);
                assert_eq!(tracks[0].track, Track::new("Old Demo Song", "Old Demo Artist"));
                assert_eq!(
                    format_relative_time(tracks[0].played_at, Utc::now()),
                    "2 hours ago"
                );
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn fixed_music_counts_calls() {
        let music = FixedMusic::new(Err(MusicError::AuthExpired));
        let handle = music.clone();

        tokio_test::block_on(async {
            assert!(matches!(
                music.now_playing().await,
                Err(MusicError::AuthExpired)
            ));
            assert!(music.now_playing().await.is_err());
        });

        assert_eq!(handle.calls(), 2);
    }
}
