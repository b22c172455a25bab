//! music
//!
//! Where the "Now playing" line comes from.
//!
//! The engine only sees the [`MusicService`] trait. [`SpotifyService`] talks
//! to the Spotify Web API; [`DemoMusic`] serves fabricated data for `--demo`.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use commit_vibes::music::{MusicService, SpotifyClient, SpotifyService};
//!
//! let service = SpotifyService::new(SpotifyClient::new(Arc::new(auth_manager)));
//! let now = service.now_playing().await?;
//! ```

mod demo;
mod spotify;
mod types;

pub use demo::{DemoMusic, FixedMusic};
pub use spotify::{SpotifyClient, SpotifyService, DEFAULT_API_BASE, RECENT_LIMIT};
pub use types::{format_relative_time, MusicError, MusicService};
