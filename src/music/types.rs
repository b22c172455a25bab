//! music::types
//!
//! Music service trait and error type.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::auth::AuthError;
use crate::core::types::NowPlaying;

/// Errors from music service operations.
#[derive(Debug, Clone, Error)]
pub enum MusicError {
    /// No credentials or no token file.
    #[error("not connected to Spotify")]
    NotConnected,

    /// The token was rejected and the one refresh did not help.
    #[error("Spotify token expired. Please reconnect with --spotify")]
    AuthExpired,

    /// Authentication failed for some other reason (lock, corrupt file).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error.
    #[error("Spotify API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape.
    #[error("unexpected response from Spotify: {0}")]
    Decode(String),
}

impl From<AuthError> for MusicError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotAuthenticated | AuthError::NotConfigured => MusicError::NotConnected,
            AuthError::Expired | AuthError::RefreshFailed(_) => MusicError::AuthExpired,
            AuthError::Network(msg) => MusicError::Network(msg),
            other => MusicError::Auth(other.to_string()),
        }
    }
}

/// A source of "what is playing" information.
#[async_trait]
pub trait MusicService: Send + Sync {
    /// Short name for messages, e.g. "Spotify".
    fn name(&self) -> &'static str;

    /// The current track, else recent tracks, else nothing.
    async fn now_playing(&self) -> Result<NowPlaying, MusicError>;
}

/// Human-readable age of a play, e.g. `"5 mins ago"`.
///
/// Future timestamps (clock skew) read as `"just now"`.
pub fn format_relative_time(played_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - played_at).num_seconds();

    if secs < 60 {
        return "just now".to_string();
    }
    if secs < 3600 {
        return plural(secs / 60, "min");
    }
    if secs < 86_400 {
        return plural(secs / 3600, "hour");
    }
    plural(secs / 86_400, "day")
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}
