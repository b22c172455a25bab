//! auth - Spotify OAuth authentication
//!
//! This module implements the Spotify authorization-code flow used by
//! `commit-vibes --spotify`, and the token handling every later run relies on.
//!
//! # Architecture
//!
//! The auth system:
//! - Opens the consent page and catches the redirect on a local listener
//! - Stores the token file through a [`SecretStore`](crate::secrets::SecretStore)
//! - Refreshes the access token at most once per run
//! - Guards refresh with a file lock so concurrent runs do not race
//! - Never exposes tokens in logs, errors, or outputs
//!
//! # Components
//!
//! - [`TokenBundle`] - JSON schema for stored OAuth tokens
//! - [`AuthLock`] - File-based lock for concurrent refresh protection
//! - [`TokenProvider`] - Trait for providing bearer tokens to the music client
//! - [`SpotifyAuthManager`] - Implementation of TokenProvider
//! - [`OAuthClient`] - HTTP client for the accounts service
//! - [`CallbackListener`] - One-shot redirect listener
//!
//! # Example
//!
//! ```ignore
//! use commit_vibes::auth::{OAuthClient, SpotifyAuthManager, TokenProvider};
//!
//! let manager = SpotifyAuthManager::new(store, paths.lock_path(), OAuthClient::new(creds));
//! let token = manager.bearer_token().await?;
//! ```

mod callback;
mod errors;
mod lock;
mod oauth;
mod provider;
mod token_bundle;

pub use callback::{CallbackListener, DEFAULT_CALLBACK_TIMEOUT};
pub use errors::AuthError;
pub use lock::{AuthLock, DEFAULT_LOCK_TIMEOUT};
pub use oauth::{OAuthClient, TokenResponse, DEFAULT_ACCOUNTS_BASE, SCOPES};
pub use provider::SpotifyAuthManager;
pub use token_bundle::{
    BundleTimestamps, TokenBundle, TokenInfo, EXPIRY_BUFFER_SECS, TOKEN_BUNDLE_KIND,
    TOKEN_BUNDLE_VERSION,
};

/// Trait for providing bearer tokens to the music client.
///
/// # Implementation Notes
///
/// Implementors must:
/// - Refresh at most once per instance
/// - Acquire the auth lock before refreshing
/// - Re-read the stored token after taking the lock
/// - Never log or expose token values
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a usable bearer token.
    ///
    /// Refreshes first if the stored expiry has passed.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotAuthenticated`] if no token exists
    /// - [`AuthError::Expired`] if the refresh token is dead
    /// - [`AuthError::LockTimeout`] if the auth lock cannot be acquired
    async fn bearer_token(&self) -> Result<String, AuthError>;

    /// Called after the API answered 401 for `rejected`.
    ///
    /// Returns a different token to retry with, or [`AuthError::Expired`]
    /// if the one refresh has already been spent.
    async fn refresh_after_rejection(&self, rejected: &str) -> Result<String, AuthError>;

    /// Check if a token file exists and parses. Does not refresh.
    fn is_authenticated(&self) -> bool;
}

/// Fresh random value for the OAuth `state` parameter.
pub fn new_state() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_bundle_kind_is_correct() {
        assert_eq!(TOKEN_BUNDLE_KIND, "commit-vibes.spotify-oauth");
    }

    #[test]
    fn token_bundle_version_is_one() {
        assert_eq!(TOKEN_BUNDLE_VERSION, 1);
    }

    #[test]
    fn state_values_are_unique_and_url_safe() {
        let a = new_state();
        let b = new_state();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn scopes_cover_current_and_recent() {
        assert!(SCOPES.contains("user-read-currently-playing"));
        assert!(SCOPES.contains("user-read-recently-played"));
    }
}
