//! auth::errors
//!
//! Authentication error types for the Spotify OAuth flow.
//!
//! Error messages never contain token values or the client secret.
//!
//! # Example
//!
//! ```
//! use commit_vibes::auth::AuthError;
//!
//! let err = AuthError::NotAuthenticated;
//! assert!(err.to_string().contains("--spotify"));
//! ```

use thiserror::Error;

/// Errors from authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No client ID / client secret available.
    #[error("Spotify is not configured. Set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET, or run 'commit-vibes --spotify' to enter them.")]
    NotConfigured,

    /// No token file exists.
    #[error("not connected to Spotify. Run 'commit-vibes --spotify' to connect.")]
    NotAuthenticated,

    /// The refresh token was rejected or the one refresh attempt is spent.
    #[error("Spotify token expired. Please reconnect with --spotify")]
    Expired,

    /// Token refresh failed for a reason other than expiry.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// The callback carried a different `state` than the one we sent.
    #[error("state mismatch in OAuth callback")]
    StateMismatch,

    /// The user declined on the consent page.
    #[error("authorization denied: {0}")]
    Denied(String),

    /// No callback arrived in time.
    #[error("timed out waiting for the Spotify authorization callback")]
    CallbackTimeout,

    /// Could not run the local callback listener.
    #[error("callback listener error: {0}")]
    Listener(String),

    /// Failed to acquire the refresh lock.
    #[error("failed to acquire auth lock: {0}")]
    LockError(String),

    /// Lock acquisition timed out.
    #[error("auth lock timeout - another process may be refreshing tokens")]
    LockTimeout,

    /// Token bundle is invalid or cannot be parsed.
    #[error("invalid token file: {0}")]
    InvalidBundle(String),

    /// Error from secret storage.
    #[error("secret store error: {0}")]
    SecretStore(String),

    /// Network error during authentication.
    #[error("network error: {0}")]
    Network(String),

    /// Error response from the Spotify accounts service.
    #[error("Spotify accounts error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from Spotify
        message: String,
    },
}

impl AuthError {
    /// Check if this error can be resolved by running `--spotify` again.
    pub fn needs_reauth(&self) -> bool {
        matches!(
            self,
            AuthError::NotAuthenticated | AuthError::Expired | AuthError::InvalidBundle(_)
        )
    }
}

impl From<crate::secrets::SecretError> for AuthError {
    fn from(err: crate::secrets::SecretError) -> Self {
        AuthError::SecretStore(err.to_string())
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        // Strip the URL: it can carry the authorization code.
        AuthError::Network(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::InvalidBundle(err.to_string())
    }
}
