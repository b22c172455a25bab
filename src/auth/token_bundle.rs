//! auth::token_bundle
//!
//! Token file schema for Spotify OAuth tokens.
//!
//! # Security
//!
//! Tokens must never appear in logs, error messages, or debug output.
//! This module implements custom Debug to redact token values.
//!
//! # Example
//!
//! ```
//! use commit_vibes::auth::{TokenBundle, TokenInfo};
//!
//! let bundle = TokenBundle::new(TokenInfo::new("access".into(), Some(3600), "refresh".into(), None));
//! let json = bundle.to_json().unwrap();
//! let parsed = TokenBundle::parse(&json).unwrap();
//! assert_eq!(parsed.tokens.refresh_token, "refresh");
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::AuthError;

/// Kind identifier for token files.
pub const TOKEN_BUNDLE_KIND: &str = "commit-vibes.spotify-oauth";

/// Current schema version for token files.
pub const TOKEN_BUNDLE_VERSION: u32 = 1;

/// Refresh proactively when the access token has less than this left.
pub const EXPIRY_BUFFER_SECS: i64 = 60;

/// Contents of `spotify-tokens.json`.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenBundle {
    /// Bundle type identifier.
    pub kind: String,

    /// Schema version for forward compatibility.
    pub schema_version: u32,

    /// OAuth tokens.
    pub tokens: TokenInfo,

    /// Bundle timestamps.
    pub timestamps: BundleTimestamps,
}

/// OAuth token pair.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenInfo {
    pub access_token: String,

    pub refresh_token: String,

    /// When the access token expires, if the server said.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_expires_at: Option<DateTime<Utc>>,

    /// Granted scopes, space separated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Bundle creation and update timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleTimestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TokenBundle {
    /// Create a new token bundle.
    pub fn new(tokens: TokenInfo) -> Self {
        let now = Utc::now();
        Self {
            kind: TOKEN_BUNDLE_KIND.to_string(),
            schema_version: TOKEN_BUNDLE_VERSION,
            tokens,
            timestamps: BundleTimestamps {
                created_at: now,
                updated_at: now,
            },
        }
    }

    /// Check if the access token is known to be (nearly) expired.
    ///
    /// Without a recorded expiry this is always false; a rejected request
    /// is then the only refresh trigger.
    pub fn needs_refresh(&self) -> bool {
        match self.tokens.access_token_expires_at {
            Some(at) => Utc::now() >= at - Duration::seconds(EXPIRY_BUFFER_SECS),
            None => false,
        }
    }

    /// Parse a token bundle from JSON.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidBundle` if parsing fails or schema is invalid.
    pub fn parse(json: &str) -> Result<Self, AuthError> {
        let bundle: Self = serde_json::from_str(json)?;

        if bundle.kind != TOKEN_BUNDLE_KIND {
            return Err(AuthError::InvalidBundle(format!(
                "unexpected kind '{}', expected '{}'",
                bundle.kind, TOKEN_BUNDLE_KIND
            )));
        }

        if bundle.schema_version != TOKEN_BUNDLE_VERSION {
            return Err(AuthError::InvalidBundle(format!(
                "unsupported schema version {}, expected {}",
                bundle.schema_version, TOKEN_BUNDLE_VERSION
            )));
        }

        if bundle.tokens.access_token.is_empty() || bundle.tokens.refresh_token.is_empty() {
            return Err(AuthError::InvalidBundle("empty token".to_string()));
        }

        Ok(bundle)
    }

    /// Serialize the token bundle to JSON.
    pub fn to_json(&self) -> Result<String, AuthError> {
        serde_json::to_string_pretty(self).map_err(|e| AuthError::InvalidBundle(e.to_string()))
    }

    /// Copy of this bundle with new tokens and a fresh `updated_at`.
    pub fn with_refreshed_tokens(&self, tokens: TokenInfo) -> Self {
        Self {
            kind: self.kind.clone(),
            schema_version: self.schema_version,
            tokens,
            timestamps: BundleTimestamps {
                created_at: self.timestamps.created_at,
                updated_at: Utc::now(),
            },
        }
    }
}

impl TokenInfo {
    /// Create token info from an OAuth response.
    ///
    /// `expires_in` is seconds from now.
    pub fn new(
        access_token: String,
        expires_in: Option<u64>,
        refresh_token: String,
        scope: Option<String>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_token_expires_at: expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs as i64)),
            scope,
        }
    }
}

impl fmt::Debug for TokenBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBundle")
            .field("kind", &self.kind)
            .field("schema_version", &self.schema_version)
            .field("tokens", &self.tokens)
            .field("timestamps", &self.timestamps)
            .finish()
    }
}

impl fmt::Debug for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenInfo")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("access_token_expires_at", &self.access_token_expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}
