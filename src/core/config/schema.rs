//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Values are validated after parsing (the redirect URI must be a plain
//! `http` URL the local callback listener can bind).

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// [spotify]
/// client_id = "abc123"
/// client_secret = "shh"
/// redirect_uri = "http://127.0.0.1:3000/callback"
///
/// [ui]
/// color = true
///
/// [vibes]
/// custom = "/home/me/vibes.json"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Spotify application credentials
    pub spotify: Option<SpotifyConfig>,

    /// Terminal presentation
    pub ui: Option<UiConfig>,

    /// Vibe catalog extensions
    pub vibes: Option<VibesConfig>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(spotify) = &self.spotify {
            spotify.validate()?;
        }
        if let Some(vibes) = &self.vibes {
            if vibes.custom.as_deref().is_some_and(|p| p.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(
                    "vibes.custom cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Spotify application settings.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
}

impl SpotifyConfig {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(uri) = &self.redirect_uri {
            validate_redirect_uri(uri)?;
        }
        for (name, value) in [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(format!(
                    "spotify.{} cannot be empty",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Terminal presentation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct UiConfig {
    /// Styled output (default: true)
    pub color: Option<bool>,
}

/// Vibe catalog settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct VibesConfig {
    /// Path to a custom vibes JSON file, loaded on every run
    pub custom: Option<String>,
}

/// Check that a redirect URI can be served by the local callback listener.
///
/// Accepts `http://host[:port][/path]` with a non-empty host.
pub fn validate_redirect_uri(uri: &str) -> Result<(), ConfigError> {
    let rest = uri.strip_prefix("http://").ok_or_else(|| {
        ConfigError::InvalidValue(format!(
            "redirect URI '{}' must start with http:// (the callback is served locally)",
            uri
        ))
    })?;

    let authority = rest.split('/').next().unwrap_or_default();
    let host = match authority.rsplit_once(':') {
        Some((host, port)) => {
            port.parse::<u16>().map_err(|_| {
                ConfigError::InvalidValue(format!("redirect URI '{}' has an invalid port", uri))
            })?;
            host
        }
        None => authority,
    };

    if host.is_empty() {
        return Err(ConfigError::InvalidValue(format!(
            "redirect URI '{}' has no host",
            uri
        )));
    }
    Ok(())
}
