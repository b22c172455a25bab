//! core::paths
//!
//! Centralized path routing for per-user storage.
//!
//! # Storage Layout
//!
//! Everything lives under one app directory, `$COMMIT_VIBES_HOME` if set,
//! otherwise `~/.commit-vibes/`:
//! - `spotify-tokens.json` - OAuth token bundle
//! - `spotify.lock` - Refresh lock
//! - `config.toml` - Canonical config write location
//!
//! # Example
//!
//! ```
//! use commit_vibes::core::paths::AppPaths;
//! use std::path::PathBuf;
//!
//! let paths = AppPaths::new(PathBuf::from("/home/me/.commit-vibes"));
//! assert_eq!(
//!     paths.token_path(),
//!     PathBuf::from("/home/me/.commit-vibes/spotify-tokens.json")
//! );
//! ```

use std::path::{Path, PathBuf};

use super::config::ConfigError;

/// Environment variable overriding the app directory.
pub const HOME_ENV: &str = "COMMIT_VIBES_HOME";

/// Name of the app directory under `$HOME`.
const APP_DIR_NAME: &str = ".commit-vibes";

/// Per-user storage locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    root: PathBuf,
}

impl AppPaths {
    /// Create paths rooted at an explicit directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve the app directory from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDir`] if neither `$COMMIT_VIBES_HOME`
    /// nor a home directory is available.
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(PathBuf::from(dir)));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::new(home.join(APP_DIR_NAME)))
    }

    /// The app directory itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Token bundle file.
    pub fn token_path(&self) -> PathBuf {
        self.root.join("spotify-tokens.json")
    }

    /// Lock file guarding token refresh.
    pub fn lock_path(&self) -> PathBuf {
        self.root.join("spotify.lock")
    }

    /// Canonical config file.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }
}
