//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Environment (`SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET`, `SPOTIFY_REDIRECT_URI`)
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$COMMIT_VIBES_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/commit-vibes/config.toml`
//! 3. `~/.commit-vibes/config.toml` (canonical write location)

pub mod schema;

pub use schema::{GlobalConfig, SpotifyConfig, UiConfig, VibesConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::paths::AppPaths;

/// Default OAuth redirect URI; the callback listener binds its port.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000";

pub const CONFIG_ENV: &str = "COMMIT_VIBES_CONFIG";
pub const CLIENT_ID_ENV: &str = "SPOTIFY_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "SPOTIFY_CLIENT_SECRET";
pub const REDIRECT_URI_ENV: &str = "SPOTIFY_REDIRECT_URI";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Resolved Spotify application credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl std::fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Values taken from the process environment at load time.
#[derive(Debug, Clone, Default)]
struct EnvOverrides {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
}

impl EnvOverrides {
    fn capture(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            client_id: get(CLIENT_ID_ENV),
            client_secret: get(CLIENT_SECRET_ENV),
            redirect_uri: get(REDIRECT_URI_ENV),
        }
    }
}

/// Merged configuration from all sources.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration file contents
    pub global: GlobalConfig,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    env: EnvOverrides,
}

impl Config {
    /// Load configuration from default locations and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed, or if
    /// a resolved value fails validation. A missing file is not an error.
    pub fn load(paths: &AppPaths) -> Result<Config, ConfigError> {
        Self::load_with(paths, &|key: &str| std::env::var(key).ok())
    }

    /// Load configuration using an explicit environment lookup.
    pub fn load_with(
        paths: &AppPaths,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Config, ConfigError> {
        let (global, global_path) = Self::load_global(paths, lookup)?;
        global.validate()?;

        let env = EnvOverrides::capture(lookup);
        if let Some(uri) = &env.redirect_uri {
            schema::validate_redirect_uri(uri)?;
        }

        Ok(Config {
            global,
            global_path,
            env,
        })
    }

    /// Build a config from an in-memory global config (no environment).
    pub fn from_global(global: GlobalConfig) -> Config {
        Config {
            global,
            ..Default::default()
        }
    }

    fn load_global(
        paths: &AppPaths,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<(GlobalConfig, Option<PathBuf>), ConfigError> {
        let mut candidates = Vec::new();
        if let Some(path) = lookup(CONFIG_ENV).filter(|v| !v.is_empty()) {
            candidates.push(PathBuf::from(path));
        }
        if let Some(xdg_home) = lookup("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            candidates.push(PathBuf::from(xdg_home).join("commit-vibes/config.toml"));
        }
        candidates.push(paths.config_path());

        for path in candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config");
                let config = Self::read_global_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((GlobalConfig::default(), None))
    }

    /// Read and parse a global config file.
    fn read_global_config(path: &Path) -> Result<GlobalConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Where [`Config::write_global`] should write.
    ///
    /// The file that was loaded, otherwise the canonical location.
    pub fn write_target(&self, paths: &AppPaths) -> PathBuf {
        self.global_path
            .clone()
            .unwrap_or_else(|| paths.config_path())
    }

    /// Write global config atomically.
    ///
    /// Creates parent directories if needed. Uses atomic write
    /// (write to temp file, then rename) to prevent corruption.
    pub fn write_global(path: &Path, config: &GlobalConfig) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        // The file may carry the client secret.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| ConfigError::WriteError {
                    path: temp_path.clone(),
                    source: e,
                })?;
        }

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Resolve Spotify credentials.
    ///
    /// Returns `None` unless both a client ID and a client secret are
    /// available from the environment or the config file.
    pub fn spotify_credentials(&self) -> Option<SpotifyCredentials> {
        let file = self.global.spotify.as_ref();
        let client_id = self
            .env
            .client_id
            .clone()
            .or_else(|| file.and_then(|s| s.client_id.clone()))?;
        let client_secret = self
            .env
            .client_secret
            .clone()
            .or_else(|| file.and_then(|s| s.client_secret.clone()))?;

        Some(SpotifyCredentials {
            client_id,
            client_secret,
            redirect_uri: self.redirect_uri(),
        })
    }

    /// OAuth redirect URI.
    ///
    /// Defaults to `http://localhost:3000`.
    pub fn redirect_uri(&self) -> String {
        self.env
            .redirect_uri
            .clone()
            .or_else(|| {
                self.global
                    .spotify
                    .as_ref()
                    .and_then(|s| s.redirect_uri.clone())
            })
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string())
    }

    /// Whether styled output is enabled.
    ///
    /// Defaults to `true` if not configured.
    pub fn color(&self) -> bool {
        self.global
            .ui
            .as_ref()
            .and_then(|u| u.color)
            .unwrap_or(true)
    }

    /// Path of a custom vibes file to load on every run.
    pub fn custom_vibes(&self) -> Option<PathBuf> {
        self.global
            .vibes
            .as_ref()
            .and_then(|v| v.custom.as_deref())
            .map(PathBuf::from)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn load_empty_defaults() {
        let temp = TempDir::new().unwrap();
        let paths = AppPaths::new(temp.path().to_path_buf());

        let config = Config::load_with(&paths, &env(&[])).unwrap();

        assert!(config.spotify_credentials().is_none());
        assert_eq!(config.redirect_uri(), DEFAULT_REDIRECT_URI);
        assert!(config.color());
        assert!(config.custom_vibes().is_none());
        assert!(config.global_config_loaded_from().is_none());
    }

    #[test]
    fn load_from_app_dir() {
        let temp = TempDir::new().unwrap();
        let paths = AppPaths::new(temp.path().to_path_buf());
        fs::write(
            paths.config_path(),
            r#"
            [spotify]
            client_id = "file-id"
            client_secret = "file-secret"

            [ui]
            color = false
            "#,
        )
        .unwrap();

        let config = Config::load_with(&paths, &env(&[])).unwrap();
        let creds = config.spotify_credentials().expect("credentials");

        assert_eq!(creds.client_id, "file-id");
        assert_eq!(creds.client_secret, "file-secret");
        assert!(!config.color());
        assert_eq!(
            config.global_config_loaded_from(),
            Some(paths.config_path().as_path())
        );
    }

    #[test]
    fn explicit_config_env_wins_over_app_dir() {
        let temp = TempDir::new().unwrap();
        let paths = AppPaths::new(temp.path().to_path_buf());
        fs::write(paths.config_path(), "[ui]\ncolor = false\n").unwrap();

        let other = temp.path().join("other.toml");
        fs::write(&other, "[ui]\ncolor = true\n").unwrap();

        let config =
            Config::load_with(&paths, &env(&[(CONFIG_ENV, other.to_str().unwrap())])).unwrap();
        assert!(config.color());
        assert_eq!(config.global_config_loaded_from(), Some(other.as_path()));
    }

    #[test]
    fn xdg_location_searched_before_app_dir() {
        let temp = TempDir::new().unwrap();
        let paths = AppPaths::new(temp.path().join("app"));
        let xdg = temp.path().join("xdg");
        fs::create_dir_all(xdg.join("commit-vibes")).unwrap();
        fs::write(
            xdg.join("commit-vibes/config.toml"),
            "[vibes]\ncustom = \"/x.json\"\n",
        )
        .unwrap();

        let config =
            Config::load_with(&paths, &env(&[("XDG_CONFIG_HOME", xdg.to_str().unwrap())]))
                .unwrap();
        assert_eq!(config.custom_vibes(), Some(PathBuf::from("/x.json")));
    }

    #[test]
    fn environment_overrides_file_credentials() {
        let temp = TempDir::new().unwrap();
        let paths = AppPaths::new(temp.path().to_path_buf());
        fs::write(
            paths.config_path(),
            r#"
            [spotify]
            client_id = "file-id"
            client_secret = "file-secret"
            redirect_uri = "http://127.0.0.1:4000/cb"
            "#,
        )
        .unwrap();

        let config = Config::load_with(
            &paths,
            &env(&[
                (CLIENT_ID_ENV, "env-id"),
                (REDIRECT_URI_ENV, "http://localhost:5000"),
            ]),
        )
        .unwrap();
        let creds = config.spotify_credentials().expect("credentials");

        assert_eq!(creds.client_id, "env-id");
        assert_eq!(creds.client_secret, "file-secret");
        assert_eq!(creds.redirect_uri, "http://localhost:5000");
    }

    #[test]
    fn credentials_need_both_halves() {
        let temp = TempDir::new().unwrap();
        let paths = AppPaths::new(temp.path().to_path_buf());

        let config = Config::load_with(&paths, &env(&[(CLIENT_ID_ENV, "only-id")])).unwrap();
        assert!(config.spotify_credentials().is_none());
    }

    #[test]
    fn invalid_env_redirect_rejected() {
        let temp = TempDir::new().unwrap();
        let paths = AppPaths::new(temp.path().to_path_buf());

        let result = Config::load_with(&paths, &env(&[(REDIRECT_URI_ENV, "https://example.com")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let paths = AppPaths::new(temp.path().to_path_buf());
        fs::write(paths.config_path(), "mystery = true\n").unwrap();

        let result = Config::load_with(&paths, &env(&[]));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn write_global_roundtrip() {
        let temp = TempDir::new().unwrap();
        let paths = AppPaths::new(temp.path().join("fresh"));

        let config = Config::load_with(&paths, &env(&[])).unwrap();
        let target = config.write_target(&paths);
        assert_eq!(target, paths.config_path());

        let global = GlobalConfig {
            spotify: Some(SpotifyConfig {
                client_id: Some("written-id".into()),
                client_secret: Some("written-secret".into()),
                redirect_uri: None,
            }),
            ..Default::default()
        };
        Config::write_global(&target, &global).unwrap();

        let reloaded = Config::load_with(&paths, &env(&[])).unwrap();
        assert_eq!(reloaded.global, global);
        assert!(!temp.path().join("fresh/config.toml.tmp").exists());
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let creds = SpotifyCredentials {
            client_id: "id".into(),
            client_secret: "hunter2".into(),
            redirect_uri: DEFAULT_REDIRECT_URI.into(),
        };
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
