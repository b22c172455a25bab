//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Builds the collaborators it needs (repository, music service, prompter)
//! 2. Calls the engine or the auth layer
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! Spotify work is async because it involves network I/O. Handlers stay
//! synchronous and build a `tokio` runtime where they need one.

mod commit;
mod completion;
mod connect;
mod disconnect;
mod list_vibes;
mod status;

// Re-export command functions for testing and direct invocation
pub use commit::{commit, demo, preview};
pub use completion::completion;
pub use connect::connect;
pub use disconnect::disconnect;
pub use list_vibes::list_vibes;
pub use status::status;

use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::{AuthError, OAuthClient, SpotifyAuthManager};
use crate::cli::args::Command;
use crate::core::config::Config;
use crate::core::paths::AppPaths;
use crate::core::vibes::VibeCatalog;
use crate::engine::Context;
use crate::music::{SpotifyClient, SpotifyService};
use crate::secrets;
use anyhow::{Context as _, Result};

/// Resolved locations and settings shared by the handlers.
#[derive(Debug)]
pub struct Env {
    pub paths: AppPaths,
    pub config: Config,
    /// `--custom-vibe`, which overrides `vibes.custom` from config.
    pub custom_vibe: Option<PathBuf>,
}

impl Env {
    /// Built-in vibes plus any custom file.
    pub fn vibes(&self) -> Result<VibeCatalog> {
        let mut catalog = VibeCatalog::default();
        let custom = self
            .custom_vibe
            .clone()
            .or_else(|| self.config.custom_vibes());
        if let Some(path) = custom {
            let extra = VibeCatalog::load_custom(&path)
                .with_context(|| format!("Failed to load custom vibes from {}", path.display()))?;
            tracing::debug!(count = extra.len(), path = %path.display(), "loaded custom vibes");
            catalog.extend(extra);
        }
        Ok(catalog)
    }

    /// Token manager for the configured Spotify app.
    pub fn auth_manager(&self) -> Result<SpotifyAuthManager, AuthError> {
        let credentials = self
            .config
            .spotify_credentials()
            .ok_or(AuthError::NotConfigured)?;
        Ok(SpotifyAuthManager::new(
            secrets::create_store(&self.paths),
            self.paths.lock_path(),
            OAuthClient::new(credentials),
        ))
    }

    /// The Spotify service, when the app is configured and connected.
    ///
    /// Anything less means the commit runs without music, silently.
    pub fn music(&self) -> Option<SpotifyService> {
        let manager = match self.auth_manager() {
            Ok(manager) => manager,
            Err(e) => {
                tracing::debug!(error = %e, "music disabled");
                return None;
            }
        };
        if !crate::auth::TokenProvider::is_authenticated(&manager) {
            tracing::debug!("no Spotify token file; music disabled");
            return None;
        }
        Some(SpotifyService::new(SpotifyClient::new(Arc::new(manager))))
    }
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, message: Option<&str>, ctx: &Context, env: &Env) -> Result<()> {
    match command {
        Command::Commit => commit(ctx, env, message),
        Command::Demo => demo(ctx, env, message),
        Command::Preview => preview(ctx, env, message),
        Command::Status => status(ctx, env),
        Command::Connect => connect(ctx, env),
        Command::Disconnect => disconnect(ctx, env),
        Command::ListVibes => list_vibes(ctx, env),
        Command::Completions(shell) => completion(shell),
    }
}
