//! cli::commands::status
//!
//! Report whether Spotify is connected and what it is playing.

use std::sync::Arc;

use super::Env;
use crate::auth::{AuthError, TokenProvider};
use crate::core::types::NowPlaying;
use crate::engine::Context;
use crate::music::{format_relative_time, MusicError, MusicService, SpotifyClient, SpotifyService};
use crate::ui::output::Output;
use anyhow::{Context as _, Result};
use chrono::Utc;

/// Show the Spotify connection state and the current or last track.
pub fn status(ctx: &Context, env: &Env) -> Result<()> {
    let output = ctx.output();
    output.intro();
    output.banner("\n🎵 Checking Spotify connection...");

    let manager = match env.auth_manager() {
        Ok(manager) => manager,
        Err(AuthError::NotConfigured) => {
            output.banner("\nℹ️ Spotify is not configured.");
            output.dim(format!(
                "Set {} and {}, or run --spotify to enter them",
                crate::core::config::CLIENT_ID_ENV,
                crate::core::config::CLIENT_SECRET_ENV
            ));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if !manager.is_authenticated() {
        not_connected(&output);
        return Ok(());
    }

    let service = SpotifyService::new(SpotifyClient::new(Arc::new(manager)));
    let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    match rt.block_on(service.now_playing()) {
        Ok(now_playing) => {
            report(&output, now_playing);
            Ok(())
        }
        Err(MusicError::AuthExpired) => {
            output.error("\n❌ Spotify token has expired.");
            output.dim("Please reconnect with --spotify");
            Ok(())
        }
        Err(MusicError::NotConnected) => {
            not_connected(&output);
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context("Error checking Spotify status")),
    }
}

fn not_connected(output: &Output) {
    output.banner("\nℹ️ Spotify is not connected.");
    output.dim("Use --spotify to connect your account");
}

fn report(output: &Output, now_playing: NowPlaying) {
    output.success("\n✨ Spotify is connected!");
    match now_playing {
        NowPlaying::Playing(track) => output.now_playing(&track),
        NowPlaying::Recent(tracks) => {
            if let Some(latest) = tracks.first() {
                output.info("\n🎵 No song currently playing");
                output.dim("Most recent track:");
                output.dim(format!(
                    "  \"{}\" - {} ({})",
                    latest.track.name,
                    latest.track.artist,
                    format_relative_time(latest.played_at, Utc::now())
                ));
            }
        }
        NowPlaying::Nothing => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Config, GlobalConfig, SpotifyConfig};
    use crate::core::paths::AppPaths;
    use tempfile::TempDir;

    fn quiet() -> Context {
        Context {
            quiet: true,
            ..Default::default()
        }
    }

    #[test]
    fn unconfigured_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let env = Env {
            paths: AppPaths::new(temp.path().to_path_buf()),
            config: Config::default(),
            custom_vibe: None,
        };
        assert!(status(&quiet(), &env).is_ok());
    }

    #[test]
    fn configured_without_tokens_is_not_connected() {
        let temp = TempDir::new().unwrap();
        let env = Env {
            paths: AppPaths::new(temp.path().to_path_buf()),
            config: Config::from_global(GlobalConfig {
                spotify: Some(SpotifyConfig {
                    client_id: Some("id".into()),
                    client_secret: Some("secret".into()),
                    redirect_uri: None,
                }),
                ..Default::default()
            }),
            custom_vibe: None,
        };
        assert!(status(&quiet(), &env).is_ok());
    }
}
