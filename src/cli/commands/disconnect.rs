//! cli::commands::disconnect
//!
//! Forget the stored Spotify tokens.
//!
//! Works whether or not Spotify credentials are configured; only the token
//! file is touched. The config file keeps the client ID and secret.

use super::Env;
use crate::engine::Context;
use crate::secrets;
use anyhow::{Context as _, Result};

/// Delete the token file.
pub fn disconnect(ctx: &Context, env: &Env) -> Result<()> {
    let output = ctx.output();
    output.intro();
    output.banner("\n🎵 Disconnecting from Spotify...");

    let store = secrets::create_store(&env.paths);
    let removed = store
        .remove()
        .context("Failed to disconnect from Spotify")?;

    if removed {
        output.success("\n✨ Successfully disconnected from Spotify!");
    } else {
        output.banner("\nℹ️ No Spotify connection found to disconnect.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::paths::AppPaths;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn removes_token_file_once() {
        let temp = TempDir::new().unwrap();
        let paths = AppPaths::new(temp.path().to_path_buf());
        fs::write(paths.token_path(), "{}").unwrap();

        let env = Env {
            paths: paths.clone(),
            config: Config::default(),
            custom_vibe: None,
        };
        let ctx = Context {
            quiet: true,
            ..Default::default()
        };

        disconnect(&ctx, &env).unwrap();
        assert!(!paths.token_path().exists());
        // A second disconnect finds nothing and still succeeds.
        disconnect(&ctx, &env).unwrap();
    }
}
