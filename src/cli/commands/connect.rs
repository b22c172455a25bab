//! cli::commands::connect
//!
//! Connect a Spotify account with the authorization code flow.
//!
//! # Flow
//!
//! 1. Resolve the app credentials; ask for them when interactive and unset
//! 2. Bind the local callback listener on the redirect URI
//! 3. Open (or print) the authorization URL
//! 4. Wait for the redirect, check `state`, exchange the code
//! 5. Save the token file
//!
//! Token values are never printed.

use super::Env;
use crate::auth::{
    self, AuthError, CallbackListener, OAuthClient, SpotifyAuthManager, TokenInfo,
    DEFAULT_CALLBACK_TIMEOUT,
};
use crate::core::config::{
    Config, SpotifyCredentials, CLIENT_ID_ENV, CLIENT_SECRET_ENV, REDIRECT_URI_ENV,
};
use crate::engine::Context;
use crate::secrets;
use crate::ui::output::Output;
use crate::ui::prompts::{Prompter, TerminalPrompter};
use anyhow::{bail, Context as _, Result};

const DASHBOARD_URL: &str = "https://developer.spotify.com/dashboard";

/// Run the OAuth flow and store the resulting tokens.
pub fn connect(ctx: &Context, env: &Env) -> Result<()> {
    let output = ctx.output();
    output.intro();

    let credentials = match env.config.spotify_credentials() {
        Some(credentials) => credentials,
        None if ctx.interactive => {
            let mut prompter = TerminalPrompter::new(ctx.color, ctx.interactive);
            ask_credentials(env, &mut prompter, &output)?
        }
        None => {
            output.error(setup_help(env));
            return Err(AuthError::NotConfigured.into());
        }
    };

    output.banner("\n🎵 Connecting to Spotify...");

    let oauth = OAuthClient::new(credentials.clone());
    let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let tokens = rt
        .block_on(authorize(&oauth, ctx.open_browser, &output))
        .context("Failed to connect to Spotify")?;

    let manager = SpotifyAuthManager::new(
        secrets::create_store(&env.paths),
        env.paths.lock_path(),
        OAuthClient::new(credentials),
    );
    manager
        .store_tokens(tokens)
        .context("Failed to save Spotify tokens")?;

    output.success("\n✨ Successfully connected to Spotify!");
    output.dim("Your music will now be included in commits when you're listening");
    Ok(())
}

async fn authorize(
    oauth: &OAuthClient,
    open_browser: bool,
    output: &Output,
) -> Result<TokenInfo, AuthError> {
    let state = auth::new_state();
    let url = oauth.authorize_url(&state)?;
    let listener = CallbackListener::bind(oauth.redirect_uri()).await?;

    output.print("\nOpen this URL to authorize Commit Vibes:");
    output.info(&url);
    if open_browser {
        if let Err(e) = open::that(&url) {
            tracing::debug!(error = %e, "could not open browser");
            output.warn("Could not open a browser; open the URL above manually.");
        }
    }
    output.dim("Waiting for Spotify to redirect back...");

    let code = listener
        .wait_for_code(&state, DEFAULT_CALLBACK_TIMEOUT)
        .await?;
    oauth.exchange_code(&code).await
}

/// Ask for the client ID and secret, then save them to the config file.
fn ask_credentials(
    env: &Env,
    prompter: &mut dyn Prompter,
    output: &Output,
) -> Result<SpotifyCredentials> {
    output.print(format!(
        "\nSpotify is not configured yet. Create an app at {} and add {} as a redirect URI.",
        DASHBOARD_URL,
        env.config.redirect_uri()
    ));

    let client_id = prompter.text("Spotify client ID:", None)?.trim().to_string();
    if client_id.is_empty() {
        bail!("Spotify client ID cannot be empty");
    }
    let client_secret = prompter.secret("Spotify client secret:")?.trim().to_string();
    if client_secret.is_empty() {
        bail!("Spotify client secret cannot be empty");
    }

    let mut global = env.config.global.clone();
    let spotify = global.spotify.get_or_insert_with(Default::default);
    spotify.client_id = Some(client_id.clone());
    spotify.client_secret = Some(client_secret.clone());

    let path = env.config.write_target(&env.paths);
    Config::write_global(&path, &global).context("Failed to save Spotify credentials")?;
    output.success(format!("Saved credentials to {}", path.display()));

    Ok(SpotifyCredentials {
        client_id,
        client_secret,
        redirect_uri: env.config.redirect_uri(),
    })
}

fn setup_help(env: &Env) -> String {
    format!(
        "\n❌ Spotify is not configured!\n\n\
         To use Spotify features, set these environment variables:\n\
         \x20   {}=your_client_id\n\
         \x20   {}=your_client_secret\n\
         \x20   {}={}\n\n\
         or add a [spotify] section to {}\n\n\
         Get credentials from: {}\n\n\
         Note: You can use commit-vibes without Spotify - it's optional!",
        CLIENT_ID_ENV,
        CLIENT_SECRET_ENV,
        REDIRECT_URI_ENV,
        env.config.redirect_uri(),
        env.config.write_target(&env.paths).display(),
        DASHBOARD_URL
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::paths::AppPaths;
    use crate::ui::scripted::{Answer, ScriptedPrompter};
    use tempfile::TempDir;

    fn env_in(temp: &TempDir) -> Env {
        Env {
            paths: AppPaths::new(temp.path().to_path_buf()),
            config: Config::default(),
            custom_vibe: None,
        }
    }

    #[test]
    fn entered_credentials_are_saved() {
        let temp = TempDir::new().unwrap();
        let env = env_in(&temp);
        let output = Output::new(crate::ui::Verbosity::Quiet, false);
        let mut prompter = ScriptedPrompter::new([
            Answer::text(" my-id "),
            Answer::Secret("my-secret".into()),
        ]);

        let credentials = ask_credentials(&env, &mut prompter, &output).unwrap();
        assert_eq!(credentials.client_id, "my-id");
        assert_eq!(credentials.redirect_uri, "http://localhost:3000");

        let reloaded = Config::load_with(&env.paths, &|_: &str| None).unwrap();
        let saved = reloaded.spotify_credentials().unwrap();
        assert_eq!(saved.client_id, "my-id");
        assert_eq!(saved.client_secret, "my-secret");
    }

    #[test]
    fn empty_client_id_is_rejected() {
        let temp = TempDir::new().unwrap();
        let env = env_in(&temp);
        let output = Output::new(crate::ui::Verbosity::Quiet, false);
        let mut prompter = ScriptedPrompter::new([Answer::text("  ")]);

        assert!(ask_credentials(&env, &mut prompter, &output).is_err());
        assert!(!env.paths.config_path().exists());
    }

    #[test]
    fn non_interactive_without_credentials_fails() {
        let temp = TempDir::new().unwrap();
        let env = env_in(&temp);
        let ctx = Context {
            interactive: false,
            quiet: true,
            ..Default::default()
        };

        let err = connect(&ctx, &env).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::NotConfigured)
        ));
    }

    #[test]
    fn setup_help_names_the_variables() {
        let temp = TempDir::new().unwrap();
        let help = setup_help(&env_in(&temp));
        assert!(help.contains("SPOTIFY_CLIENT_ID=your_client_id"));
        assert!(help.contains(DASHBOARD_URL));
    }
}
