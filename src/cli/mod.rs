//! cli
//!
//! Command-line interface layer for Commit Vibes.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Set up diagnostics, interrupt handling and configuration
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, resolves settings
//! into an [`engine::Context`], and dispatches to one handler per mode.
//! The commit dialogue itself lives in [`crate::engine`].

pub mod args;
pub mod commands;
pub mod signals;

pub use args::{Cli, Command, Shell};

use crate::core::config::Config;
use crate::core::paths::AppPaths;
use crate::engine;
use anyhow::{Context as _, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);
    signals::install();

    let command = cli.mode();
    if let Command::Completions(shell) = command {
        return commands::completion(shell);
    }

    let paths = AppPaths::discover().context("Failed to locate the commit-vibes directory")?;
    let config = Config::load(&paths).context("Failed to load configuration")?;

    // CLI flags take precedence over config.
    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(),
        color: cli.color(config.color()),
        open_browser: !cli.no_browser,
    };
    tracing::debug!(?command, interactive = ctx.interactive, "dispatching");

    let env = commands::Env {
        paths,
        config,
        custom_vibe: cli.custom_vibe,
    };
    commands::dispatch(command, cli.message.as_deref(), &ctx, &env)
}

/// Diagnostics go to stderr.
///
/// `RUST_LOG` wins; otherwise `warn`, or `commit_vibes=debug` with `--debug`.
fn init_tracing(debug: bool) {
    let default = if debug { "commit_vibes=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}
