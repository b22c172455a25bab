//! cli::commands::commit
//!
//! The commit dialogue in its three flavours: real, demo and preview.
//!
//! # Example
//!
//! ```bash
//! # Commit for real
//! commit-vibes "fix: handle empty input"
//!
//! # Fabricated files and music, nothing changes
//! commit-vibes --demo
//!
//! # Real repository and Spotify state, no staging and no commit
//! commit-vibes --preview
//! ```

use super::Env;
use crate::engine::{pipeline, Context, Mode};
use crate::git::{Git, Vcs};
use crate::music::{DemoMusic, MusicService};
use crate::ui::prompts::TerminalPrompter;
use anyhow::{Context as _, Result};

/// Stage, ask, and commit.
pub fn commit(ctx: &Context, env: &Env, message: Option<&str>) -> Result<()> {
    let git = open_repo(ctx)?;
    let music = env.music();
    run_dialogue(
        Mode::Commit,
        ctx,
        env,
        Some(&git),
        music.as_ref().map(|m| m as &dyn MusicService),
        message,
    )
}

/// The full dialogue against fabricated data.
///
/// Works outside a repository and without Spotify.
pub fn demo(ctx: &Context, env: &Env, message: Option<&str>) -> Result<()> {
    let music = DemoMusic::new();
    run_dialogue(Mode::Demo, ctx, env, None, Some(&music), message)
}

/// The dialogue against real state, stopping short of any change.
pub fn preview(ctx: &Context, env: &Env, message: Option<&str>) -> Result<()> {
    let git = open_repo(ctx)?;
    let music = env.music();
    run_dialogue(
        Mode::Preview,
        ctx,
        env,
        Some(&git),
        music.as_ref().map(|m| m as &dyn MusicService),
        message,
    )
}

fn open_repo(ctx: &Context) -> Result<Git> {
    let workdir = ctx
        .workdir()
        .context("Failed to determine the working directory")?;
    Ok(Git::open(&workdir)?)
}

fn run_dialogue(
    mode: Mode,
    ctx: &Context,
    env: &Env,
    vcs: Option<&dyn Vcs>,
    music: Option<&dyn MusicService>,
    message: Option<&str>,
) -> Result<()> {
    let vibes = env.vibes()?;
    let output = ctx.output();
    let mut prompter = TerminalPrompter::new(ctx.color, ctx.interactive);

    let mut deps = pipeline::Deps {
        vcs,
        music,
        prompter: &mut prompter,
        vibes: &vibes,
        output: &output,
    };
    let outcome = pipeline::run(mode, message, &mut deps)?;
    tracing::debug!(
        committed = outcome.committed,
        files = outcome.files.len(),
        vibe = %outcome.vibe,
        "dialogue finished"
    );
    Ok(())
}
