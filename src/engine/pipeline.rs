//! engine::pipeline
//!
//! The commit dialogue.
//!
//! # Order
//!
//! ```text
//! staging plan -> message -> vibe -> music -> [stage + commit]
//! ```
//!
//! Every prompt runs before the first mutation. Demo and preview modes run
//! the same prompts and stop before the bracketed step.

use chrono::Utc;

use super::staging::{self, Staging};
use super::{EngineError, Mode};
use crate::core::draft::CommitDraft;
use crate::core::types::{NowPlaying, StagePlan, Track};
use crate::core::vibes::{Vibe, VibeCatalog};
use crate::git::Vcs;
use crate::music::{MusicError, MusicService};
use crate::ui::output::Output;
use crate::ui::prompts::{Choice, PromptError, Prompter};

pub const MESSAGE_PROMPT: &str = "Enter your commit message:";
pub const MESSAGE_PLACEHOLDER: &str = "fix: what changed";
pub const VIBE_PROMPT: &str = "How are you feeling about this commit?";
pub const NOW_PLAYING_PROMPT: &str = "Add this song to your commit message?";
pub const LAST_PLAYED_PROMPT: &str = "Add most recent song to your commit message?";

/// Files shown in demo mode.
pub const DEMO_FILES: [&str; 2] = ["src/index.js", "README.md"];

/// Everything the dialogue talks to.
pub struct Deps<'a> {
    /// `None` outside a repository; only demo mode runs without one.
    pub vcs: Option<&'a dyn Vcs>,
    /// `None` when no music service is configured.
    pub music: Option<&'a dyn MusicService>,
    pub prompter: &'a mut dyn Prompter,
    pub vibes: &'a VibeCatalog,
    pub output: &'a Output,
}

/// Result of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// The final commit message.
    pub message: String,
    /// Label of the chosen vibe.
    pub vibe: String,
    /// The track written into the message, if any.
    pub track: Option<Track>,
    /// Files that are (or would be) committed.
    pub files: Vec<String>,
    pub committed: bool,
}

/// Run the dialogue for `mode`.
///
/// # Errors
///
/// [`EngineError::Prompt`] with [`PromptError::Cancelled`] when the user
/// backs out of any prompt. No staging or commit has happened by then.
pub fn run(mode: Mode, message_arg: Option<&str>, deps: &mut Deps<'_>) -> Result<Outcome, EngineError> {
    tracing::debug!(?mode, "starting dialogue");
    match mode {
        Mode::Commit => run_commit(message_arg, deps),
        Mode::Demo => run_demo(message_arg, deps),
        Mode::Preview => run_preview(message_arg, deps),
    }
}

fn run_commit(message_arg: Option<&str>, deps: &mut Deps<'_>) -> Result<Outcome, EngineError> {
    let vcs = deps.vcs.ok_or(EngineError::NoRepository)?;
    deps.output.intro();

    let staging = staging::plan(vcs, deps.prompter)?;
    deps.output.staged_files(&staging.files);

    let message = read_message(message_arg, deps)?;
    let vibe = choose_vibe(deps)?;
    let (draft, track) = add_music(CommitDraft::new(message).with_vibe(&vibe), deps)?;

    deps.output.final_message("Final Commit Message:", draft.message());

    staging.apply(vcs)?;
    vcs.commit(draft.message())?;
    deps.output.success("✅ Commit successful!");

    Ok(Outcome {
        message: draft.into_message(),
        vibe: vibe.label,
        track,
        files: staging.files,
        committed: true,
    })
}

fn run_demo(message_arg: Option<&str>, deps: &mut Deps<'_>) -> Result<Outcome, EngineError> {
    deps.output.intro();
    deps.output
        .banner("🚧 Running in DEMO mode! No changes will be made. 🚧");

    let files: Vec<String> = DEMO_FILES.iter().map(|f| f.to_string()).collect();
    deps.output.staged_files(&files);

    let message = read_message(message_arg, deps)?;
    let vibe = choose_vibe(deps)?;
    let (draft, track) = add_music(CommitDraft::new(message).with_vibe(&vibe), deps)?;

    deps.output.final_message("Final Commit Message:", draft.message());
    deps.output.banner("Demo mode: No commit was made.");

    Ok(Outcome {
        message: draft.into_message(),
        vibe: vibe.label,
        track,
        files,
        committed: false,
    })
}

fn run_preview(message_arg: Option<&str>, deps: &mut Deps<'_>) -> Result<Outcome, EngineError> {
    let vcs = deps.vcs.ok_or(EngineError::NoRepository)?;
    deps.output.intro();
    deps.output.banner(
        "👀 PREVIEW MODE - Using real git and Spotify data, but no commit will be created\n",
    );

    let staged = vcs.staged_files()?;
    if !staged.is_empty() {
        deps.output.heading("📂 Currently staged files:");
        deps.output.staged_files(&staged);
    }

    let message = read_message(message_arg, deps)?;

    let unstaged = vcs.unstaged_files()?;
    let mut selected = Vec::new();
    if !unstaged.is_empty() {
        selected = staging::select_files(&unstaged, deps.prompter)?;
        if !selected.is_empty() {
            deps.output.heading(format!(
                "\n📝 Would stage {} file(s): {}",
                selected.len(),
                selected.join(", ")
            ));
            deps.output
                .dim("(No files were actually staged in preview mode)");
        }
    }

    // Computed for display only; never applied.
    let preview = Staging {
        plan: if selected.is_empty() {
            StagePlan::Nothing
        } else {
            StagePlan::Files(selected.clone())
        },
        files: merge_files(&staged, &selected),
    };

    if preview.files.is_empty() {
        deps.output
            .warn("\n⚠️  No files would be committed (no staged files and none selected)");
    } else {
        deps.output.heading("\n📦 Files that would be committed:");
        deps.output.staged_files(&preview.files);
    }

    let vibe = choose_vibe(deps)?;
    let (draft, track) = add_music(CommitDraft::new(message).with_vibe(&vibe), deps)?;

    deps.output.heading("\n📝 Final commit message (PREVIEW):");
    deps.output.print(draft.message());
    deps.output.print("");

    deps.output.heading("📊 Preview Summary:");
    deps.output
        .dim(format!("  • Files to commit: {}", preview.files.len()));
    deps.output.dim(format!("  • Vibe: {}", vibe.label));
    if let Some(track) = &track {
        deps.output.dim(format!("  • Spotify: {}", track));
    }
    deps.output.print("");
    deps.output
        .success("👀 Preview completed - no commit was created");

    Ok(Outcome {
        message: draft.into_message(),
        vibe: vibe.label,
        track,
        files: preview.files,
        committed: false,
    })
}

/// Staged files followed by newly selected ones, without repeats.
fn merge_files(staged: &[String], selected: &[String]) -> Vec<String> {
    let mut files = staged.to_vec();
    for file in selected {
        if !files.contains(file) {
            files.push(file.clone());
        }
    }
    files
}

/// The message argument, or a prompt that rejects blank input.
fn read_message(message_arg: Option<&str>, deps: &mut Deps<'_>) -> Result<String, EngineError> {
    if let Some(message) = message_arg.filter(|m| !m.trim().is_empty()) {
        return Ok(message.to_string());
    }
    loop {
        let message = deps
            .prompter
            .text(MESSAGE_PROMPT, Some(MESSAGE_PLACEHOLDER))?;
        if !message.trim().is_empty() {
            return Ok(message);
        }
        deps.output.warn("Commit message cannot be empty.");
    }
}

fn choose_vibe(deps: &mut Deps<'_>) -> Result<Vibe, EngineError> {
    let choices: Vec<Choice> = deps
        .vibes
        .iter()
        .map(|v| Choice::with_hint(v.label.as_str(), v.hint.as_str()))
        .collect();
    let index = deps.prompter.select(VIBE_PROMPT, &choices)?;
    deps.vibes
        .get(index)
        .cloned()
        .ok_or_else(|| PromptError::Io(format!("no vibe at index {}", index)).into())
}

/// Offer the current (or most recent) track.
///
/// Music failures never abort the commit; they are reported and skipped.
fn add_music(
    draft: CommitDraft,
    deps: &mut Deps<'_>,
) -> Result<(CommitDraft, Option<Track>), EngineError> {
    let Some(music) = deps.music else {
        return Ok((draft, None));
    };

    let now_playing = match fetch_now_playing(music) {
        Ok(now_playing) => now_playing,
        Err(MusicError::NotConnected) => {
            tracing::debug!(service = music.name(), "music service not connected");
            return Ok((draft, None));
        }
        Err(MusicError::AuthExpired) => {
            deps.output.warn(format!("\n{}", MusicError::AuthExpired));
            return Ok((draft, None));
        }
        Err(e) => {
            tracing::warn!(error = %e, "music lookup failed");
            deps.output
                .warn(format!("\n⚠️  Could not fetch {} track: {}", music.name(), e));
            return Ok((draft, None));
        }
    };

    match now_playing {
        NowPlaying::Playing(track) => {
            deps.output.now_playing(&track);
            if deps.prompter.confirm(NOW_PLAYING_PROMPT, true)? {
                return Ok((draft.with_now_playing(&track), Some(track)));
            }
        }
        NowPlaying::Recent(tracks) if !tracks.is_empty() => {
            deps.output.recent_tracks(&tracks, Utc::now());
            if deps.prompter.confirm(LAST_PLAYED_PROMPT, true)? {
                let track = tracks[0].track.clone();
                return Ok((draft.with_last_played(&track), Some(track)));
            }
        }
        NowPlaying::Recent(_) | NowPlaying::Nothing => {}
    }
    Ok((draft, None))
}

fn fetch_now_playing(music: &dyn MusicService) -> Result<NowPlaying, MusicError> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| MusicError::Network(e.to_string()))?;
    rt.block_on(music.now_playing())
}
