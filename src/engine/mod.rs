//! engine
//!
//! Runs the commit dialogue: Stage -> Message -> Vibe -> Music -> Commit.
//!
//! # Architecture
//!
//! The engine owns the order of the dialogue and nothing else. It talks to
//! the repository through [`crate::git::Vcs`], to the music service through
//! [`crate::music::MusicService`], and to the user through
//! [`crate::ui::Prompter`], so every step can be driven by test doubles.
//!
//! # Invariants
//!
//! - Every prompt is answered before the first staging or commit call
//! - Demo and preview runs never stage or commit
//! - Music failures are reported and skipped, never fatal
//!
//! # Example
//!
//! ```
//! use commit_vibes::core::vibes::VibeCatalog;
//! use commit_vibes::engine::{pipeline, Mode};
//! use commit_vibes::git::MockVcs;
//! use commit_vibes::ui::{Answer, Output, ScriptedPrompter, Verbosity};
//!
//! let vcs = MockVcs::new().with_staged(["src/lib.rs"]);
//! let mut prompter = ScriptedPrompter::new([Answer::Select(1)]);
//! let vibes = VibeCatalog::default();
//! let output = Output::new(Verbosity::Quiet, false);
//!
//! let mut deps = pipeline::Deps {
//!     vcs: Some(&vcs),
//!     music: None,
//!     prompter: &mut prompter,
//!     vibes: &vibes,
//!     output: &output,
//! };
//! let outcome = pipeline::run(Mode::Commit, Some("fix: typo"), &mut deps).unwrap();
//! assert_eq!(outcome.message, "fix: typo - 🤞 Feelin Hopeful");
//! assert_eq!(vcs.last_commit().as_deref(), Some("fix: typo - 🤞 Feelin Hopeful"));
//! ```

pub mod pipeline;
pub mod staging;

pub use pipeline::{Deps, Outcome};
pub use staging::Staging;

use std::path::PathBuf;

use crate::git::GitError;
use crate::ui::output::{Output, Verbosity};
use crate::ui::prompts::PromptError;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags and config that affect
/// command behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
    /// Styled output enabled.
    pub color: bool,
    /// Open the authorization page in a browser during `--spotify`.
    pub open_browser: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            debug: false,
            quiet: false,
            interactive: true,
            color: true,
            open_browser: true,
        }
    }
}

impl Context {
    /// The directory commands run in.
    pub fn workdir(&self) -> std::io::Result<PathBuf> {
        match &self.cwd {
            Some(path) => Ok(path.clone()),
            None => std::env::current_dir(),
        }
    }

    pub fn output(&self) -> Output {
        Output::new(Verbosity::from_flags(self.quiet, self.debug), self.color)
    }
}

/// Which dialogue to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Stage and commit for real.
    Commit,
    /// Fabricated files and music; touches nothing.
    Demo,
    /// Real repository and music state; stages and commits nothing.
    Preview,
}

/// Errors from the commit dialogue.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Nothing staged and nothing to stage.
    #[error("nothing to commit")]
    NothingToCommit,

    /// The file selection came back empty or was declined.
    #[error("No files selected. Cannot commit.")]
    NoFilesSelected,

    /// A repository is required for this mode.
    #[error("not inside a git repository")]
    NoRepository,

    /// Git error.
    #[error(transparent)]
    Git(#[from] GitError),

    /// Prompt failed or was cancelled.
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

impl EngineError {
    /// Whether the user backed out rather than something failing.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EngineError::Prompt(PromptError::Cancelled))
    }
}
