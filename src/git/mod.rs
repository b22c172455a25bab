//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the only doorway to Git. The commit flow talks to the
//! [`Vcs`] trait; [`Git`] implements it by running the `git` CLI, and
//! [`MockVcs`] implements it in memory for tests.
//!
//! # Example
//!
//! ```ignore
//! use commit_vibes::git::{Git, Vcs};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! if git.staged_files()?.is_empty() {
//!     git.stage_all()?;
//! }
//! git.commit("fix: typo - 😌 Feelin Confident")?;
//! ```

mod interface;
mod mock;

pub use interface::{Git, GitError, Vcs};
pub use mock::{FailOn, MockVcs, VcsOperation};
