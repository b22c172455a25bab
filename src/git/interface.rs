//! git::interface
//!
//! The [`Vcs`] trait and the [`Git`] implementation that shells out to the
//! `git` binary.
//!
//! All commands run from the repository top level, so every path in and out
//! of this module is relative to the work tree root. Arguments are passed
//! straight to the process, never through a shell.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use thiserror::Error;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// The `git` binary could not be started.
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    /// A git command exited unsuccessfully.
    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        /// The command line, e.g. `git add -A`
        command: String,
        /// Exit status description
        status: String,
        /// Trimmed standard error
        stderr: String,
    },

    /// Asked to stage an empty selection.
    #[error("no files selected to stage")]
    NothingSelected,
}

/// Version-control operations the commit flow needs.
pub trait Vcs {
    /// Paths in the index that differ from HEAD.
    fn staged_files(&self) -> Result<Vec<String>, GitError>;

    /// Modified tracked files plus untracked, non-ignored files.
    fn unstaged_files(&self) -> Result<Vec<String>, GitError>;

    /// Stage everything in the work tree.
    fn stage_all(&self) -> Result<(), GitError>;

    /// Stage exactly these paths.
    fn stage_files(&self, files: &[String]) -> Result<(), GitError>;

    /// Create a commit from the index with this message.
    fn commit(&self, message: &str) -> Result<(), GitError>;
}

/// Shell adapter over the `git` CLI.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    /// Open the repository containing `path`.
    ///
    /// # Errors
    ///
    /// [`GitError::NotARepo`] if `path` is not inside a work tree.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(path)
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            return Err(GitError::NotARepo {
                path: path.to_path_buf(),
            });
        }

        let top = String::from_utf8_lossy(&output.stdout).trim().to_string();
        tracing::debug!(workdir = %top, "opened repository");
        Ok(Self {
            workdir: PathBuf::from(top),
        })
    }

    /// The work tree root.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.workdir);
        cmd
    }

    fn check(args: &[&str], output: Output) -> Result<Output, GitError> {
        if output.status.success() {
            Ok(output)
        } else {
            Err(GitError::CommandFailed {
                command: describe(args),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    /// Run a read-only listing with `-z` and return the NUL-separated paths.
    ///
    /// `-z` keeps git from C-quoting paths with non-ASCII bytes, so the
    /// names can be handed back to `git add` unchanged.
    fn paths(&self, args: &[&str]) -> Result<Vec<String>, GitError> {
        tracing::debug!(command = %describe(args), "running");
        let output = self.command(args).stdin(Stdio::null()).output()?;
        let output = Self::check(args, output)?;
        Ok(parse_paths(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Run a mutating command, capturing output.
    fn run(&self, args: &[&str]) -> Result<(), GitError> {
        tracing::debug!(command = %describe(args), "running");
        let output = self.command(args).stdin(Stdio::null()).output()?;
        Self::check(args, output).map(|_| ())
    }
}

impl Vcs for Git {
    fn staged_files(&self) -> Result<Vec<String>, GitError> {
        self.paths(&["diff", "--name-only", "--cached", "-z"])
    }

    fn unstaged_files(&self) -> Result<Vec<String>, GitError> {
        self.paths(&["ls-files", "-z", "--modified", "--others", "--exclude-standard"])
    }

    fn stage_all(&self) -> Result<(), GitError> {
        self.run(&["add", "-A"])
    }

    fn stage_files(&self, files: &[String]) -> Result<(), GitError> {
        if files.is_empty() {
            return Err(GitError::NothingSelected);
        }
        let mut args = vec!["add", "--"];
        args.extend(files.iter().map(String::as_str));
        self.run(&args)
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        let args = ["commit", "-m", message];
        tracing::debug!("running git commit");
        // Inherit stdio so hook output and git's summary reach the user.
        let status = self.command(&args).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(GitError::CommandFailed {
                command: "git commit".to_string(),
                status: status.to_string(),
                stderr: "see output above".to_string(),
            })
        }
    }
}

/// NUL-separated paths, deduplicated, first occurrence wins.
///
/// Paths are kept byte for byte; leading or trailing spaces are part of
/// the name.
fn parse_paths(stdout: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for path in stdout.split('\0').filter(|p| !p.is_empty()) {
        if !out.iter().any(|existing| existing == path) {
            out.push(path.to_string());
        }
    }
    out
}

fn describe(args: &[&str]) -> String {
    format!("git {}", args.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_paths_dedups_and_skips_empty() {
        let parsed = parse_paths("a.rs\0\0b.rs\0a.rs\0 c d.rs\0");
        assert_eq!(parsed, vec!["a.rs", "b.rs", " c d.rs"]);
    }

    #[test]
    fn parse_paths_keeps_non_ascii_unquoted() {
        assert_eq!(parse_paths("café.txt\0"), vec!["café.txt"]);
    }

    #[test]
    fn parse_paths_empty_output() {
        assert!(parse_paths("").is_empty());
    }

    #[test]
    fn describe_joins_args() {
        assert_eq!(describe(&["add", "-A"]), "git add -A");
    }

    #[test]
    fn command_failed_display() {
        let err = GitError::CommandFailed {
            command: "git add -A".into(),
            status: "exit status: 128".into(),
            stderr: "fatal: oops".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("git add -A"));
        assert!(msg.contains("fatal: oops"));
    }
}
