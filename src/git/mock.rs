//! git::mock
//!
//! In-memory [`Vcs`] for tests.
//!
//! Records every mutating call so tests can assert what the commit flow
//! did (or, more often, did not do).
//!
//! # Example
//!
//! ```
//! use commit_vibes::git::{MockVcs, Vcs, VcsOperation};
//!
//! let vcs = MockVcs::new().with_unstaged(["a.rs", "b.rs"]);
//! vcs.stage_all().unwrap();
//! assert_eq!(vcs.staged_files().unwrap(), vec!["a.rs", "b.rs"]);
//! assert_eq!(vcs.operations(), vec![VcsOperation::StageAll]);
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use super::interface::{GitError, Vcs};

/// A recorded mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsOperation {
    StageAll,
    StageFiles(Vec<String>),
    Commit(String),
}

/// Which call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    StagedFiles,
    Stage,
    Commit,
}

#[derive(Debug, Default)]
struct MockVcsInner {
    staged: Vec<String>,
    unstaged: Vec<String>,
    fail_on: Option<FailOn>,
    operations: Vec<VcsOperation>,
}

/// Mock repository. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockVcs {
    inner: Arc<Mutex<MockVcsInner>>,
}

impl MockVcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_staged<I, S>(self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().staged = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_unstaged<I, S>(self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().unstaged = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn fail_on(self, which: FailOn) -> Self {
        self.lock().fail_on = Some(which);
        self
    }

    /// All mutating calls so far, in order.
    pub fn operations(&self) -> Vec<VcsOperation> {
        self.lock().operations.clone()
    }

    /// The message of the last commit, if any.
    pub fn last_commit(&self) -> Option<String> {
        self.lock().operations.iter().rev().find_map(|op| match op {
            VcsOperation::Commit(msg) => Some(msg.clone()),
            _ => None,
        })
    }

    fn lock(&self) -> MutexGuard<'_, MockVcsInner> {
        // A poisoned mock means a test already panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn injected(which: FailOn) -> GitError {
        GitError::CommandFailed {
            command: format!("mock {:?}", which),
            status: "exit status: 1".to_string(),
            stderr: "injected failure".to_string(),
        }
    }
}

impl Vcs for MockVcs {
    fn staged_files(&self) -> Result<Vec<String>, GitError> {
        let inner = self.lock();
        if inner.fail_on == Some(FailOn::StagedFiles) {
            return Err(Self::injected(FailOn::StagedFiles));
        }
        Ok(inner.staged.clone())
    }

    fn unstaged_files(&self) -> Result<Vec<String>, GitError> {
        Ok(self.lock().unstaged.clone())
    }

    fn stage_all(&self) -> Result<(), GitError> {
        let mut inner = self.lock();
        if inner.fail_on == Some(FailOn::Stage) {
            return Err(Self::injected(FailOn::Stage));
        }
        inner.operations.push(VcsOperation::StageAll);
        let moved = std::mem::take(&mut inner.unstaged);
        for file in moved {
            if !inner.staged.contains(&file) {
                inner.staged.push(file);
            }
        }
        Ok(())
    }

    fn stage_files(&self, files: &[String]) -> Result<(), GitError> {
        if files.is_empty() {
            return Err(GitError::NothingSelected);
        }
        let mut inner = self.lock();
        if inner.fail_on == Some(FailOn::Stage) {
            return Err(Self::injected(FailOn::Stage));
        }
        inner.operations.push(VcsOperation::StageFiles(files.to_vec()));
        inner.unstaged.retain(|f| !files.contains(f));
        for file in files {
            if !inner.staged.contains(file) {
                inner.staged.push(file.clone());
            }
        }
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        let mut inner = self.lock();
        if inner.fail_on == Some(FailOn::Commit) {
            return Err(Self::injected(FailOn::Commit));
        }
        inner.operations.push(VcsOperation::Commit(message.to_string()));
        inner.staged.clear();
        Ok(())
    }
}
