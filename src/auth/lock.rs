//! auth::lock
//!
//! File lock guarding token refresh.
//!
//! Spotify may rotate the refresh token on every refresh, so two processes
//! refreshing at once can leave one of them holding a dead token. The lock
//! serializes refreshes across concurrent `commit-vibes` runs.
//!
//! # Invariants
//!
//! - Lock must be held during token refresh operations
//! - After acquiring the lock, the caller must re-read the token file
//!   (another process may have completed the refresh)
//! - Lock is released on drop

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use super::errors::AuthError;

/// Default timeout for lock acquisition (10 seconds).
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Polling interval when waiting for lock (100ms).
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// An exclusive lock for token refresh operations.
#[derive(Debug)]
pub struct AuthLock {
    path: PathBuf,
    file: Option<File>,
}

enum Attempt {
    Acquired(AuthLock),
    Busy,
}

impl AuthLock {
    /// Acquire the lock at `path`, polling until `timeout` expires.
    ///
    /// # Errors
    ///
    /// - [`AuthError::LockTimeout`] if the timeout expires before acquiring
    /// - [`AuthError::LockError`] if there's an I/O error
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, AuthError> {
        let deadline = Instant::now() + timeout;
        Self::ensure_parent(path)?;

        loop {
            match Self::attempt(path)? {
                Attempt::Acquired(lock) => return Ok(lock),
                Attempt::Busy => {
                    if Instant::now() >= deadline {
                        return Err(AuthError::LockTimeout);
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
            }
        }
    }

    /// Try to acquire the lock without blocking.
    ///
    /// Returns `Ok(None)` if another holder has it.
    pub fn try_acquire(path: &Path) -> Result<Option<Self>, AuthError> {
        Self::ensure_parent(path)?;
        match Self::attempt(path)? {
            Attempt::Acquired(lock) => Ok(Some(lock)),
            Attempt::Busy => Ok(None),
        }
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AuthError::LockError(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }
        Ok(())
    }

    fn attempt(path: &Path) -> Result<Attempt, AuthError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| AuthError::LockError(format!("cannot open {}: {}", path.display(), e)))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Attempt::Acquired(Self {
                path: path.to_path_buf(),
                file: Some(file),
            })),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(Attempt::Busy),
            Err(e) => Err(AuthError::LockError(format!("lock failed: {}", e))),
        }
    }

    /// Check if the lock is currently held.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for AuthLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}
