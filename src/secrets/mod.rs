//! secrets
//!
//! Storage for the music-service OAuth tokens.
//!
//! # Architecture
//!
//! Tokens are stored through the [`SecretStore`] trait:
//!
//! - [`FileSecretStore`]: plaintext JSON at `~/.commit-vibes/spotify-tokens.json` (default)
//! - [`MemorySecretStore`]: in-memory, for tests
//!
//! # Security
//!
//! - Token values are **never** logged or included in error messages
//! - The file store uses 0600 permissions on Unix
//! - All writes are atomic (temp file + rename)

mod file_store;
mod memory_store;
mod traits;

pub use file_store::FileSecretStore;
pub use memory_store::MemorySecretStore;
pub use traits::{SecretError, SecretStore};

use crate::core::paths::AppPaths;

/// Create the default token store for the given app paths.
pub fn create_store(paths: &AppPaths) -> Box<dyn SecretStore> {
    Box::new(FileSecretStore::with_path(paths.token_path()))
}
