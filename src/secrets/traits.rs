//! secrets::traits
//!
//! Secret storage trait definition.
//!
//! # Design
//!
//! A `SecretStore` holds exactly one secret document (the serialized token
//! bundle). It is overwritten wholesale on every write and removed on
//! disconnect.
//!
//! # Security
//!
//! Implementations MUST:
//! - Never log, print, or include secrets in error messages
//! - Be thread-safe (Send + Sync)

use std::path::Path;

use thiserror::Error;

/// Errors from secret storage operations.
///
/// Note: Error messages intentionally do not include secret values.
#[derive(Debug, Error)]
pub enum SecretError {
    /// Failed to read from secret storage.
    #[error("failed to read secret: {0}")]
    ReadError(String),

    /// Failed to write to secret storage.
    #[error("failed to write secret: {0}")]
    WriteError(String),

    /// Failed to delete from secret storage.
    #[error("failed to delete secret: {0}")]
    DeleteError(String),
}

/// Trait for single-document secret storage.
///
/// # Example
///
/// ```ignore
/// use commit_vibes::secrets::{FileSecretStore, SecretStore};
///
/// let store = FileSecretStore::with_path(path);
/// store.write("{...}")?;
/// assert!(store.read()?.is_some());
/// assert!(store.remove()?);
/// ```
pub trait SecretStore: Send + Sync {
    /// Read the stored document.
    ///
    /// Returns `Ok(None)` if nothing is stored.
    fn read(&self) -> Result<Option<String>, SecretError>;

    /// Replace the stored document.
    fn write(&self, value: &str) -> Result<(), SecretError>;

    /// Remove the stored document.
    ///
    /// Returns whether anything was removed.
    fn remove(&self) -> Result<bool, SecretError>;

    /// Where the document lives, for display. `None` for in-memory stores.
    fn location(&self) -> Option<&Path>;

    /// Check if a document is stored.
    fn exists(&self) -> Result<bool, SecretError> {
        Ok(self.read()?.is_some())
    }
}
