//! secrets::memory_store
//!
//! In-memory secret store for tests and dry runs.

use std::path::Path;
use std::sync::{Arc, Mutex};

use super::traits::{SecretError, SecretStore};

/// Secret store that never touches disk.
///
/// Clones share the same document, so a test can keep a handle and
/// inspect what the code under test wrote.
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    inner: Arc<Mutex<Option<String>>>,
}

impl MemorySecretStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a document.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(value.into()))),
        }
    }
}

impl SecretStore for MemorySecretStore {
    fn read(&self) -> Result<Option<String>, SecretError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| SecretError::ReadError("store poisoned".into()))?;
        Ok(guard.clone())
    }

    fn write(&self, value: &str) -> Result<(), SecretError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| SecretError::WriteError("store poisoned".into()))?;
        *guard = Some(value.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<bool, SecretError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| SecretError::DeleteError("store poisoned".into()))?;
        Ok(guard.take().is_some())
    }

    fn location(&self) -> Option<&Path> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let store = MemorySecretStore::new();
        let handle = store.clone();

        store.write("doc").expect("write");
        assert_eq!(handle.read().expect("read").as_deref(), Some("doc"));

        assert!(handle.remove().expect("remove"));
        assert!(!store.exists().expect("exists"));
    }
}
