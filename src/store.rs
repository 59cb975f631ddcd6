//! Storage seams — encrypted secret store and unencrypted marker store
//!
//! The core never talks to platform keychains directly; it goes through
//! these two traits. `delete` on a missing key is a no-op by contract, so
//! callers never have to special-case "already gone".
//!
//! Two bundled implementations each: in-memory (tests, ephemeral contexts)
//! and file-per-key (desktop builds without a keychain integration).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{Result, SessionError};

/// Encrypted key-value store holding secret material
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;
    /// Deleting a missing key is not an error
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Unencrypted one-bit marker store for first-run detection
#[async_trait]
pub trait MarkerStore: Send + Sync {
    async fn get_flag(&self, key: &str) -> Result<bool>;
    async fn set_flag(&self, key: &str) -> Result<()>;
}

// ─── In-Memory Implementations ───

/// In-memory secret store
#[derive(Default, Clone)]
pub struct MemorySecretStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// In-memory marker store
#[derive(Default, Clone)]
pub struct MemoryMarkerStore {
    flags: Arc<Mutex<HashMap<String, bool>>>,
}

impl MemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MarkerStore for MemoryMarkerStore {
    async fn get_flag(&self, key: &str) -> Result<bool> {
        Ok(self.flags.lock().await.get(key).copied().unwrap_or(false))
    }

    async fn set_flag(&self, key: &str) -> Result<()> {
        self.flags.lock().await.insert(key.to_string(), true);
        Ok(())
    }
}

// ─── File-Backed Implementations ───

/// File-per-key secret store rooted at a directory.
///
/// Keys map to file names with path separators rejected; the caller is
/// expected to point this at an OS-protected directory.
pub struct FileSecretStore {
    root: PathBuf,
}

impl FileSecretStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.contains('/') || key.contains('\\') {
            return Err(SessionError::Storage(format!(
                "invalid storage key: {key}"
            )));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, value).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// File-backed marker store; a marker is set iff its file exists
pub struct FileMarkerStore {
    root: PathBuf,
}

impl FileMarkerStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl MarkerStore for FileMarkerStore {
    async fn get_flag(&self, key: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.root.join(key))
            .await
            .unwrap_or(false))
    }

    async fn set_flag(&self, key: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(key), b"1").await?;
        Ok(())
    }
}
