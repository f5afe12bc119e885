//! Local key/value state.
//!
//! A small JSON file holding string values under string keys, replaced on
//! every change. It carries the admin session flag and fallback snapshots of
//! the three resource collections; it is never the source of truth for them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::AppError;

/// Keys used in local storage.
pub mod keys {
    pub const ADMIN_LOGGED_IN: &str = "adminLoggedIn";
    pub const SITE_SETTINGS: &str = "siteSettings";
    pub const PROJECTS: &str = "projects";
    pub const QUOTE_REQUESTS: &str = "quoteRequests";
}

/// File-backed string map.
pub struct LocalStorage {
    /// `None` keeps everything in memory (tests)
    path: Option<PathBuf>,
    entries: Mutex<BTreeMap<String, String>>,
    /// Serializes file replacement; never held together with `entries`
    writer: tokio::sync::Mutex<()>,
}

impl LocalStorage {
    /// Open the state file, starting empty if it is missing or unreadable.
    pub async fn open(path: &Path) -> Self {
        let entries = match tokio::fs::read_to_string(path).await {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable local state {:?}: {}", path, e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!("Could not read local state {:?}: {}", path, e);
                BTreeMap::new()
            }
        };

        Self::with_entries(Some(path.to_path_buf()), entries)
    }

    /// Storage that never touches the filesystem.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::with_entries(None, BTreeMap::new())
    }

    fn with_entries(path: Option<PathBuf>, entries: BTreeMap<String, String>) -> Self {
        Self {
            path,
            entries: Mutex::new(entries),
            writer: tokio::sync::Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub async fn set(&self, key: &str, value: impl Into<String>) -> Result<(), AppError> {
        let _writer = self.writer.lock().await;
        let mut next = self.lock().clone();
        next.insert(key.to_string(), value.into());
        self.persist(&next).await?;
        *self.lock() = next;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        let _writer = self.writer.lock().await;
        let mut next = self.lock().clone();
        if next.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&next).await?;
        *self.lock() = next;
        Ok(())
    }

    /// Decode a JSON snapshot; an undecodable value reads as absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring malformed local snapshot '{}': {}", key, e);
                None
            }
        }
    }

    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)?;
        self.set(key, raw).await
    }

    /// Write the whole map beside the state file, then rename it into place.
    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let contents = serde_json::to_vec_pretty(entries)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let staging = staging_path(path);
        tokio::fs::write(&staging, contents).await?;
        tokio::fs::rename(&staging, path).await?;
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    PathBuf::from(staging)
}
