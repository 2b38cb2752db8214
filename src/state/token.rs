//! Durable slot holding the single bearer credential.
//!
//! DESIGN
//! ======
//! The session layer only sees the [`TokenStore`] trait so the backend can be
//! swapped: memory for tests and ephemeral sessions, a file for native hosts.
//! Writes are durable before `set`/`clear` return; there is no buffering and
//! no expiry handling at this layer. Every backend hands back exactly the
//! token it was given and refuses to hold an empty one.

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the token file failed.
    #[error("token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An empty credential cannot be told apart from no credential.
    #[error("refusing to store an empty token")]
    EmptyToken,
}

/// Process-wide slot for at most one opaque bearer token.
pub trait TokenStore: Send + Sync {
    /// Current token, or `None` when the slot is empty.
    fn get(&self) -> Option<String>;

    /// Replace the held token.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyToken`] for `""`, or another [`StoreError`]
    /// if the token could not be made durable.
    fn set(&self, token: &str) -> Result<(), StoreError>;

    /// Empty the slot. Clearing an empty slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the stored token could not be removed.
    fn clear(&self) -> Result<(), StoreError>;
}

// =============================================================================
// MEMORY
// =============================================================================

/// In-process store; lost on exit.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { slot: Mutex::new(Some(token.into())) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: &str) -> Result<(), StoreError> {
        if token.is_empty() {
            return Err(StoreError::EmptyToken);
        }
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// Token persisted in a single file.
///
/// `set` writes a sibling temp file, syncs it, and renames it over the
/// target, then syncs the directory, so a crash leaves either the old token
/// or the new one. `clear` removes the file. Only a missing file reads as no
/// token; the contents are returned byte for byte.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }

    /// Flush the directory entry so a completed rename survives a crash.
    #[cfg(unix)]
    fn sync_parent(&self) -> Result<(), StoreError> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::File::open(parent)
            .and_then(|dir| dir.sync_all())
            .map_err(|e| self.io_error(e))
    }

    #[cfg(not(unix))]
    #[allow(clippy::unused_self, clippy::unnecessary_wraps)]
    fn sync_parent(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(token) => Some(token),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "token file unreadable; treating as empty");
                None
            }
        }
    }

    fn set(&self, token: &str) -> Result<(), StoreError> {
        if token.is_empty() {
            return Err(StoreError::EmptyToken);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let tmp = self.temp_path();
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&tmp).map_err(|e| self.io_error(e))?;
        file.write_all(token.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| self.io_error(e))?;
        drop(file);

        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        self.sync_parent()
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => self.sync_parent(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}
