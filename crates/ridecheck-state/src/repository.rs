//! The persistence collaborator: load and store one opaque state blob.
//!
//! Writes are best effort: one write per call, no journaling, no fsync.
//! Callers decide what a failure means; the repository only reports it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

/// Errors reported by a [`StateRepository`].
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to {action} state file {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state storage unavailable: {0}")]
    Unavailable(String),
}

/// Loads and stores the serialized application state.
pub trait StateRepository: Send + Sync {
    /// Return the stored blob.
    ///
    /// When nothing has been stored yet, `default_blob` is stored first and
    /// then returned, so later loads see the same data.
    fn load(&self, default_blob: &[u8]) -> Result<Vec<u8>, PersistError>;

    /// Replace the stored blob.
    fn store(&self, blob: &[u8]) -> Result<(), PersistError>;

    /// Move the stored blob aside so a later `store` cannot overwrite it.
    ///
    /// Called after a blob failed to load. Succeeds without doing anything
    /// when nothing is stored.
    fn back_up(&self) -> Result<(), PersistError>;
}

// ---------------------------------------------------------------------------
// File-backed
// ---------------------------------------------------------------------------

/// Keeps the blob in a single file, creating parent directories on demand.
#[derive(Debug, Clone)]
pub struct FileRepository {
    path: PathBuf,
}

impl FileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where [`StateRepository::back_up`] moves the file: the state path
    /// with `.bak` appended, e.g. `state.json.bak`.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }

    fn io_error(&self, action: &'static str) -> impl FnOnce(std::io::Error) -> PersistError + '_ {
        move |source| PersistError::Io {
            action,
            path: self.path.clone(),
            source,
        }
    }

    fn write(&self, blob: &[u8]) -> Result<(), PersistError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(self.io_error("create directory for"))?;
        }
        std::fs::write(&self.path, blob).map_err(self.io_error("write"))
    }
}

impl StateRepository for FileRepository {
    fn load(&self, default_blob: &[u8]) -> Result<Vec<u8>, PersistError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no state file yet, writing default");
            self.write(default_blob)?;
        }
        std::fs::read(&self.path).map_err(self.io_error("read"))
    }

    fn store(&self, blob: &[u8]) -> Result<(), PersistError> {
        self.write(blob)?;
        debug!(path = %self.path.display(), bytes = blob.len(), "state stored");
        Ok(())
    }

    fn back_up(&self) -> Result<(), PersistError> {
        if !self.path.exists() {
            return Ok(());
        }
        let backup = self.backup_path();
        std::fs::rename(&self.path, &backup).map_err(self.io_error("back up"))?;
        debug!(path = %self.path.display(), backup = %backup.display(), "state file set aside");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Holds the blob in memory. Clones share the same storage.
///
/// [`MemoryRepository::fail_stores`] and [`MemoryRepository::fail_backups`]
/// make every subsequent `store` or `back_up` fail, which lets callers
/// exercise persistence-failure handling.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    blob: Arc<Mutex<Option<Vec<u8>>>>,
    backup: Arc<Mutex<Option<Vec<u8>>>>,
    failing: Arc<AtomicBool>,
    failing_backups: Arc<AtomicBool>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository that already holds `blob`.
    pub fn with_blob(blob: Vec<u8>) -> Self {
        let repo = Self::new();
        *repo.blob.lock().unwrap_or_else(|e| e.into_inner()) = Some(blob);
        repo
    }

    /// The currently stored blob, if any.
    pub fn stored(&self) -> Option<Vec<u8>> {
        self.blob.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The blob most recently moved aside by `back_up`, if any.
    pub fn backed_up(&self) -> Option<Vec<u8>> {
        self.backup.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn fail_stores(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn fail_backups(&self, failing: bool) {
        self.failing_backups.store(failing, Ordering::SeqCst);
    }
}

impl StateRepository for MemoryRepository {
    fn load(&self, default_blob: &[u8]) -> Result<Vec<u8>, PersistError> {
        let mut slot = self
            .blob
            .lock()
            .map_err(|_| PersistError::Unavailable("memory store lock poisoned".to_owned()))?;
        Ok(slot.get_or_insert_with(|| default_blob.to_vec()).clone())
    }

    fn store(&self, blob: &[u8]) -> Result<(), PersistError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistError::Unavailable("memory store is set to fail".to_owned()));
        }
        let mut slot = self
            .blob
            .lock()
            .map_err(|_| PersistError::Unavailable("memory store lock poisoned".to_owned()))?;
        *slot = Some(blob.to_vec());
        Ok(())
    }

    fn back_up(&self) -> Result<(), PersistError> {
        if self.failing_backups.load(Ordering::SeqCst) {
            return Err(PersistError::Unavailable("memory backup is set to fail".to_owned()));
        }
        let mut slot = self
            .blob
            .lock()
            .map_err(|_| PersistError::Unavailable("memory store lock poisoned".to_owned()))?;
        if let Some(blob) = slot.take() {
            *self.backup.lock().unwrap_or_else(|e| e.into_inner()) = Some(blob);
        }
        Ok(())
    }
}
