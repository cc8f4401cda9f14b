//! The snapshot holder: owns the current [`AppState`] and keeps the
//! persistence collaborator informed of every change.

use std::sync::Arc;

use ridecheck_state::{AppState, BlobError, PersistError, Ridecheck, StateRepository};
use tracing::{debug, warn};

use super::{Edit, apply_edit};

/// Errors surfaced by the holder. None of them invalidate the in-memory
/// snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Blob(#[from] BlobError),

    /// The stored state failed to load and could not be set aside, so it is
    /// never overwritten.
    #[error("not saving: stored state could not be loaded or backed up")]
    Protected,
}

/// Outcome of [`Store::apply`].
#[derive(Debug)]
pub struct Applied {
    /// The snapshot now current in the store.
    pub snapshot: Arc<AppState>,
    /// Set when the new snapshot could not be handed to persistence.
    pub persist_error: Option<StoreError>,
}

impl Applied {
    pub fn persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}

/// Exclusive owner of the current snapshot.
///
/// Snapshots are handed out as `Arc<AppState>` and never mutated, so a
/// generation run can keep reading the snapshot it started from while
/// further edits produce new ones.
pub struct Store<R> {
    repo: R,
    current: Arc<AppState>,
    protected: bool,
}

impl<R: StateRepository> Store<R> {
    /// Load the persisted state, seeding storage with the built-in default
    /// on first run.
    ///
    /// A load or parse failure is returned alongside a store holding the
    /// default state, so the session can continue. The unreadable blob is
    /// backed up first; if that fails too, the store never writes.
    pub fn open(repo: R) -> (Self, Option<StoreError>) {
        let default = AppState::default();
        match load_state(&repo, &default) {
            Ok(state) => (Self::with_state(repo, state), None),
            Err(e) => {
                warn!(error = %e, "failed to load state, starting from default");
                let mut store = Self::with_state(repo, default);
                if let Err(backup_err) = store.repo.back_up() {
                    warn!(error = %backup_err, "failed to back up stored state, saving disabled");
                    store.protected = true;
                }
                (store, Some(e))
            }
        }
    }

    /// Wrap an existing state without touching storage.
    pub fn with_state(repo: R, state: AppState) -> Self {
        Self {
            repo,
            current: Arc::new(state),
            protected: false,
        }
    }

    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.current)
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Apply `edit` to the current snapshot and persist the result.
    ///
    /// The new snapshot becomes current even if persisting it fails.
    pub fn apply(&mut self, edit: Edit) -> Applied {
        let kind = edit.kind();
        self.current = Arc::new(apply_edit(&self.current, edit));
        debug!(edit = kind, "applied edit");

        let persist_error = self.flush().err();
        if let Some(ref e) = persist_error {
            warn!(edit = kind, error = %e, "failed to persist state");
        }

        Applied {
            snapshot: self.snapshot(),
            persist_error,
        }
    }

    /// Replace the ridecheck collection with a successful generation result.
    ///
    /// Applied against whatever snapshot is current, so concurrent edits to
    /// other collections are kept.
    pub fn commit_ridechecks(&mut self, ridechecks: Vec<Ridecheck>) -> Applied {
        self.apply(Edit::ReplaceRidechecks(ridechecks))
    }

    /// Write the current snapshot to storage (e.g. at session end).
    pub fn flush(&self) -> Result<(), StoreError> {
        if self.protected {
            return Err(StoreError::Protected);
        }
        let blob = self.current.to_blob()?;
        self.repo.store(&blob)?;
        Ok(())
    }
}

fn load_state<R: StateRepository>(repo: &R, default: &AppState) -> Result<AppState, StoreError> {
    let blob = repo.load(&default.to_blob()?)?;
    Ok(AppState::from_blob(&blob)?)
}
