//! Model store
//!
//! Mediates all access to the trained model artifact. Readers get an
//! explicit [`ModelState`] instead of probing the filesystem, replacement
//! goes through a temp file and a rename so a reader sees either the old or
//! the new model and never a partial write, and retraining exclusivity is a
//! scoped guard.

use crate::error::{DemandError, Result};
use crate::models::DemandModel;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, TryLockError};

/// Outcome of loading the model artifact.
#[derive(Debug)]
pub enum ModelState {
    /// A complete model was read.
    Loaded(DemandModel),
    /// No model has been trained yet. A normal state, not an error.
    Absent,
    /// An artifact exists but could not be read or parsed.
    Corrupt,
}

/// Holds the exclusive training slot for as long as it lives.
#[derive(Debug)]
pub struct TrainingGuard<'a> {
    _lock: MutexGuard<'a, ()>,
}

/// Filesystem-backed store for the demand model artifact (JSON).
#[derive(Debug)]
pub struct ModelStore {
    path: PathBuf,
    training: Mutex<()>,
}

impl ModelStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            training: Mutex::new(()),
        }
    }

    /// Whether an artifact exists. Side-effect-free; does not validate it.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the current model artifact.
    pub fn load(&self) -> ModelState {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return ModelState::Absent,
            Err(_) => return ModelState::Corrupt,
        };
        match serde_json::from_slice(&bytes) {
            Ok(model) => ModelState::Loaded(model),
            Err(_) => ModelState::Corrupt,
        }
    }

    /// Atomically replace the artifact with `model`. The previous version
    /// stays readable until the rename lands.
    pub fn replace(&self, model: &DemandModel) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(model)?;
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Acquire the exclusive training slot. Fails with
    /// [`DemandError::TrainingInProgress`] when another retrain holds it;
    /// the slot is released when the guard is dropped, on success or failure.
    pub fn begin_training(&self) -> Result<TrainingGuard<'_>> {
        match self.training.try_lock() {
            Ok(lock) => Ok(TrainingGuard { _lock: lock }),
            Err(TryLockError::WouldBlock) => Err(DemandError::TrainingInProgress),
            Err(TryLockError::Poisoned(poisoned)) => Ok(TrainingGuard {
                _lock: poisoned.into_inner(),
            }),
        }
    }
}
