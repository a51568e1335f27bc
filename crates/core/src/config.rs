//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the code that loads
//! and saves the clinic data. Nothing in the core reads environment variables while an
//! operation is running.

use crate::constants::{DEFAULT_DATA_DIR, PATIENTS_FILENAME, QUEUE_FILENAME};
use crate::{ClinicError, ClinicResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig` rooted at `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::InvalidInput`] if `data_dir` is empty.
    pub fn new(data_dir: PathBuf) -> ClinicResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(ClinicError::InvalidInput("data_dir cannot be empty".into()));
        }
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// File holding the permanent patient records.
    pub fn patients_file(&self) -> PathBuf {
        self.data_dir.join(PATIENTS_FILENAME)
    }

    /// File holding the persisted waiting queue.
    pub fn queue_file(&self) -> PathBuf {
        self.data_dir.join(QUEUE_FILENAME)
    }

    /// Create the data directory if it does not exist yet.
    pub fn ensure_data_dir(&self) -> ClinicResult<()> {
        if self.data_dir.is_dir() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.data_dir).map_err(ClinicError::StorageDirCreation)?;
        tracing::info!("created directory: {}", self.data_dir.display());
        Ok(())
    }
}

/// Resolve the data directory from an optional override value.
///
/// If `value` is `None` or empty/whitespace, returns the default `data` directory.
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from)
}
