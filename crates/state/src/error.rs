use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised by a [`StateStore`](crate::StateStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Saved state exists but could not be read.
    #[error("failed to read state file {}: {source}", path.display())]
    Read {
        /// State file location
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// Saved state is not valid JSON of the expected shape.
    #[error("state file {} is corrupt: {source}", path.display())]
    Corrupt {
        /// State file location
        path: PathBuf,
        /// Decoding error
        source: serde_json::Error,
    },
    /// Saved state was written by an incompatible version.
    #[error("state file {} has unsupported version {version}", path.display())]
    UnsupportedVersion {
        /// State file location
        path: PathBuf,
        /// Version found in the file
        version: u32,
    },
    /// New state could not be persisted.
    #[error("failed to write state file {}: {source}", path.display())]
    Write {
        /// State file location
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
}

impl StoreError {
    /// Whether this error happened while saving.
    pub const fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}
