use incident::FetchError;
use state::StoreError;
use thiserror::Error;

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Saved state could not be loaded. Nothing was fetched or sent.
    #[error("failed to load state: {0}")]
    StoreRead(#[source] StoreError),
    /// Incidents could not be fetched. Nothing was sent.
    #[error("failed to fetch incidents: {0}")]
    Fetch(#[from] FetchError),
    /// Notifications went out but the new state could not be saved, so the
    /// next run may repeat them.
    #[error("{delivered} notification(s) delivered but state could not be saved: {source}")]
    StoreWrite {
        /// Notifications delivered during the run
        delivered: usize,
        /// Underlying store error
        source: StoreError,
    },
}

impl RunError {
    /// Process exit status for this error.
    ///
    /// `1` means nothing was changed and the next run retries from the same state.
    /// `3` means notifications were delivered but not recorded.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::StoreWrite { delivered, .. } if *delivered > 0 => 3,
            _ => 1,
        }
    }

    /// Short label for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StoreRead(_) => "store_read",
            Self::Fetch(e) => e.kind(),
            Self::StoreWrite { .. } => "store_write",
        }
    }
}
