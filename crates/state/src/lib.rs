//! Persistence of the set of incidents already reported as open.
//!
//! Every run of the notifier is a fresh process, so this store is the only
//! memory it has. [`StateStore::load`] runs before reconciliation and
//! [`StateStore::save`] once after it.

/// Store errors
pub mod error;
/// File-backed store
pub mod file;
/// The observed set
pub mod observed;

pub use error::StoreError;
pub use file::FileStateStore;
pub use observed::{ObservedIncident, ObservedSet};

/// Durable storage for an [`ObservedSet`].
///
/// Implementations may assume they are the only writer for the duration of a run.
pub trait StateStore: Send + Sync {
    /// Load the last saved set. Returns an empty set when nothing was ever saved and an
    /// error when saved state exists but cannot be read.
    fn load(&self) -> Result<ObservedSet, StoreError>;

    /// Atomically replace the saved set.
    fn save(&self, set: &ObservedSet) -> Result<(), StoreError>;
}
