use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::{
    StateStore,
    error::StoreError,
    observed::{ObservedIncident, ObservedSet},
};

/// Version written to, and required from, the state file.
const STATE_VERSION: u32 = 1;

/// On-disk layout of the state file.
#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    version: u32,
    updated_at: DateTime<Utc>,
    incidents: Vec<ObservedIncident>,
}

/// Stores the observed set as a JSON document.
///
/// Saves go to a temporary file in the same directory which is synced and then renamed
/// over the target, so a crash leaves either the old or the new document.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store backed by the file at `path`. The file does not need to exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn write_err(&self) -> impl FnOnce(io::Error) -> StoreError + '_ {
        |source| StoreError::Write { path: self.path.clone(), source }
    }

    fn write_atomically(&self, contents: &[u8]) -> io::Result<()> {
        let dir = self.dir();
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        // make the rename itself durable
        #[cfg(unix)]
        fs::File::open(dir)?.sync_all()?;

        Ok(())
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<ObservedSet, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(
                    path = %self.path.display(),
                    "No state file found, starting with no known incidents"
                );
                return Ok(ObservedSet::new());
            }
            Err(source) => return Err(StoreError::Read { path: self.path.clone(), source }),
        };

        let file: StateFile = serde_json::from_str(&contents)
            .map_err(|source| StoreError::Corrupt { path: self.path.clone(), source })?;
        if file.version != STATE_VERSION {
            return Err(StoreError::UnsupportedVersion {
                path: self.path.clone(),
                version: file.version,
            });
        }

        debug!(
            path = %self.path.display(),
            open = file.incidents.len(),
            updated_at = %file.updated_at,
            "Loaded state"
        );
        Ok(file.incidents.into_iter().collect())
    }

    fn save(&self, set: &ObservedSet) -> Result<(), StoreError> {
        let file = StateFile {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            incidents: set.iter().cloned().collect(),
        };
        let mut contents =
            serde_json::to_vec_pretty(&file).map_err(io::Error::from).map_err(self.write_err())?;
        contents.push(b'\n');

        self.write_atomically(&contents).map_err(self.write_err())?;
        debug!(path = %self.path.display(), open = set.len(), "Saved state");
        Ok(())
    }
}
