//! File-backed key/value storage.

use std::{fs, io::ErrorKind, path::PathBuf};

use clap::Args;
use sanisidro::storage::{Storage, StorageError};
use tracing::debug;

/// Local storage settings.
#[derive(Debug, Clone, Args)]
pub struct StorageConfig {
    /// Directory holding the persisted cart and session
    #[arg(long, env = "SANISIDRO_STORAGE_DIR", default_value = ".sanisidro")]
    pub storage_dir: PathBuf,
}

/// Keeps each key in its own `<key>.json` file inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`. The directory is created on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path(key);
        let staging = path.with_extension("json.tmp");

        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;

        debug!(path = %path.display(), "saved");

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}
