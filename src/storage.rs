use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Error;
use crate::token::Credential;

/// Persisted form of a credential: the raw token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub token: String,
    #[serde(with = "time::serde::timestamp")]
    pub expires_at: OffsetDateTime,
}

impl From<&Credential> for StoredCredential {
    fn from(credential: &Credential) -> Self {
        Self {
            token: credential.token().as_str().to_owned(),
            expires_at: credential.expires_at(),
        }
    }
}

/// Key-value persistence for the current credential.
///
/// Holds at most one record. `remove` on an empty storage succeeds.
pub trait CredentialStorage: Send + Sync + 'static {
    fn load(&self) -> Result<Option<StoredCredential>, Error>;

    fn save(&self, record: &StoredCredential) -> Result<(), Error>;

    fn remove(&self) -> Result<(), Error>;
}

impl<T: CredentialStorage> CredentialStorage for Arc<T> {
    fn load(&self) -> Result<Option<StoredCredential>, Error> {
        (**self).load()
    }

    fn save(&self, record: &StoredCredential) -> Result<(), Error> {
        (**self).save(record)
    }

    fn remove(&self) -> Result<(), Error> {
        (**self).remove()
    }
}

/// Storage that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<StoredCredential>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn seeded(record: StoredCredential) -> Self {
        Self {
            slot: Mutex::new(Some(record)),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<StoredCredential> {
        self.slot.lock().clone()
    }
}

impl CredentialStorage for MemoryStorage {
    fn load(&self) -> Result<Option<StoredCredential>, Error> {
        Ok(self.snapshot())
    }

    fn save(&self, record: &StoredCredential) -> Result<(), Error> {
        *self.slot.lock() = Some(record.clone());
        Ok(())
    }

    fn remove(&self) -> Result<(), Error> {
        *self.slot.lock() = None;
        Ok(())
    }
}

/// Storage backed by a JSON file, for desktop and CLI clients.
///
/// Saves go through a sibling temp file that is renamed into place, so a
/// reader never sees a half-written record. On Unix the file is readable by
/// the owner only. A file that fails to parse is deleted on load.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStorage for FileStorage {
    fn load(&self) -> Result<Option<StoredCredential>, Error> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Storage(format!("{}: {e}", self.path.display()))),
        };
        match serde_json::from_str(&contents) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Removing corrupt credential file");
                self.remove()?;
                Err(Error::Storage(format!("{}: {e}", self.path.display())))
            }
        }
    }

    fn save(&self, record: &StoredCredential) -> Result<(), Error> {
        let parent = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Error::Storage(format!("{}: {e}", parent.display())))?;
                parent
            }
            None => Path::new("."),
        };
        let json = serde_json::to_vec(record)
            .map_err(|e| Error::Storage(format!("serialize credential: {e}")))?;

        let io_err = |e: std::io::Error| Error::Storage(format!("{}: {e}", self.path.display()));
        let mut file = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
        file.write_all(&json).map_err(io_err)?;
        file.as_file().sync_all().map_err(io_err)?;
        file.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    fn remove(&self) -> Result<(), Error> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!("{}: {e}", self.path.display()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> StoredCredential {
        StoredCredential {
            token: "h.p.s".into(),
            expires_at: OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        }
    }

    #[test]
    fn memory_storage_lifecycle() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.load().unwrap(), None);

        storage.save(&record()).unwrap();
        assert_eq!(storage.load().unwrap(), Some(record()));

        storage.remove().unwrap();
        storage.remove().unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credential.json");

        FileStorage::new(&path).save(&record()).unwrap();
        assert_eq!(FileStorage::new(&path).load().unwrap(), Some(record()));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"expires_at\":1700000000"));
    }

    #[test]
    fn file_storage_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.json"));
        assert_eq!(storage.load().unwrap(), None);
        storage.remove().unwrap();
    }

    #[test]
    fn file_storage_corrupt_file_is_error_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credential.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(storage.load(), Err(Error::Storage(_))));
        assert!(!path.exists());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn file_storage_save_replaces_existing_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credential.json");
        std::fs::write(&path, "stale").unwrap();

        let storage = FileStorage::new(&path);
        storage.save(&record()).unwrap();
        assert_eq!(storage.load().unwrap(), Some(record()));

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[cfg(unix)]
    #[test]
    fn file_storage_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credential.json");
        FileStorage::new(&path).save(&record()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
