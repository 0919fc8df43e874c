//! Session credential and its persistent slot.
//!
//! Exactly one secret is persisted: the bearer token of the current session.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

/// Filename of the persisted token inside the data directory.
const TOKEN_FILE: &str = "session_token";

/// Opaque bearer token identifying an authenticated session.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

/// Errors from a credential store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on '{}': {}", .0.display(), .1)]
    Io(PathBuf, #[source] io::Error),

    #[error("Credential store unavailable: {0}")]
    Unavailable(String),
}

/// A single persisted secret slot.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored credential, `Ok(None)` if the slot is empty.
    fn load(&self) -> Result<Option<Credential>, StoreError>;

    fn save(&self, credential: &Credential) -> Result<(), StoreError>;

    /// Empties the slot. Deleting an empty slot is not an error.
    fn delete(&self) -> Result<(), StoreError>;
}

/// Stores the token in `<data_dir>/session_token`, owner-readable only.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    data_dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(TOKEN_FILE)
    }

    #[cfg(unix)]
    fn write_private(path: &Path, contents: &str) -> io::Result<()> {
        use std::io::Write;
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        // mode() only applies on creation
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
        file.write_all(contents.as_bytes())
    }

    #[cfg(not(unix))]
    fn write_private(path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>, StoreError> {
        let path = self.path();

        match fs::read_to_string(&path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(Credential::new(token)))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(path, e)),
        }
    }

    fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StoreError::Io(self.data_dir.clone(), e))?;

        let path = self.path();
        Self::write_private(&path, credential.as_str()).map_err(|e| StoreError::Io(path, e))
    }

    fn delete(&self) -> Result<(), StoreError> {
        let path = self.path();

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(path, e)),
        }
    }
}

/// In-memory slot for tests and embedders without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<Credential>>, StoreError> {
        self.slot
            .lock()
            .map_err(|_| StoreError::Unavailable("credential slot poisoned".to_string()))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        *self.lock()? = Some(credential.clone());
        Ok(())
    }

    fn delete(&self) -> Result<(), StoreError> {
        *self.lock()? = None;
        Ok(())
    }
}
