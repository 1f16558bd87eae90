use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use super::storage::{CookieAttributes, StorageError, StoredCookie, TokenStorage};

/// Persists the token cookie as a JSON record on disk.
///
/// Writes go through a sibling temp file and a rename, so a reader never
/// sees a half-written record.
#[derive(Debug)]
pub struct FileTokenStorage {
    path: PathBuf,
    attributes: CookieAttributes,
}

impl FileTokenStorage {
    pub fn new(path: PathBuf, attributes: CookieAttributes) -> Self {
        FileTokenStorage { path, attributes }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_cookie(&self) -> Result<Option<StoredCookie>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let cookie = match self.read_cookie() {
            Ok(cookie) => cookie,
            Err(StorageError::Corrupt(e)) => {
                warn!("Discarding unreadable token record at {}: {}", self.path.display(), e);
                self.clear()?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        match cookie {
            Some(cookie) if cookie.is_live(&self.attributes, Utc::now()) => Ok(Some(cookie.value)),
            Some(_) => {
                debug!("Stored token at {} has expired", self.path.display());
                self.clear()?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn store(&self, token: &str) -> Result<(), StorageError> {
        let cookie = StoredCookie::issue(&self.attributes, token, Utc::now());
        let bytes = serde_json::to_vec_pretty(&cookie)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        {
            let mut file = open_private(&temp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
