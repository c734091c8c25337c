//! File-backed token storage.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use crate::auth::TokenPair;
use crate::error::StorageError;

use super::storage::{StoredTokens, TokenStorage};

/// Persists the two token keys as a JSON object in a single file.
///
/// The file is created with mode `0600` on Unix and replaced atomically on
/// every save, so the tokens are never readable by other users. Parent
/// directories are created on first save.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create storage backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl TokenStorage for FileStorage {
    fn load(&self) -> Result<StoredTokens, StorageError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoredTokens::default()),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
            message: e.to_string(),
        })
    }

    fn save(&self, pair: &TokenPair) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(&StoredTokens::from_pair(pair)).map_err(|e| {
            StorageError::Corrupt {
                message: e.to_string(),
            }
        })?;

        // A leftover temp file may carry wider permissions; start fresh.
        let tmp = self.path.with_extension("json.tmp");
        match fs::remove_file(&tmp) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(self.io_error(e)),
        }

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&tmp).map_err(|e| self.io_error(e))?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| self.io_error(e))?;
        drop(file);

        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), "Credentials written");
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("credentials.json"));
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("credentials.json"));

        storage.save(&TokenPair::new("T1", "R1")).unwrap();
        let loaded = storage.load().unwrap();
        assert_eq!(loaded.access_token.as_deref(), Some("T1"));
        assert_eq!(loaded.refresh_token.as_deref(), Some("R1"));

        let raw = fs::read_to_string(storage.path()).unwrap();
        assert!(raw.contains("\"accessToken\""));
        assert!(raw.contains("\"refreshToken\""));
    }

    #[cfg(unix)]
    #[test]
    fn file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("credentials.json"));
        storage.save(&TokenPair::new("T1", "R1")).unwrap();

        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn save_replaces_world_readable_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"accessToken": "OLD", "refreshToken": "OLD"}"#).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        fs::write(dir.path().join("credentials.json.tmp"), "stale").unwrap();

        let storage = FileStorage::new(&path);
        storage.save(&TokenPair::new("T2", "R2")).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(storage.load().unwrap().access_token.as_deref(), Some("T2"));
        assert!(!dir.path().join("credentials.json.tmp").exists());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("credentials.json"));
        storage.save(&TokenPair::new("T1", "R1")).unwrap();

        storage.clear().unwrap();
        assert!(!storage.path().exists());
        storage.clear().unwrap();
    }

    #[test]
    fn partial_file_loads_partial() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"accessToken": "T1"}"#).unwrap();

        let loaded = FileStorage::new(&path).load().unwrap();
        assert_eq!(loaded.access_token.as_deref(), Some("T1"));
        assert!(loaded.refresh_token.is_none());
    }

    #[test]
    fn garbage_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "not json").unwrap();

        let err = FileStorage::new(&path).load().unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
