//! Persistence medium for the credential pair.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::auth::TokenPair;
use crate::error::StorageError;

/// Key under which the access token is persisted.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Key under which the refresh token is persisted.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Raw persisted contents: two independently stored keys.
///
/// The medium may hold only one of them (interrupted write, manual edit);
/// [`CredentialStore`](super::CredentialStore) decides what that means.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(rename = "accessToken", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl StoredTokens {
    /// Both keys set from a complete pair.
    pub fn from_pair(pair: &TokenPair) -> Self {
        Self {
            access_token: Some(pair.access.as_str().to_string()),
            refresh_token: Some(pair.refresh.as_str().to_string()),
        }
    }

    /// Returns true if neither key is present.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// A durable key/value medium for the two token keys.
///
/// Implementations must be safe to call from any task. They are only ever
/// called by the credential store.
pub trait TokenStorage: Send + Sync {
    /// Read whatever is persisted. A missing medium is not an error and
    /// yields empty contents.
    fn load(&self) -> Result<StoredTokens, StorageError>;

    /// Persist both keys.
    fn save(&self, pair: &TokenPair) -> Result<(), StorageError>;

    /// Remove both keys. Removing nothing is not an error.
    fn clear(&self) -> Result<(), StorageError>;
}

/// In-process storage that does not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    contents: Mutex<StoredTokens>,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with raw contents, possibly partial.
    pub fn with_contents(contents: StoredTokens) -> Self {
        Self {
            contents: Mutex::new(contents),
        }
    }

    /// Returns a copy of the raw contents.
    pub fn contents(&self) -> StoredTokens {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TokenStorage for MemoryStorage {
    fn load(&self) -> Result<StoredTokens, StorageError> {
        Ok(self.contents())
    }

    fn save(&self, pair: &TokenPair) -> Result<(), StorageError> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) =
            StoredTokens::from_pair(pair);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = StoredTokens::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.load().unwrap().is_empty());

        storage.save(&TokenPair::new("T1", "R1")).unwrap();
        let loaded = storage.load().unwrap();
        assert_eq!(loaded.access_token.as_deref(), Some("T1"));
        assert_eq!(loaded.refresh_token.as_deref(), Some("R1"));

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_empty());
        storage.clear().unwrap();
    }

    #[test]
    fn stored_tokens_use_well_known_keys() {
        let json = serde_json::to_value(StoredTokens::from_pair(&TokenPair::new("a", "r"))).unwrap();
        assert_eq!(json[ACCESS_TOKEN_KEY], "a");
        assert_eq!(json[REFRESH_TOKEN_KEY], "r");
    }
}
