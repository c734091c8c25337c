//! Credential persistence.
//!
//! The [`CredentialStore`] is the only component that reads or writes the
//! persisted credential pair. The medium itself sits behind the
//! [`TokenStorage`] trait so the same client logic runs against a file, an
//! OS keychain, or plain memory in tests.

mod credential_store;
mod file;
mod storage;

pub use credential_store::{CredentialSnapshot, CredentialStore};
pub use file::FileStorage;
pub use storage::{
    ACCESS_TOKEN_KEY, MemoryStorage, REFRESH_TOKEN_KEY, StoredTokens, TokenStorage,
};
