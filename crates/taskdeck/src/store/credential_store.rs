//! Single source of truth for the credential pair.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::auth::TokenPair;

use super::storage::{MemoryStorage, TokenStorage};

/// Holds the current credential pair in memory and mirrors it to a
/// [`TokenStorage`] medium.
///
/// Every change to the pair (a `set`, or a `clear` that removed something)
/// bumps a monotonic generation counter. Readers that need to know whether
/// the pair changed since they last looked use [`snapshot`](Self::snapshot).
///
/// Persistence failures never fail an in-memory update; they are logged and
/// the process continues with the in-memory pair.
pub struct CredentialStore {
    storage: Arc<dyn TokenStorage>,
    state: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    pair: Option<TokenPair>,
    generation: u64,
}

/// The credential pair together with the generation it belongs to.
#[derive(Debug, Clone)]
pub struct CredentialSnapshot {
    pub generation: u64,
    pub pair: Option<TokenPair>,
}

impl CredentialStore {
    /// Create an empty store over `storage` without reading it.
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            storage,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Create a store over `storage` and rehydrate from it immediately.
    pub fn open(storage: Arc<dyn TokenStorage>) -> Self {
        let store = Self::new(storage);
        store.rehydrate();
        store
    }

    /// Create a store backed by [`MemoryStorage`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Reload the pair from the storage medium.
    ///
    /// A partially persisted pair (one key without the other) is treated as
    /// absent and the remnant is removed. An unreadable medium is treated as
    /// empty.
    pub fn rehydrate(&self) -> Option<TokenPair> {
        let loaded = match self.storage.load() {
            Ok(stored) => {
                let partial = !stored.is_empty()
                    && (stored.access_token.is_none() || stored.refresh_token.is_none());
                let pair = TokenPair::from_parts(stored.access_token, stored.refresh_token);
                if pair.is_none() && partial {
                    warn!("Discarding partially persisted credentials");
                    if let Err(e) = self.storage.clear() {
                        warn!(error = %e, "Failed to remove partial credentials");
                    }
                }
                pair
            }
            Err(e) => {
                warn!(error = %e, "Credential storage unavailable, starting signed out");
                None
            }
        };

        let mut state = self.write();
        if state.pair != loaded {
            state.pair = loaded.clone();
            state.generation += 1;
        }
        info!(restored = loaded.is_some(), "Credential store rehydrated");
        loaded
    }

    /// Returns the current pair, if any.
    pub fn get(&self) -> Option<TokenPair> {
        self.read().pair.clone()
    }

    /// Returns the current pair and its generation, read together.
    pub fn snapshot(&self) -> CredentialSnapshot {
        let state = self.read();
        CredentialSnapshot {
            generation: state.generation,
            pair: state.pair.clone(),
        }
    }

    /// Returns true if a pair is held.
    pub fn has(&self) -> bool {
        self.read().pair.is_some()
    }

    /// Returns the current generation.
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    /// Replace the pair.
    ///
    /// Both tokens become visible to readers in a single step.
    pub fn set(&self, pair: TokenPair) {
        let mut state = self.write();
        if let Err(e) = self.storage.save(&pair) {
            warn!(error = %e, "Failed to persist credentials, keeping them in memory only");
        }
        state.pair = Some(pair);
        state.generation += 1;
        debug!(generation = state.generation, "Credentials updated");
    }

    /// Replace the pair only if the store is still at generation `expected`.
    ///
    /// Returns false, leaving the store untouched, if anything changed the
    /// pair after `expected` was read (a logout, a new login, or another
    /// refresh).
    pub fn set_if_generation(&self, expected: u64, pair: TokenPair) -> bool {
        let mut state = self.write();
        if state.generation != expected {
            debug!(
                expected,
                current = state.generation,
                "Discarding credentials for a superseded generation"
            );
            return false;
        }
        if let Err(e) = self.storage.save(&pair) {
            warn!(error = %e, "Failed to persist credentials, keeping them in memory only");
        }
        state.pair = Some(pair);
        state.generation += 1;
        debug!(generation = state.generation, "Credentials updated");
        true
    }

    /// Log out from generation `expected`: remove both tokens and advance
    /// the generation, even if the store was already empty.
    ///
    /// Returns false without touching anything if the generation moved on,
    /// meaning another caller already handled this transition.
    pub fn clear_if_generation(&self, expected: u64) -> bool {
        let mut state = self.write();
        if state.generation != expected {
            return false;
        }
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to clear persisted credentials");
        }
        state.pair = None;
        state.generation += 1;
        debug!(generation = state.generation, "Credentials cleared");
        true
    }

    /// Remove both tokens.
    ///
    /// Returns true if a pair was held. Calling this on an empty store is a
    /// no-op apart from clearing the storage medium.
    pub fn clear(&self) -> bool {
        let mut state = self.write();
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to clear persisted credentials");
        }
        let removed = state.pair.take().is_some();
        if removed {
            state.generation += 1;
            debug!(generation = state.generation, "Credentials cleared");
        }
        removed
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("CredentialStore")
            .field("has_pair", &state.pair.is_some())
            .field("generation", &state.generation)
            .finish()
    }
}
