//! taskdeck - authenticated API access for the taskdeck project/task service.
//!
//! This library is the client-side core the rest of an application talks
//! to. It attaches bearer tokens, refreshes them when the server answers
//! 401, retries the original request once, persists the credential pair
//! across restarts, and publishes an observable session state.
//!
//! The layers, leaf first:
//!
//! - [`CredentialStore`] holds the token pair over a [`TokenStorage`] medium.
//! - [`HttpTransport`] performs single requests.
//! - [`SessionClient`] adds the refresh-and-retry policy.
//! - [`AuthSession`] exposes login/register/logout and the [`SessionState`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskdeck::{ApiUrl, AuthSession, ClientConfig, Credentials, FileStorage};
//!
//! # async fn example() -> Result<(), taskdeck::Error> {
//! let config = ClientConfig::new(ApiUrl::new("https://tasks.example.com/api")?);
//! let storage = Arc::new(FileStorage::new("/tmp/taskdeck/credentials.json"));
//! let auth = AuthSession::new(&config, storage)?;
//!
//! if auth.initialize_auth().await?.is_none() {
//!     auth.login(Credentials::new("a@b.com", "secret1")).await?;
//! }
//!
//! let mut changes = auth.subscribe();
//! tokio::spawn(async move {
//!     while changes.changed().await.is_ok() {
//!         let state = changes.borrow().clone();
//!         println!("authenticated: {}", state.is_authenticated);
//!     }
//! });
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod store;
pub mod types;

// Re-export primary types at crate root for convenience
pub use auth::{
    AccessToken, AuthSession, Credentials, LogNavigator, Navigator, RefreshToken, Registration,
    SessionState, TokenPair,
};
pub use config::ClientConfig;
pub use error::{Error, HttpError, HttpErrorKind};
pub use http::{ApiRequest, HttpTransport, MultipartPayload};
pub use session::{SessionClient, SessionObserver};
pub use store::{CredentialStore, FileStorage, MemoryStorage, TokenStorage};
pub use types::{ApiUrl, UserProfile};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
