//! Authentication types and session management.
//!
//! [`AuthSession`] is the component callers use: it exposes login,
//! registration, logout, and profile refresh, and publishes the resulting
//! [`SessionState`].

mod credentials;
mod manager;
mod state;
mod tokens;

pub use credentials::{Credentials, Registration};
pub use manager::AuthSession;
pub use state::{LogNavigator, Navigator, SessionState};
pub use tokens::{AccessToken, RefreshToken, TokenPair};
