//! Observable session state.

use tracing::info;

use crate::types::UserProfile;

/// Who is logged in, and what the last auth operation did.
///
/// `is_authenticated` is true only while `user` is set and the credential
/// store holds a pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<UserProfile>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    /// The signed-in state for `user`, with no operation in flight.
    pub fn authenticated(user: UserProfile) -> Self {
        Self {
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
            error: None,
        }
    }

    /// The signed-out state carrying an error message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Routing hook for sending the user back to the login entry point.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// A [`Navigator`] with no UI behind it: it only logs the redirect.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect_to_login(&self) {
        info!("Session ended, login required");
    }
}
