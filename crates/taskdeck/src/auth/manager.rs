//! Auth session manager: the entry point the rest of the application uses.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::Error;
use crate::http::ApiRequest;
use crate::http::endpoints::{AuthResponse, LOGIN, LOGOUT, LoginRequest, PROFILE, REGISTER};
use crate::session::{SessionClient, SessionObserver};
use crate::store::{CredentialStore, TokenStorage};
use crate::types::UserProfile;

use super::credentials::{Credentials, Registration};
use super::state::{LogNavigator, Navigator, SessionState};
use super::tokens::TokenPair;

/// Owns the observable [`SessionState`] and the operations that change it.
///
/// Every operation sets `is_loading` for its duration and clears it on every
/// exit path, including when the future is dropped before completion.
/// Failures are recorded in `error` and also returned to the caller.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdeck::{ApiUrl, AuthSession, ClientConfig, Credentials, MemoryStorage};
///
/// # async fn example() -> Result<(), taskdeck::Error> {
/// let config = ClientConfig::new(ApiUrl::new("http://localhost:3000/api")?);
/// let auth = AuthSession::new(&config, Arc::new(MemoryStorage::new()))?;
///
/// auth.initialize_auth().await?;
/// if !auth.state().is_authenticated {
///     auth.login(Credentials::new("a@b.com", "secret1")).await?;
/// }
///
/// let projects: serde_json::Value = auth.client().get("/projects").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<AuthInner>,
}

struct AuthInner {
    client: SessionClient,
    state: Arc<watch::Sender<SessionState>>,
}

/// Resets the session when the client gives up on the credentials.
struct ExpiryHandler {
    state: Arc<watch::Sender<SessionState>>,
    navigator: Arc<dyn Navigator>,
}

impl SessionObserver for ExpiryHandler {
    fn session_expired(&self) {
        info!("Session expired");
        self.state.send_modify(|s| {
            *s = SessionState {
                is_loading: s.is_loading,
                ..SessionState::default()
            };
        });
        self.navigator.redirect_to_login();
    }
}

/// Clears `is_loading` when dropped unless the operation already settled it.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<SessionState>,
}

impl<'a> LoadingGuard<'a> {
    fn begin(state: &'a watch::Sender<SessionState>) -> Self {
        state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|s| std::mem::replace(&mut s.is_loading, false));
    }
}

impl AuthSession {
    /// Build the whole stack over `storage`, redirecting via [`LogNavigator`].
    ///
    /// The store is not read until [`initialize_auth`](Self::initialize_auth).
    pub fn new(config: &ClientConfig, storage: Arc<dyn TokenStorage>) -> Result<Self, Error> {
        let credentials = Arc::new(CredentialStore::new(storage));
        let client = SessionClient::new(config, credentials)?;
        Ok(Self::from_client(client, Arc::new(LogNavigator)))
    }

    /// Wrap an existing client. Installs this session as the client's
    /// expiry observer.
    pub fn from_client(client: SessionClient, navigator: Arc<dyn Navigator>) -> Self {
        let state = Arc::new(watch::Sender::new(SessionState::default()));
        client.set_observer(Arc::new(ExpiryHandler {
            state: state.clone(),
            navigator,
        }));

        Self {
            inner: Arc::new(AuthInner { client, state }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Watch the state for changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// The client, for calling resource endpoints under this session.
    pub fn client(&self) -> &SessionClient {
        &self.inner.client
    }

    fn credentials(&self) -> &CredentialStore {
        self.inner.client.credentials()
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the server's rejection or a transport failure; the same
    /// message is stored in the session `error`.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: Credentials) -> Result<UserProfile, Error> {
        info!("Logging in");
        let _loading = LoadingGuard::begin(&self.inner.state);

        let request = ApiRequest::post(LOGIN)
            .json(&LoginRequest {
                email: credentials.email(),
                password: credentials.password(),
            })
            .map(ApiRequest::without_auth);

        let result = match request {
            Ok(request) => self.inner.client.execute_as::<AuthResponse>(&request).await,
            Err(e) => Err(e),
        };
        self.settle_authentication(result)
    }

    /// Create an account and sign into it.
    ///
    /// The server decides the initial role and status of the account.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> Result<UserProfile, Error> {
        info!("Registering account");
        let _loading = LoadingGuard::begin(&self.inner.state);

        let result = match ApiRequest::post(REGISTER).json(&registration) {
            Ok(request) => {
                self.inner
                    .client
                    .execute_as::<AuthResponse>(&request.without_auth())
                    .await
            }
            Err(e) => Err(e),
        };
        self.settle_authentication(result)
    }

    fn settle_authentication(
        &self,
        result: Result<AuthResponse, Error>,
    ) -> Result<UserProfile, Error> {
        match result {
            Ok(response) => {
                self.credentials().set(TokenPair::new(
                    response.access_token,
                    response.refresh_token,
                ));
                let user = response.user;
                self.inner
                    .state
                    .send_replace(SessionState::authenticated(user.clone()));
                debug!("Authenticated");
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "Authentication failed");
                self.inner.state.send_modify(|s| {
                    s.user = None;
                    s.is_authenticated = false;
                    s.is_loading = false;
                    s.error = Some(e.user_message());
                });
                Err(e)
            }
        }
    }

    /// Log out. Never fails.
    ///
    /// The server is told on a best-effort basis, without a refresh attempt;
    /// whatever it answers, local credentials are cleared and the state is
    /// reset. Logging out twice is the same as logging out once.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        info!("Logging out");
        let _loading = LoadingGuard::begin(&self.inner.state);

        if self.credentials().has() {
            if let Err(e) = self
                .inner
                .client
                .transport()
                .send(&ApiRequest::post(LOGOUT))
                .await
            {
                debug!(error = %e, "Server logout failed, ignoring");
            }
        }

        self.credentials().clear();
        self.inner.state.send_replace(SessionState::default());
    }

    /// Re-fetch the profile of the signed-in user.
    ///
    /// Returns `Ok(None)` without any request when nobody is signed in. Any
    /// failure, including an unreachable server, resets the session as
    /// [`logout`](Self::logout) does and records the error.
    #[instrument(skip(self))]
    pub async fn refresh_user(&self) -> Result<Option<UserProfile>, Error> {
        if !self.inner.state.borrow().is_authenticated {
            return Ok(None);
        }

        let _loading = LoadingGuard::begin(&self.inner.state);
        self.fetch_profile(false).await.map(Some)
    }

    /// Restore the session persisted by a previous run.
    ///
    /// Call once at startup. If a credential pair is found, the profile is
    /// fetched to complete the session; otherwise the state stays signed
    /// out and `Ok(None)` is returned.
    ///
    /// Unlike [`refresh_user`](Self::refresh_user), an unreachable server
    /// does not discard the restored pair: the state stays signed out with
    /// the error recorded, and a later call can still use the tokens. A
    /// rejection from the server clears them.
    #[instrument(skip(self))]
    pub async fn initialize_auth(&self) -> Result<Option<UserProfile>, Error> {
        let _loading = LoadingGuard::begin(&self.inner.state);

        if self.credentials().rehydrate().is_none() {
            debug!("No persisted session");
            self.inner.state.send_replace(SessionState::default());
            return Ok(None);
        }

        info!("Restoring persisted session");
        self.fetch_profile(true).await.map(Some)
    }

    async fn fetch_profile(&self, keep_offline: bool) -> Result<UserProfile, Error> {
        match self.inner.client.get::<UserProfile>(PROFILE).await {
            Ok(user) if self.credentials().has() => {
                self.inner
                    .state
                    .send_replace(SessionState::authenticated(user.clone()));
                Ok(user)
            }
            Ok(_) => {
                // Credentials were dropped while the request was in flight.
                self.inner.state.send_replace(SessionState::default());
                Err(crate::error::AuthError::NotAuthenticated.into())
            }
            Err(e @ Error::Transport(_)) if keep_offline => {
                warn!(error = %e, "Server unreachable, keeping restored credentials");
                let message = e.user_message();
                self.inner.state.send_modify(|s| {
                    s.user = None;
                    s.is_authenticated = false;
                    s.is_loading = false;
                    s.error = Some(message);
                });
                Err(e)
            }
            Err(e) => {
                warn!(error = %e, "Profile fetch failed, resetting session");
                self.credentials().clear();
                self.inner
                    .state
                    .send_replace(SessionState::failed(e.user_message()));
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("state", &*self.inner.state.borrow())
            .field("client", &self.inner.client)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;
    use crate::types::ApiUrl;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingNavigator(AtomicUsize);

    impl Navigator for CountingNavigator {
        fn redirect_to_login(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn session(navigator: Arc<CountingNavigator>) -> AuthSession {
        let config = ClientConfig::new(ApiUrl::new("http://127.0.0.1:9").unwrap());
        let credentials = Arc::new(CredentialStore::new(Arc::new(MemoryStorage::new())));
        let client = SessionClient::new(&config, credentials).unwrap();
        AuthSession::from_client(client, navigator)
    }

    #[test]
    fn starts_signed_out() {
        let auth = session(Arc::default());
        assert_eq!(auth.state(), SessionState::default());
    }

    #[test]
    fn loading_guard_clears_on_drop() {
        let auth = session(Arc::default());
        {
            let _guard = LoadingGuard::begin(&auth.inner.state);
            assert!(auth.state().is_loading);
        }
        assert!(!auth.state().is_loading);
    }

    #[test]
    fn loading_guard_clears_error_on_begin() {
        let auth = session(Arc::default());
        auth.inner.state.send_replace(SessionState::failed("old"));
        let guard = LoadingGuard::begin(&auth.inner.state);
        assert!(auth.state().error.is_none());
        drop(guard);
    }

    #[test]
    fn expiry_resets_state_and_redirects() {
        let navigator = Arc::new(CountingNavigator::default());
        let auth = session(navigator.clone());

        let user: UserProfile =
            serde_json::from_value(serde_json::json!({"id": 1, "email": "a@b.com"})).unwrap();
        auth.inner
            .state
            .send_replace(SessionState::authenticated(user));

        let handler = ExpiryHandler {
            state: auth.inner.state.clone(),
            navigator: navigator.clone(),
        };
        handler.session_expired();

        let state = auth.state();
        assert!(!state.is_authenticated);
        assert!(state.user.is_none());
        assert_eq!(navigator.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refresh_user_is_noop_when_signed_out() {
        let auth = session(Arc::default());
        assert!(auth.refresh_user().await.unwrap().is_none());
        assert!(!auth.state().is_loading);
    }

    #[tokio::test]
    async fn logout_when_signed_out_makes_no_request() {
        let auth = session(Arc::default());
        auth.logout().await;
        auth.logout().await;
        assert_eq!(auth.state(), SessionState::default());
    }
}
