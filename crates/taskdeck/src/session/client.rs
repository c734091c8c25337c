//! Refresh-and-retry wrapper around the transport.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::auth::{RefreshToken, TokenPair};
use crate::config::ClientConfig;
use crate::error::{AuthError, Error, HttpError, HttpErrorKind};
use crate::http::endpoints::{REFRESH, RefreshRequest, RefreshResponse};
use crate::http::{ApiRequest, HttpTransport, MultipartPayload};
use crate::store::CredentialStore;

/// Notified when the client gives up on the current credentials.
///
/// Called after the credential store has been cleared, at most once per
/// logout transition no matter how many requests failed concurrently.
pub trait SessionObserver: Send + Sync {
    fn session_expired(&self);
}

/// Where an outgoing request is in its lifecycle.
///
/// ```text
/// Issue -(2xx/other)-> done
/// Issue -(401)-> Refresh -(ok)-> Retry -(any)-> done
///                        -(fail)-> LoggedOut -> done with the original 401
/// ```
#[derive(Debug)]
enum RequestPhase {
    Issue,
    Refresh { unauthorized: HttpError, observed: u64 },
    Retry,
    LoggedOut { unauthorized: HttpError },
}

/// API client that survives access-token expiry.
///
/// A request that comes back 401 triggers one token refresh and one retry.
/// Concurrent requests that hit the same expired token share a single
/// refresh call.
///
/// Cheap to clone; clones share credentials and the refresh lock.
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<SessionClientInner>,
}

struct SessionClientInner {
    transport: HttpTransport,
    credentials: Arc<CredentialStore>,
    refresh_lock: Mutex<()>,
    observer: RwLock<Option<Arc<dyn SessionObserver>>>,
}

impl SessionClient {
    /// Create a client over a fresh transport.
    pub fn new(config: &ClientConfig, credentials: Arc<CredentialStore>) -> Result<Self, Error> {
        let transport = HttpTransport::new(config, credentials.clone())?;
        Ok(Self::from_transport(transport, credentials))
    }

    /// Wrap an existing transport. `credentials` must be the store the
    /// transport reads from.
    pub fn from_transport(transport: HttpTransport, credentials: Arc<CredentialStore>) -> Self {
        Self {
            inner: Arc::new(SessionClientInner {
                transport,
                credentials,
                refresh_lock: Mutex::new(()),
                observer: RwLock::new(None),
            }),
        }
    }

    /// Install the observer told about forced logouts, replacing any other.
    pub fn set_observer(&self, observer: Arc<dyn SessionObserver>) {
        *self
            .inner
            .observer
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(observer);
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.inner.credentials
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.inner.transport
    }

    /// Execute a request, refreshing and retrying once on a 401.
    ///
    /// Only requests that carry the bearer token take part in refresh; a 401
    /// on an unauthenticated call (such as a wrong password at login) is
    /// returned as is.
    ///
    /// # Errors
    ///
    /// Returns the transport or HTTP error of the final attempt. If the
    /// refresh fails, the original 401 is returned and the session is logged
    /// out.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute(&self, request: &ApiRequest) -> Result<Value, Error> {
        let mut phase = RequestPhase::Issue;

        loop {
            phase = match phase {
                RequestPhase::Issue => {
                    let snapshot = self.inner.credentials.snapshot();
                    let result = self
                        .inner
                        .transport
                        .send_with_token(request, snapshot.pair.as_ref().map(|p| &p.access))
                        .await;

                    match result {
                        Err(Error::Http(err))
                            if request.include_auth
                                && err.kind() == HttpErrorKind::Unauthorized =>
                        {
                            debug!("Unauthorized, attempting token refresh");
                            RequestPhase::Refresh {
                                unauthorized: err,
                                observed: snapshot.generation,
                            }
                        }
                        other => return other,
                    }
                }
                RequestPhase::Refresh {
                    unauthorized,
                    observed,
                } => match self.refresh_since(observed).await {
                    Ok(()) => RequestPhase::Retry,
                    Err(e) => {
                        debug!(error = %e, "Refresh unavailable, giving up on request");
                        RequestPhase::LoggedOut { unauthorized }
                    }
                },
                RequestPhase::Retry => {
                    let token = self.inner.credentials.get().map(|pair| pair.access);
                    return self
                        .inner
                        .transport
                        .send_with_token(request, token.as_ref())
                        .await;
                }
                RequestPhase::LoggedOut { unauthorized } => {
                    return Err(Error::Http(unauthorized));
                }
            };
        }
    }

    /// Execute a request and decode the unwrapped `data` as `T`.
    pub async fn execute_as<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, Error> {
        let data = self.execute(request).await?;
        Ok(serde_json::from_value(data)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.execute_as(&ApiRequest::get(path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute_as(&ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute_as(&ApiRequest::put(path).json(body)?).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.execute_as(&ApiRequest::delete(path)).await
    }

    /// Upload a multipart payload with POST.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: MultipartPayload,
    ) -> Result<T, Error> {
        self.execute_as(&ApiRequest::post(path).multipart(payload))
            .await
    }

    /// Exchange the current refresh token for a new pair now.
    ///
    /// Shares the in-flight refresh if one is already running.
    pub async fn refresh(&self) -> Result<(), Error> {
        let observed = self.inner.credentials.generation();
        self.refresh_since(observed).await
    }

    /// Refresh the credentials unless they changed after generation
    /// `observed`.
    ///
    /// Refreshes are serialized. A caller that waited on another refresh
    /// finds the generation moved on and reuses its outcome: the new pair
    /// if it succeeded, or a logged-out store if it failed. A refresh that
    /// completes after a logout or a new login is discarded.
    async fn refresh_since(&self, observed: u64) -> Result<(), Error> {
        let _guard = self.inner.refresh_lock.lock().await;

        let snapshot = self.inner.credentials.snapshot();
        if snapshot.generation != observed {
            debug!("Credentials changed by another request");
            return self.current_outcome();
        }

        let Some(pair) = snapshot.pair else {
            self.force_logout(snapshot.generation);
            return Err(AuthError::NotAuthenticated.into());
        };

        match self.request_new_tokens(&pair.refresh).await {
            Ok(new_pair) => {
                if self
                    .inner
                    .credentials
                    .set_if_generation(snapshot.generation, new_pair)
                {
                    info!("Access token refreshed");
                    Ok(())
                } else {
                    info!("Session changed during refresh, discarding refreshed tokens");
                    self.current_outcome()
                }
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, logging out");
                self.force_logout(snapshot.generation);
                Err(AuthError::RefreshFailed {
                    status: e.status(),
                    message: e.user_message(),
                }
                .into())
            }
        }
    }

    /// Whether a retry can go ahead with whatever pair the store now holds.
    fn current_outcome(&self) -> Result<(), Error> {
        if self.inner.credentials.has() {
            Ok(())
        } else {
            Err(AuthError::NotAuthenticated.into())
        }
    }

    #[instrument(skip(self, refresh_token))]
    async fn request_new_tokens(&self, refresh_token: &RefreshToken) -> Result<TokenPair, Error> {
        let request = ApiRequest::post(REFRESH)
            .json(&RefreshRequest {
                refresh_token: refresh_token.as_str(),
            })?
            .without_auth();

        let data = self.inner.transport.send_with_token(&request, None).await?;
        let response: RefreshResponse = serde_json::from_value(data)?;
        Ok(TokenPair::new(response.access_token, response.refresh_token))
    }

    /// Clear credentials and tell the observer, once per logout transition.
    ///
    /// `generation` is the one this request saw. If the store has moved on,
    /// someone else already logged out (or logged back in) and nothing
    /// happens.
    fn force_logout(&self, generation: u64) {
        if !self.inner.credentials.clear_if_generation(generation) {
            debug!("Session already changed, skipping forced logout");
            return;
        }

        let observer = self
            .inner
            .observer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(observer) = observer {
            observer.session_expired();
        }
    }
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("transport", &self.inner.transport)
            .field("credentials", &self.inner.credentials)
            .finish()
    }
}
