//! HTTP transport: one request in, one parsed result or typed error out.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, instrument, trace};

use crate::auth::AccessToken;
use crate::config::ClientConfig;
use crate::error::{Error, HttpError, InvalidInputError};
use crate::store::CredentialStore;
use crate::types::ApiUrl;

use super::endpoints::{Envelope, ErrorBody};
use super::request::{ApiRequest, RequestBody};

/// Issues API calls with the right headers.
///
/// The transport knows nothing about retry or refresh policy: a 401 comes
/// back as an [`HttpError`] like any other status.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: ApiUrl,
    credentials: Arc<CredentialStore>,
}

impl HttpTransport {
    /// Create a transport for the configured API.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig, credentials: Arc<CredentialStore>) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base: config.base_url.clone(),
            credentials,
        })
    }

    /// Returns the API base URL this transport is configured for.
    pub fn base_url(&self) -> &ApiUrl {
        &self.base
    }

    /// Send a request using whatever access token the credential store
    /// currently holds.
    pub async fn send(&self, request: &ApiRequest) -> Result<Value, Error> {
        let token = self.credentials.get().map(|pair| pair.access);
        self.send_with_token(request, token.as_ref()).await
    }

    /// Send a request with an explicit access token.
    ///
    /// The token is only attached when `request.include_auth` is set.
    #[instrument(skip(self, request, token), fields(method = %request.method, path = %request.path))]
    pub(crate) async fn send_with_token(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<Value, Error> {
        let url = self.base.endpoint(&request.path);
        debug!(auth = request.include_auth && token.is_some(), "API request");

        let mut builder = self.client.request(request.method.clone(), &url);

        if request.include_auth {
            if let Some(token) = token {
                builder = builder.headers(auth_headers(token)?);
            }
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            // reqwest sets the multipart content type with its boundary
            RequestBody::Multipart(payload) => builder.multipart(payload.to_form()?),
        };

        let response = builder.send().await?;
        self.handle_response(response).await
    }

    /// Handle a response, unwrapping the success envelope or parsing the error.
    async fn handle_response(&self, response: reqwest::Response) -> Result<Value, Error> {
        let status = response.status();
        trace!(status = %status, "API response");

        if !status.is_success() {
            return Err(Error::Http(parse_error_response(response).await));
        }

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        let envelope: Envelope = serde_json::from_slice(&body)?;
        if !envelope.success {
            let message = envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));
            debug!(status = %status, "Server reported failure in a success response");
            return Err(Error::Http(HttpError::new(status.as_u16(), message)));
        }

        Ok(envelope.data)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base", &self.base)
            .finish()
    }
}

/// Create the authorization header for authenticated requests.
fn auth_headers(token: &AccessToken) -> Result<HeaderMap, Error> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
        .map_err(|_| InvalidInputError::TokenHeader)?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// Parse an error response into a status and message.
async fn parse_error_response(response: reqwest::Response) -> HttpError {
    let status = response.status().as_u16();

    match response.json::<ErrorBody>().await {
        Ok(body) => match body.into_message() {
            Some(message) => HttpError::new(status, message),
            None => HttpError::generic(status),
        },
        Err(_) => HttpError::generic(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_creation() {
        let api = ApiUrl::new("https://tasks.example.com/api").unwrap();
        let transport = HttpTransport::new(
            &ClientConfig::new(api.clone()),
            Arc::new(CredentialStore::in_memory()),
        )
        .unwrap();
        assert_eq!(transport.base_url(), &api);
    }

    #[test]
    fn auth_header_is_bearer_and_sensitive() {
        let headers = auth_headers(&AccessToken::new("T1")).unwrap();
        let value = headers.get(AUTHORIZATION).unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer T1");
        assert!(value.is_sensitive());
    }

    #[test]
    fn auth_header_rejects_control_characters() {
        assert!(auth_headers(&AccessToken::new("bad\ntoken")).is_err());
    }
}
