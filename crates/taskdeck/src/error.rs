//! Error types for the taskdeck client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, HTTP status, authentication, storage, and input validation
//! errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for taskdeck operations.
///
/// This error type covers all possible failure modes of the access layer,
/// with explicit variants to allow callers to handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, malformed response).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-2xx responses (and 2xx responses carrying `success: false`).
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Authentication errors (refresh failure, missing session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Credential persistence errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input validation errors (invalid base URL, unusable header value).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns the HTTP status code if this error came from a server response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http(err) => Some(err.status),
            Error::Auth(AuthError::RefreshFailed { status, .. }) => *status,
            _ => None,
        }
    }

    /// Check if this error is an unauthorized (401) response.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Http(err) if err.kind() == HttpErrorKind::Unauthorized)
    }

    /// A human-readable message suitable for the session `error` field.
    ///
    /// HTTP errors yield the server-provided message without the status
    /// prefix, so a form can show it directly.
    pub fn user_message(&self) -> String {
        match self {
            Error::Http(err) => err.message.clone(),
            other => other.to_string(),
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// The response body could not be decoded.
    #[error("malformed response: {message}")]
    Decode { message: String },

    /// Generic HTTP client error.
    #[error("HTTP client error: {message}")]
    Other { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else if err.is_decode() {
            TransportError::Decode {
                message: err.to_string(),
            }
        } else {
            TransportError::Other {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Transport(TransportError::Decode {
            message: err.to_string(),
        })
    }
}

/// Classification of an HTTP error status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    /// 401: drives the refresh-and-retry cycle.
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// 5xx
    ServerError,
    /// Anything else, including a 2xx envelope with `success: false`.
    Other,
}

/// An error response from the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    /// HTTP status code.
    pub status: u16,
    /// Server-provided message, or `HTTP error <status>`.
    pub message: String,
}

impl HttpError {
    /// Create a new HTTP error.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Create an HTTP error with the generic status-coded message.
    pub fn generic(status: u16) -> Self {
        Self::new(status, format!("HTTP error {}", status))
    }

    /// Classify the status code.
    pub fn kind(&self) -> HttpErrorKind {
        match self.status {
            401 => HttpErrorKind::Unauthorized,
            403 => HttpErrorKind::Forbidden,
            404 => HttpErrorKind::NotFound,
            409 => HttpErrorKind::Conflict,
            500..=599 => HttpErrorKind::ServerError,
            _ => HttpErrorKind::Other,
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message)
    }
}

impl std::error::Error for HttpError {}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credential pair is available for an operation that needs one.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The refresh endpoint rejected the refresh token or could not be reached.
    #[error("token refresh failed: {message}")]
    RefreshFailed {
        status: Option<u16>,
        message: String,
    },
}

/// Credential persistence errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the storage medium failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The persisted data could not be parsed.
    #[error("corrupt credential data: {message}")]
    Corrupt { message: String },

    /// The storage medium is not available at all.
    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// A token contains characters that cannot appear in a header.
    #[error("token cannot be used in an Authorization header")]
    TokenHeader,

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_statuses() {
        assert_eq!(HttpError::generic(401).kind(), HttpErrorKind::Unauthorized);
        assert_eq!(HttpError::generic(403).kind(), HttpErrorKind::Forbidden);
        assert_eq!(HttpError::generic(404).kind(), HttpErrorKind::NotFound);
        assert_eq!(HttpError::generic(409).kind(), HttpErrorKind::Conflict);
        assert_eq!(HttpError::generic(503).kind(), HttpErrorKind::ServerError);
        assert_eq!(HttpError::generic(400).kind(), HttpErrorKind::Other);
    }

    #[test]
    fn generic_message_includes_status() {
        let err = HttpError::generic(502);
        assert_eq!(err.message, "HTTP error 502");
        assert_eq!(err.to_string(), "HTTP 502: HTTP error 502");
    }

    #[test]
    fn user_message_strips_status_prefix() {
        let err = Error::from(HttpError::new(409, "Email already registered"));
        assert_eq!(err.user_message(), "Email already registered");
        assert_eq!(err.status(), Some(409));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn unauthorized_detection() {
        let err = Error::from(HttpError::generic(401));
        assert!(err.is_unauthorized());
        let err = Error::from(AuthError::NotAuthenticated);
        assert!(!err.is_unauthorized());
    }
}
