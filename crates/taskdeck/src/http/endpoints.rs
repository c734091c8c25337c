//! Endpoint paths and request/response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::UserProfile;

// ============================================================================
// Endpoint Paths
// ============================================================================

pub const LOGIN: &str = "/auth/login";

pub const REGISTER: &str = "/auth/register";

pub const REFRESH: &str = "/auth/refresh";

pub const LOGOUT: &str = "/auth/logout";

pub const PROFILE: &str = "/users/profile";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Success wrapper around every response body.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[allow(dead_code)]
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Error body. `message` is either a string or a list of validation
/// messages.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// The most specific human-readable message available.
    pub fn into_message(self) -> Option<String> {
        let from_message = match self.message {
            Value::String(s) => Some(s),
            Value::Array(items) => {
                let parts: Vec<String> = items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect();
                (!parts.is_empty()).then(|| parts.join(", "))
            }
            _ => None,
        };

        from_message
            .or(self.error)
            .filter(|message| !message.trim().is_empty())
    }
}

/// Request body for login.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from login and register.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserProfile,
}

/// Request body for refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response from refresh.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}
