//! Token types for bearer authentication.

use std::fmt;

/// An access token for authenticated API requests.
///
/// Access tokens are short-lived credentials sent with every authenticated
/// request as `Authorization: Bearer <token>`.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    ///
    /// # Security
    ///
    /// Use only when constructing HTTP authorization headers or persisting
    /// the token. Never log this value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A refresh token for obtaining new access tokens.
///
/// Refresh tokens are longer-lived and exchanged at the refresh endpoint for
/// a new token pair. The server may invalidate a refresh token on use.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Create a new refresh token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in refresh requests.
    ///
    /// # Security
    ///
    /// Use only when constructing token refresh requests or persisting the
    /// token. Never log this value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}

/// An access token together with its matching refresh token.
///
/// The pair is the unit the credential store holds: there is no way to
/// store one token without the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: AccessToken,
    pub refresh: RefreshToken,
}

impl TokenPair {
    /// Create a pair from raw token strings.
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: AccessToken::new(access),
            refresh: RefreshToken::new(refresh),
        }
    }

    /// Build a pair from two optional halves.
    ///
    /// Returns `None` unless both halves are present and non-empty.
    pub fn from_parts(access: Option<String>, refresh: Option<String>) -> Option<Self> {
        match (access, refresh) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Some(Self::new(access, refresh))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_hides_value_in_debug() {
        let token = AccessToken::new("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("eyJ"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn refresh_token_hides_value_in_debug() {
        let token = RefreshToken::new("refresh_token_value_here");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("refresh_token_value"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn pair_debug_hides_both_tokens() {
        let pair = TokenPair::new("T1-secret", "R1-secret");
        let debug = format!("{:?}", pair);
        assert!(!debug.contains("T1-secret"));
        assert!(!debug.contains("R1-secret"));
    }

    #[test]
    fn pair_requires_both_halves() {
        assert!(TokenPair::from_parts(Some("a".into()), Some("r".into())).is_some());
        assert!(TokenPair::from_parts(Some("a".into()), None).is_none());
        assert!(TokenPair::from_parts(None, Some("r".into())).is_none());
        assert!(TokenPair::from_parts(Some(String::new()), Some("r".into())).is_none());
        assert!(TokenPair::from_parts(None, None).is_none());
    }
}
