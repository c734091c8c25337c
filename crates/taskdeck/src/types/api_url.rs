//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated API base URL.
///
/// The base may carry a path prefix (e.g. `https://tasks.example.com/api`);
/// endpoint paths are appended to it. Both `http` and `https` are accepted,
/// since the server is often reached on a local network during development.
///
/// # Example
///
/// ```
/// use taskdeck::ApiUrl;
///
/// let api = ApiUrl::new("https://tasks.example.com/api/").unwrap();
/// assert_eq!(api.endpoint("/auth/login"), "https://tasks.example.com/api/auth/login");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not absolute, has no host, or uses a
    /// scheme other than `http` or `https`.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        let mut normalized = url;
        let trimmed = normalized.path().trim_end_matches('/').to_string();
        normalized.set_path(&trimmed);
        normalized.set_query(None);
        normalized.set_fragment(None);

        Ok(Self(normalized))
    }

    /// Returns the full URL for an endpoint path such as `/auth/login`.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if url.cannot_be_a_base() {
            return Err(invalid("must be an absolute URL"));
        }

        if url.host_str().is_none() {
            return Err(invalid("must have a host"));
        }

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("must use http or https"));
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let api = ApiUrl::new("https://tasks.example.com").unwrap();
        assert_eq!(api.host(), Some("tasks.example.com"));
    }

    #[test]
    fn valid_localhost_http() {
        let api = ApiUrl::new("http://localhost:3000/api").unwrap();
        assert_eq!(api.host(), Some("localhost"));
        assert_eq!(
            api.endpoint("/users/profile"),
            "http://localhost:3000/api/users/profile"
        );
    }

    #[test]
    fn endpoint_on_bare_host() {
        let api = ApiUrl::new("https://tasks.example.com/").unwrap();
        assert_eq!(
            api.endpoint("/auth/refresh"),
            "https://tasks.example.com/auth/refresh"
        );
        assert_eq!(
            api.endpoint("auth/refresh"),
            "https://tasks.example.com/auth/refresh"
        );
    }

    #[test]
    fn normalizes_trailing_slash_in_prefix() {
        let api = ApiUrl::new("https://tasks.example.com/api/").unwrap();
        assert_eq!(
            api.endpoint("/auth/login"),
            "https://tasks.example.com/api/auth/login"
        );
    }

    #[test]
    fn valid_http_on_local_network() {
        let api = ApiUrl::new("http://192.168.1.20:3000/api").unwrap();
        assert_eq!(api.host(), Some("192.168.1.20"));
        assert_eq!(
            api.endpoint("/projects"),
            "http://192.168.1.20:3000/api/projects"
        );
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ApiUrl::new("/api/auth/login").is_err());
    }

    #[test]
    fn invalid_scheme() {
        assert!(ApiUrl::new("file:///tmp/api").is_err());
        assert!(ApiUrl::new("ftp://tasks.example.com").is_err());
    }
}
