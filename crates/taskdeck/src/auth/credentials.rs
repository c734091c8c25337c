//! Login and registration input types.

use std::fmt;

use serde::Serialize;

/// Login credentials: an email address and a password.
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use taskdeck::Credentials;
///
/// let creds = Credentials::new("a@b.com", "secret1");
/// assert_eq!(creds.email(), "a@b.com");
/// ```
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns the email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing authentication requests.
    /// Never log or display this value.
    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

// Intentionally hide password in Debug output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Account registration input.
///
/// The server decides the initial role and status of the created account;
/// `role` is only a request.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Registration {
    /// Create a registration request without a role hint.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role: None,
        }
    }

    /// Request a specific role for the new account.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_hides_password_in_debug() {
        let creds = Credentials::new("a@b.com", "secret123");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("secret123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn registration_serializes_camel_case() {
        let reg = Registration::new("a@b.com", "pw", "Ada", "Lovelace").with_role("member");
        let value = serde_json::to_value(&reg).unwrap();
        assert_eq!(value["firstName"], "Ada");
        assert_eq!(value["lastName"], "Lovelace");
        assert_eq!(value["role"], "member");
    }

    #[test]
    fn registration_omits_missing_role() {
        let reg = Registration::new("a@b.com", "pw", "Ada", "Lovelace");
        let value = serde_json::to_value(&reg).unwrap();
        assert!(value.get("role").is_none());
        assert!(!format!("{:?}", reg).contains("\"pw\""));
    }
}
