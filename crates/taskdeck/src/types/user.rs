//! User profile as returned by the server.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The profile of an account.
///
/// The core treats this as an opaque value: it is stored exactly as the
/// server returned it. Fields beyond the well-known ones are kept in
/// `extra` so nothing is lost on a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Value,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// "First Last", falling back to the email address.
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => self.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_unknown_fields() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": 1,
            "email": "a@b.com",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "role": "admin",
            "status": "active",
            "avatarUrl": "https://cdn.example.com/a.png"
        }))
        .unwrap();

        assert_eq!(profile.id, json!(1));
        assert_eq!(profile.display_name(), "Ada Lovelace");
        assert_eq!(profile.extra["avatarUrl"], "https://cdn.example.com/a.png");

        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["avatarUrl"], "https://cdn.example.com/a.png");
        assert_eq!(back["firstName"], "Ada");
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let profile: UserProfile =
            serde_json::from_value(json!({"id": "u-7", "email": "x@y.org"})).unwrap();
        assert_eq!(profile.display_name(), "x@y.org");
    }
}
