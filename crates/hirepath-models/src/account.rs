//! Account identity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::role::Role;

/// Unique identifier for an account.
///
/// Matches the subject id issued by the auth service, so a session's
/// subject can be used directly as a store lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    /// Generate a new random account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Persistent identity record, owned by the external account store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Display name: "First Last", falling back to the email address.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(first: Option<&str>, last: Option<&str>) -> Account {
        Account {
            id: AccountId::new(),
            email: "a@example.com".to_string(),
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            phone: None,
            role: Role::Candidate,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn display_name_prefers_full_name() {
        assert_eq!(account(Some("Ada"), Some("Lovelace")).display_name(), "Ada Lovelace");
        assert_eq!(account(Some("Ada"), None).display_name(), "Ada");
        assert_eq!(account(None, None).display_name(), "a@example.com");
    }

    #[test]
    fn missing_role_defaults_to_candidate() {
        let json = serde_json::json!({
            "id": "u-1",
            "email": "a@example.com",
            "created_at": "2024-01-01T00:00:00Z"
        });
        let account: Account = serde_json::from_value(json).unwrap();
        assert_eq!(account.role, Role::Candidate);
    }
}
