//! Authenticated session model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::AccountId;

/// Ephemeral proof of authentication for one request.
///
/// Produced by verifying the auth service's token; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Subject id, equal to the account id in the store.
    pub subject: AccountId,
    /// Email claim, when the token carries one.
    #[serde(default)]
    pub email: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expiry_window() {
        let session = Session {
            subject: AccountId::from("u-1"),
            email: None,
            issued_at: Utc::now() - Duration::minutes(10),
            expires_at: Utc::now() + Duration::minutes(50),
        };
        assert!(!session.is_expired());

        let stale = Session {
            expires_at: Utc::now() - Duration::seconds(1),
            ..session
        };
        assert!(stale.is_expired());
    }
}
