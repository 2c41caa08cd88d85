//! Authorization roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Authorization tier of an account.
///
/// New accounts default to `Candidate`; `Admin` is assigned out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Job seeker: browses postings, submits applications.
    #[default]
    Candidate,
    /// Administrator: posts and manages jobs, reviews applications.
    Admin,
}

impl Role {
    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Admin => "admin",
        }
    }

    /// Landing path for this role after sign-in.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Candidate => "/dashboard",
            Role::Admin => "/admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candidate" => Ok(Role::Candidate),
            "admin" => Ok(Role::Admin),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Candidate, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn home_paths() {
        assert_eq!(Role::Admin.home_path(), "/admin");
        assert_eq!(Role::Candidate.home_path(), "/dashboard");
    }
}
