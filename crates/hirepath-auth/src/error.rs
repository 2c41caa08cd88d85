//! Auth error types.

use thiserror::Error;

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur during session verification or token issuance.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Unknown signing key: {0}")]
    UnknownKey(String),

    #[error("Key discovery failed: {0}")]
    KeyDiscovery(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Sign-up rejected: {0}")]
    SignupRejected(String),

    #[error("Auth service error ({0}): {1}")]
    ServiceError(u16, String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl AuthError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::InvalidToken(msg.into())
    }
}
