//! Auth service HTTP client.
//!
//! Thin proxy for the credential endpoints the auth-entry pages submit
//! to; token verification lives in `verifier`.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AuthError, AuthResult};

/// Configuration for the auth client.
#[derive(Debug, Clone)]
pub struct AuthClientConfig {
    /// Base URL of the auth service
    pub base_url: String,
    /// Public API key sent with credential requests
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
}

impl AuthClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> AuthResult<Self> {
        let base_url = std::env::var("AUTH_URL")
            .map_err(|_| AuthError::config("AUTH_URL must be set"))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: std::env::var("AUTH_API_KEY").unwrap_or_default(),
            timeout: Duration::from_secs(
                std::env::var("AUTH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        })
    }
}

/// Token pair issued by the auth service.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct CredentialRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

/// Client for the external auth service.
pub struct AuthClient {
    http: Client,
    config: AuthClientConfig,
}

impl AuthClient {
    /// Create a new auth client.
    pub fn new(config: AuthClientConfig) -> AuthResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AuthError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> AuthResult<Self> {
        Self::new(AuthClientConfig::from_env()?)
    }

    /// Exchange email/password credentials for a token.
    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<TokenResponse> {
        let url = format!("{}/token?grant_type=password", self.config.base_url);

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.config.api_key)
            .json(&CredentialRequest { email, password })
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                debug!("Issued session token for {}", email);
                Ok(response.json().await?)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AuthError::InvalidCredentials)
            }
            s => {
                let body = response.text().await.unwrap_or_default();
                warn!("Auth service sign-in failed ({}): {}", s, body);
                Err(AuthError::ServiceError(s.as_u16(), body))
            }
        }
    }

    /// Register a new account with the auth service.
    ///
    /// Profile fields ride along as signup metadata; the account row in
    /// the store is created separately by the API layer.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Option<serde_json::Value>,
    ) -> AuthResult<TokenResponse> {
        let url = format!("{}/signup", self.config.base_url);

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.config.api_key)
            .json(&SignUpRequest {
                email,
                password,
                data: metadata,
            })
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::OK | StatusCode::CREATED => Ok(response.json().await?),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let body = response.text().await.unwrap_or_default();
                Err(AuthError::SignupRejected(body))
            }
            StatusCode::CONFLICT => {
                Err(AuthError::SignupRejected("email already registered".to_string()))
            }
            s => {
                let body = response.text().await.unwrap_or_default();
                warn!("Auth service sign-up failed ({}): {}", s, body);
                Err(AuthError::ServiceError(s.as_u16(), body))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> AuthClient {
        AuthClient::new(AuthClientConfig {
            base_url: base_url.to_string(),
            api_key: "anon-key".to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn sign_in_returns_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", "anon-key"))
            .and(body_partial_json(serde_json::json!({"email": "a@example.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "jwt",
                "token_type": "bearer",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let token = test_client(&server.uri())
            .sign_in("a@example.com", "hunter2")
            .await
            .unwrap();
        assert_eq!(token.access_token, "jwt");
        assert_eq!(token.expires_in, 3600);
    }

    #[tokio::test]
    async fn bad_credentials_map_to_invalid_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant"
            })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .sign_in("a@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}
