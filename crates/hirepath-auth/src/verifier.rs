//! Session token verification.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use hirepath_models::{AccountId, Session};

use crate::error::{AuthError, AuthResult};

/// JWKS cache TTL.
const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600); // 1 hour

/// Verifier configuration.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Base URL of the auth service; also the expected token issuer.
    pub auth_url: String,
    /// Expected audience claim.
    pub audience: String,
    /// Timeout for JWKS fetches.
    pub http_timeout: Duration,
}

impl VerifierConfig {
    /// Create config from environment variables.
    pub fn from_env() -> AuthResult<Self> {
        let auth_url = std::env::var("AUTH_URL")
            .map_err(|_| AuthError::config("AUTH_URL must be set to verify sessions"))?;

        if auth_url.is_empty() {
            return Err(AuthError::config("AUTH_URL cannot be empty"));
        }

        Ok(Self {
            auth_url: auth_url.trim_end_matches('/').to_string(),
            audience: std::env::var("AUTH_AUDIENCE")
                .unwrap_or_else(|_| "authenticated".to_string()),
            http_timeout: Duration::from_secs(10),
        })
    }
}

/// Decoded session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (account id)
    pub sub: String,
    /// Email (if available)
    pub email: Option<String>,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
}

impl From<SessionClaims> for Session {
    fn from(claims: SessionClaims) -> Self {
        Session {
            subject: AccountId::from(claims.sub),
            email: claims.email,
            issued_at: timestamp(claims.iat),
            expires_at: timestamp(claims.exp),
        }
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
}

/// JWKS response from the auth service.
#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<JwkKey>,
}

#[derive(Debug, Clone, Deserialize)]
struct JwkKey {
    kid: String,
    n: String,
    e: String,
}

/// Session token verifier with a cached JWKS key set.
pub struct JwtVerifier {
    http: Client,
    keys: RwLock<HashMap<String, DecodingKey>>,
    last_refresh: RwLock<Instant>,
    config: VerifierConfig,
}

impl JwtVerifier {
    /// Create a new verifier and fetch the initial key set.
    pub async fn new(config: VerifierConfig) -> AuthResult<Self> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(AuthError::Network)?;

        let verifier = Self {
            http,
            keys: RwLock::new(HashMap::new()),
            last_refresh: RwLock::new(Instant::now()),
            config,
        };

        // Initial key refresh
        verifier.refresh_keys().await?;

        Ok(verifier)
    }

    /// Create from environment variables.
    pub async fn from_env() -> AuthResult<Self> {
        Self::new(VerifierConfig::from_env()?).await
    }

    fn jwks_url(&self) -> String {
        format!("{}/.well-known/jwks.json", self.config.auth_url)
    }

    /// Refresh JWKS keys from the auth service.
    async fn refresh_keys(&self) -> AuthResult<()> {
        debug!("Refreshing JWKS keys");

        let response = self.http.get(self.jwks_url()).send().await?;
        if !response.status().is_success() {
            return Err(AuthError::KeyDiscovery(format!(
                "JWKS fetch returned {}",
                response.status()
            )));
        }
        let jwks: JwksResponse = response
            .json()
            .await
            .map_err(|e| AuthError::KeyDiscovery(e.to_string()))?;

        let mut keys = HashMap::new();
        for jwk in jwks.keys {
            let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
                .map_err(|e| AuthError::KeyDiscovery(format!("bad JWK {}: {}", jwk.kid, e)))?;
            keys.insert(jwk.kid, key);
        }

        let key_count = keys.len();
        *self.keys.write().await = keys;
        *self.last_refresh.write().await = Instant::now();

        debug!("Refreshed {} JWKS keys", key_count);
        Ok(())
    }

    /// Get decoding key for a key ID, refreshing the cache when stale.
    async fn get_key(&self, kid: &str) -> Option<DecodingKey> {
        let needs_refresh = {
            let last = self.last_refresh.read().await;
            last.elapsed() > JWKS_CACHE_TTL
        };

        if needs_refresh {
            if let Err(e) = self.refresh_keys().await {
                warn!("Failed to refresh JWKS keys: {}", e);
            }
        }

        self.keys.read().await.get(kid).cloned()
    }

    /// Verify a session token and produce a `Session`.
    ///
    /// Rejects on bad signature, wrong issuer/audience, or expiry.
    pub async fn verify(&self, token: &str) -> AuthResult<Session> {
        let header = decode_header(token)
            .map_err(|e| AuthError::invalid_token(format!("invalid header: {}", e)))?;

        let kid = header
            .kid
            .ok_or_else(|| AuthError::invalid_token("token missing key ID"))?;

        let key = self
            .get_key(&kid)
            .await
            .ok_or(AuthError::UnknownKey(kid))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.config.auth_url]);
        validation.set_audience(&[&self.config.audience]);

        let token_data = decode::<SessionClaims>(token, &key, &validation)
            .map_err(|e| AuthError::invalid_token(format!("validation failed: {}", e)))?;

        Ok(Session::from(token_data.claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_map_to_session() {
        let claims = SessionClaims {
            sub: "u-42".to_string(),
            email: Some("u@example.com".to_string()),
            iss: "https://auth.example.com".to_string(),
            aud: "authenticated".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
        };
        let session = Session::from(claims);
        assert_eq!(session.subject.as_str(), "u-42");
        assert_eq!(session.email.as_deref(), Some("u@example.com"));
        assert_eq!(
            (session.expires_at - session.issued_at).num_seconds(),
            3600
        );
    }
}
