//! Auth-entry handlers: sign-in, sign-up, sign-out.
//!
//! These proxy the external auth service's credential endpoints and
//! manage the session cookie; credentials themselves are never stored.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use hirepath_models::{Account, Role};

use crate::error::ApiResult;
use crate::state::AppState;

/// Sign-in request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

/// Sign-up request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Issued-session response.
#[derive(Serialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    /// Landing path for the signed-in role.
    pub home: String,
}

fn session_cookie(state: &AppState, token: &str) -> Cookie<'static> {
    Cookie::build((state.config.session_cookie.clone(), token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure)
        .build()
}

/// Resolve the landing path for a freshly issued token.
///
/// Role lookup failure degrades to the candidate home, same as the gate.
async fn home_for_token(state: &AppState, token: &str) -> String {
    let subject = match state.verifier.verify(token).await {
        Ok(session) => session.subject,
        Err(e) => {
            warn!("Could not verify freshly issued token: {}", e);
            return Role::Candidate.home_path().to_string();
        }
    };

    match state.accounts.role(&subject).await {
        Ok(Some(role)) => role.home_path().to_string(),
        Ok(None) => Role::Candidate.home_path().to_string(),
        Err(e) => {
            warn!(subject = %subject, "Role lookup failed after sign-in: {}", e);
            Role::Candidate.home_path().to_string()
        }
    }
}

/// Sign in with email and password.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<SessionResponse>)> {
    request.validate()?;

    let token = state.auth.sign_in(&request.email, &request.password).await?;
    let home = home_for_token(&state, &token.access_token).await;

    info!("Signed in {}", request.email);

    let jar = jar.add(session_cookie(&state, &token.access_token));
    Ok((
        jar,
        Json(SessionResponse {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_in: token.expires_in,
            home,
        }),
    ))
}

/// Register a new candidate account.
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<SignupRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<SessionResponse>)> {
    request.validate()?;

    let metadata = serde_json::json!({
        "first_name": request.first_name,
        "last_name": request.last_name,
    });

    let token = state
        .auth
        .sign_up(&request.email, &request.password, Some(metadata))
        .await?;

    // Mint the account row keyed by the token's subject id.
    let session = state.verifier.verify(&token.access_token).await?;
    let account = Account {
        id: session.subject,
        email: request.email.clone(),
        first_name: Some(request.first_name),
        last_name: Some(request.last_name),
        phone: request.phone,
        role: Role::Candidate,
        created_at: Utc::now(),
    };
    state.accounts.create(&account).await?;

    info!("Registered {}", request.email);

    let jar = jar.add(session_cookie(&state, &token.access_token));
    Ok((
        StatusCode::CREATED,
        jar,
        Json(SessionResponse {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_in: token.expires_in,
            home: Role::Candidate.home_path().to_string(),
        }),
    ))
}

/// Sign out: drop the session cookie.
///
/// The token itself stays valid until expiry; revocation is the auth
/// service's concern.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<serde_json::Value>)> {
    let jar = jar.remove(Cookie::from(state.config.session_cookie.clone()));
    Ok((jar, Json(serde_json::json!({ "status": "signed_out" }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_password_fails_validation() {
        let request = LoginRequest {
            email: "a@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn bad_email_fails_validation() {
        let request = SignupRequest {
            email: "not-an-email".to_string(),
            password: "long-enough-password".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn valid_requests_pass_validation() {
        let request = LoginRequest {
            email: "a@example.com".to_string(),
            password: "long-enough-password".to_string(),
        };
        assert!(request.validate().is_ok());
    }
}
