//! Access gate wiring and the authenticated-user extractor.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use hirepath_auth::{extract_token, JwtVerifier};
use hirepath_gate::{Decision, RoleLookup, SessionResolver};
use hirepath_models::{AccountId, Role, Session};
use hirepath_store::AccountRepository;

use crate::error::ApiError;
use crate::metrics::record_gate_decision;
use crate::state::AppState;

/// Session resolver backed by the auth service's JWKS verifier.
pub struct VerifierSessions(pub Arc<JwtVerifier>);

#[async_trait]
impl SessionResolver for VerifierSessions {
    async fn resolve(&self, token: &str) -> anyhow::Result<Session> {
        Ok(self.0.verify(token).await?)
    }
}

/// Role lookup backed by the account store.
pub struct StoreRoles(pub AccountRepository);

#[async_trait]
impl RoleLookup for StoreRoles {
    async fn role(&self, subject: &AccountId) -> anyhow::Result<Option<Role>> {
        Ok(self.0.role(subject).await?)
    }
}

/// Access gate middleware.
///
/// Runs the gate on every request; paths outside the intercepted prefix
/// set come back `Allow` without any lookups.
pub async fn access_gate(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(|q| q.to_string());
    let token = extract_token(request.headers(), &state.config.session_cookie);

    let decision = state
        .gate
        .evaluate(&path, query.as_deref(), token.as_deref())
        .await;

    let class = state
        .gate
        .policy()
        .classify(&path)
        .map(|c| c.as_str())
        .unwrap_or("bypass");
    record_gate_decision(class, decision.as_str());

    match decision {
        Decision::Allow => next.run(request).await,
        Decision::Redirect { location } => Redirect::temporary(&location).into_response(),
    }
}

/// Authenticated user extracted from request evidence.
///
/// Handlers use this to re-check role server-side; the gate only guards
/// page-shaped traffic, direct API calls land here.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub subject: AccountId,
    pub email: Option<String>,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Reject non-admin callers.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Admin access required"))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers, &state.config.session_cookie)
            .ok_or_else(|| ApiError::unauthorized("Missing session token"))?;

        let session = state.verifier.verify(&token).await?;

        if session.is_expired() {
            return Err(ApiError::unauthorized("Session expired"));
        }

        // Missing account row degrades to the default (lowest) role.
        let role = state
            .accounts
            .role(&session.subject)
            .await?
            .unwrap_or_default();

        Ok(AuthUser {
            subject: session.subject,
            email: session.email,
            role,
        })
    }
}
