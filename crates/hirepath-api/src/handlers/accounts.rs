//! Account and dashboard handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use hirepath_models::{Account, Application, JobPosting};
use hirepath_store::ProfilePatch;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Get the caller's account row.
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Account>> {
    let account = state
        .accounts
        .get(&user.subject)
        .await?
        .ok_or_else(|| ApiError::not_found("account"))?;
    Ok(Json(account))
}

/// Profile update payload.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdateRequest {
    #[validate(length(min = 1, max = 100))]
    #[serde(default)]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    #[serde(default)]
    pub last_name: Option<String>,
    #[validate(length(max = 30))]
    #[serde(default)]
    pub phone: Option<String>,
}

/// Update the caller's profile.
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ProfileUpdateRequest>,
) -> ApiResult<Json<Account>> {
    request.validate()?;

    let patch = ProfilePatch {
        first_name: request.first_name,
        last_name: request.last_name,
        phone: request.phone,
    };

    let account = state
        .accounts
        .update_profile(&user.subject, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("account"))?;
    Ok(Json(account))
}

/// Candidate dashboard data.
#[derive(Serialize)]
pub struct DashboardResponse {
    pub account: Option<Account>,
    pub applications: Vec<Application>,
}

/// Candidate dashboard: profile plus application history.
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<DashboardResponse>> {
    let account = state.accounts.get(&user.subject).await?;
    let applications = state.applications.list_for_candidate(&user.subject).await?;
    Ok(Json(DashboardResponse {
        account,
        applications,
    }))
}

/// Admin overview data.
#[derive(Serialize)]
pub struct AdminOverviewResponse {
    pub total_jobs: usize,
    pub open_jobs: usize,
    pub recent_jobs: Vec<JobPosting>,
}

/// Admin home: posting counts and the latest postings.
pub async fn admin_overview(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<AdminOverviewResponse>> {
    user.require_admin()?;

    let jobs = state.jobs.list_all().await?;
    let open_jobs = jobs.iter().filter(|j| j.is_open()).count();
    let total_jobs = jobs.len();
    let recent_jobs = jobs.into_iter().take(10).collect();

    Ok(Json(AdminOverviewResponse {
        total_jobs,
        open_jobs,
        recent_jobs,
    }))
}

/// List all accounts (admin only).
pub async fn list_accounts(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Account>>> {
    user.require_admin()?;
    Ok(Json(state.accounts.list().await?))
}
