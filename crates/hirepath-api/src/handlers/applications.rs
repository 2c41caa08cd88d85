//! Application review handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use hirepath_models::{Application, ApplicationId, ApplicationStatus, JobId};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// List the caller's applications (candidate).
pub async fn list_my_applications(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Application>>> {
    Ok(Json(state.applications.list_for_candidate(&user.subject).await?))
}

/// List applications for one posting (admin only).
pub async fn list_job_applications(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Vec<Application>>> {
    user.require_admin()?;

    let job_id = JobId::from(job_id.as_str());
    if state.jobs.get(&job_id).await?.is_none() {
        return Err(ApiError::not_found(format!("job {}", job_id)));
    }

    Ok(Json(state.applications.list_for_job(&job_id).await?))
}

/// Status change payload.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: ApplicationStatus,
}

/// Move an application through review (admin only).
pub async fn update_application_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(application_id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> ApiResult<Json<Application>> {
    user.require_admin()?;

    let id = ApplicationId::from(application_id.as_str());
    let current = state
        .applications
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("application {}", application_id)))?;

    if current.status.is_terminal() {
        return Err(ApiError::Conflict(format!(
            "application already {}",
            current.status
        )));
    }

    let updated = state
        .applications
        .update_status(&id, request.status)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("application {}", application_id)))?;

    info!(
        "Admin {} moved application {} to {}",
        user.subject, application_id, request.status
    );
    Ok(Json(updated))
}
