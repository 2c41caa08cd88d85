//! Job posting handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use hirepath_models::{
    Application, ApplicationId, ApplicationStatus, EmploymentType, JobId, JobPosting, JobStatus,
};
use hirepath_store::JobPatch;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// List open postings (public).
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<JobPosting>>> {
    Ok(Json(state.jobs.list_open().await?))
}

/// Get one posting (public).
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobPosting>> {
    let job = state
        .jobs
        .get(&JobId::from(job_id.as_str()))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("job {}", job_id)))?;
    Ok(Json(job))
}

/// Application form payload.
#[derive(Debug, Deserialize, Validate)]
pub struct ApplyRequest {
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[validate(url)]
    #[serde(default)]
    pub resume_url: Option<String>,
}

/// Apply to a posting (candidate only).
pub async fn apply_to_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<String>,
    Json(request): Json<ApplyRequest>,
) -> ApiResult<(StatusCode, Json<Application>)> {
    request.validate()?;

    if user.is_admin() {
        return Err(ApiError::forbidden("Admins cannot submit applications"));
    }

    let job_id = JobId::from(job_id.as_str());
    let job = state
        .jobs
        .get(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("job {}", job_id)))?;

    if !job.is_open() {
        return Err(ApiError::bad_request("This posting is no longer accepting applications"));
    }

    if state.applications.exists(&job_id, &user.subject).await? {
        return Err(ApiError::Conflict("You already applied to this posting".to_string()));
    }

    let now = Utc::now();
    let application = Application {
        id: ApplicationId::new(),
        job_id,
        candidate_id: user.subject,
        cover_letter: request.cover_letter,
        resume_url: request.resume_url,
        status: ApplicationStatus::Submitted,
        submitted_at: now,
        updated_at: now,
    };

    let created = state.applications.create(&application).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// New posting payload (admin).
#[derive(Debug, Deserialize, Validate)]
pub struct JobCreateRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 200))]
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[validate(length(min = 1))]
    pub description: String,
    #[serde(default)]
    pub employment_type: EmploymentType,
    #[serde(default)]
    pub salary_range: Option<String>,
}

/// Create a posting (admin only).
pub async fn create_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<JobCreateRequest>,
) -> ApiResult<(StatusCode, Json<JobPosting>)> {
    user.require_admin()?;
    request.validate()?;

    let now = Utc::now();
    let job = JobPosting {
        id: JobId::new(),
        title: request.title,
        company: request.company,
        location: request.location,
        description: request.description,
        employment_type: request.employment_type,
        salary_range: request.salary_range,
        status: JobStatus::Open,
        created_by: user.subject,
        created_at: now,
        updated_at: now,
    };

    let created = state.jobs.create(&job).await?;
    info!("Admin created posting {}", created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

/// Posting update payload (admin).
#[derive(Debug, Deserialize, Validate)]
pub struct JobUpdateRequest {
    #[validate(length(min = 1, max = 200))]
    #[serde(default)]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 200))]
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[validate(length(min = 1))]
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub status: Option<JobStatus>,
}

/// Update a posting (admin only).
pub async fn update_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<String>,
    Json(request): Json<JobUpdateRequest>,
) -> ApiResult<Json<JobPosting>> {
    user.require_admin()?;
    request.validate()?;

    let patch = JobPatch {
        title: request.title,
        company: request.company,
        location: request.location,
        description: request.description,
        salary_range: request.salary_range,
        status: request.status,
        updated_at: Utc::now(),
    };

    let job = state
        .jobs
        .update(&JobId::from(job_id.as_str()), &patch)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("job {}", job_id)))?;
    Ok(Json(job))
}

/// Delete a posting (admin only).
pub async fn delete_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<StatusCode> {
    user.require_admin()?;

    let job_id = JobId::from(job_id.as_str());
    if state.jobs.get(&job_id).await?.is_none() {
        return Err(ApiError::not_found(format!("job {}", job_id)));
    }

    state.jobs.delete(&job_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_request_rejects_bad_resume_url() {
        let request = ApplyRequest {
            cover_letter: None,
            resume_url: Some("not a url".to_string()),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn job_create_request_requires_title() {
        let request = JobCreateRequest {
            title: String::new(),
            company: "Acme".to_string(),
            location: None,
            description: "desc".to_string(),
            employment_type: EmploymentType::FullTime,
            salary_range: None,
        };
        assert!(request.validate().is_err());
    }
}
