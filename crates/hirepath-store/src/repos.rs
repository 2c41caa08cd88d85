//! Typed repositories for accounts, jobs, and applications.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use hirepath_models::{
    Account, AccountId, Application, ApplicationId, ApplicationStatus, JobId, JobPosting,
    JobStatus, Role,
};

use crate::client::RestClient;
use crate::error::StoreResult;

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

// =============================================================================
// Accounts
// =============================================================================

/// Repository for account rows.
#[derive(Clone)]
pub struct AccountRepository {
    client: RestClient,
}

/// Partial row used for role-only lookups.
#[derive(Debug, Deserialize)]
struct RoleRow {
    #[serde(default)]
    role: Role,
}

/// Updatable profile fields.
#[derive(Debug, Default, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl AccountRepository {
    /// Create a new account repository.
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// Create an account row (called once at sign-up).
    pub async fn create(&self, account: &Account) -> StoreResult<Account> {
        let created = self.client.insert("accounts", account).await?;
        info!("Created account row: {}", account.id);
        Ok(created)
    }

    /// Get an account by ID.
    pub async fn get(&self, id: &AccountId) -> StoreResult<Option<Account>> {
        self.client
            .select_one("accounts", &[("id", eq(id)), ("select", "*".to_string())])
            .await
    }

    /// Get just the role for an account.
    ///
    /// The gate calls this on every authorized request; the projection
    /// keeps the payload to one column.
    pub async fn role(&self, id: &AccountId) -> StoreResult<Option<Role>> {
        let row: Option<RoleRow> = self
            .client
            .select_one("accounts", &[("id", eq(id)), ("select", "role".to_string())])
            .await?;
        Ok(row.map(|r| r.role))
    }

    /// List all accounts, newest first.
    pub async fn list(&self) -> StoreResult<Vec<Account>> {
        self.client
            .select(
                "accounts",
                &[
                    ("select", "*".to_string()),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await
    }

    /// Update profile fields, returning the updated account.
    pub async fn update_profile(
        &self,
        id: &AccountId,
        patch: &ProfilePatch,
    ) -> StoreResult<Option<Account>> {
        self.client.update("accounts", &[("id", eq(id))], patch).await
    }
}

// =============================================================================
// Jobs
// =============================================================================

/// Repository for job posting rows.
#[derive(Clone)]
pub struct JobRepository {
    client: RestClient,
}

/// Updatable job posting fields.
#[derive(Debug, Default, Serialize)]
pub struct JobPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    /// Always bumped on update.
    pub updated_at: chrono::DateTime<Utc>,
}

impl JobPatch {
    pub fn new() -> Self {
        Self {
            updated_at: Utc::now(),
            ..Default::default()
        }
    }
}

impl JobRepository {
    /// Create a new job repository.
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// List open postings, newest first.
    pub async fn list_open(&self) -> StoreResult<Vec<JobPosting>> {
        self.client
            .select(
                "jobs",
                &[
                    ("status", eq(JobStatus::Open)),
                    ("select", "*".to_string()),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await
    }

    /// List all postings regardless of status, newest first.
    pub async fn list_all(&self) -> StoreResult<Vec<JobPosting>> {
        self.client
            .select(
                "jobs",
                &[
                    ("select", "*".to_string()),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await
    }

    /// Get a posting by ID.
    pub async fn get(&self, id: &JobId) -> StoreResult<Option<JobPosting>> {
        self.client
            .select_one("jobs", &[("id", eq(id)), ("select", "*".to_string())])
            .await
    }

    /// Create a new posting.
    pub async fn create(&self, job: &JobPosting) -> StoreResult<JobPosting> {
        let created = self.client.insert("jobs", job).await?;
        info!("Created job posting: {}", job.id);
        Ok(created)
    }

    /// Update a posting, returning the stored row.
    pub async fn update(&self, id: &JobId, patch: &JobPatch) -> StoreResult<Option<JobPosting>> {
        self.client.update("jobs", &[("id", eq(id))], patch).await
    }

    /// Delete a posting.
    pub async fn delete(&self, id: &JobId) -> StoreResult<()> {
        self.client.delete("jobs", &[("id", eq(id))]).await?;
        info!("Deleted job posting: {}", id);
        Ok(())
    }
}

// =============================================================================
// Applications
// =============================================================================

/// Repository for application rows.
#[derive(Clone)]
pub struct ApplicationRepository {
    client: RestClient,
}

#[derive(Debug, Serialize)]
struct StatusPatch {
    status: ApplicationStatus,
    updated_at: chrono::DateTime<Utc>,
}

impl ApplicationRepository {
    /// Create a new application repository.
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// Submit a new application.
    pub async fn create(&self, application: &Application) -> StoreResult<Application> {
        let created = self.client.insert("applications", application).await?;
        info!(
            "Candidate {} applied to job {}",
            application.candidate_id, application.job_id
        );
        Ok(created)
    }

    /// Get an application by ID.
    pub async fn get(&self, id: &ApplicationId) -> StoreResult<Option<Application>> {
        self.client
            .select_one(
                "applications",
                &[("id", eq(id)), ("select", "*".to_string())],
            )
            .await
    }

    /// List a candidate's applications, newest first.
    pub async fn list_for_candidate(&self, candidate: &AccountId) -> StoreResult<Vec<Application>> {
        self.client
            .select(
                "applications",
                &[
                    ("candidate_id", eq(candidate)),
                    ("select", "*".to_string()),
                    ("order", "submitted_at.desc".to_string()),
                ],
            )
            .await
    }

    /// List applications for one posting, newest first.
    pub async fn list_for_job(&self, job: &JobId) -> StoreResult<Vec<Application>> {
        self.client
            .select(
                "applications",
                &[
                    ("job_id", eq(job)),
                    ("select", "*".to_string()),
                    ("order", "submitted_at.desc".to_string()),
                ],
            )
            .await
    }

    /// Check whether a candidate already applied to a posting.
    pub async fn exists(&self, job: &JobId, candidate: &AccountId) -> StoreResult<bool> {
        let row: Option<serde_json::Value> = self
            .client
            .select_one(
                "applications",
                &[
                    ("job_id", eq(job)),
                    ("candidate_id", eq(candidate)),
                    ("select", "id".to_string()),
                ],
            )
            .await?;
        Ok(row.is_some())
    }

    /// Move an application to a new review status.
    pub async fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> StoreResult<Option<Application>> {
        let patch = StatusPatch {
            status,
            updated_at: Utc::now(),
        };
        self.client
            .update("applications", &[("id", eq(id))], &patch)
            .await
    }
}
