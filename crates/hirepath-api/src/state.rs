//! Application state.

use std::sync::Arc;

use hirepath_auth::{AuthClient, JwtVerifier};
use hirepath_gate::{Gate, RoutePolicy};
use hirepath_store::{AccountRepository, ApplicationRepository, JobRepository, RestClient};

use crate::auth::{StoreRoles, VerifierSessions};
use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub accounts: AccountRepository,
    pub jobs: JobRepository,
    pub applications: ApplicationRepository,
    pub auth: Arc<AuthClient>,
    pub verifier: Arc<JwtVerifier>,
    pub gate: Gate,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = RestClient::from_env()?;
        let accounts = AccountRepository::new(store.clone());
        let jobs = JobRepository::new(store.clone());
        let applications = ApplicationRepository::new(store);

        let auth = Arc::new(AuthClient::from_env()?);
        let verifier = Arc::new(JwtVerifier::from_env().await?);

        let gate = Gate::new(
            RoutePolicy::default(),
            Arc::new(VerifierSessions(Arc::clone(&verifier))),
            Arc::new(StoreRoles(accounts.clone())),
        )
        .with_lookup_timeout(config.gate_lookup_timeout);

        Ok(Self {
            config,
            accounts,
            jobs,
            applications,
            auth,
            verifier,
            gate,
        })
    }
}
