//! PostgREST-style client for the hosted relational backend.
//!
//! Production-grade client with:
//! - HTTP client tuning (pooling, timeouts)
//! - Exponential backoff with jitter on idempotent requests
//! - Observability (tracing spans, metrics)

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::metrics::record_request;
use crate::retry::{with_retry, RetryConfig};

// =============================================================================
// Configuration
// =============================================================================

/// Store client configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the hosted backend's REST surface.
    pub base_url: String,
    /// Service key sent as `apikey` and bearer token.
    pub service_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
}

impl StoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        let base_url = std::env::var("STORE_URL")
            .map_err(|_| StoreError::auth_error("STORE_URL must be set to reach the store"))?;

        if base_url.is_empty() {
            return Err(StoreError::auth_error("STORE_URL cannot be empty"));
        }

        let service_key = std::env::var("STORE_SERVICE_KEY")
            .map_err(|_| StoreError::auth_error("STORE_SERVICE_KEY must be set"))?;

        let connect_timeout_secs: u64 = std::env::var("STORE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            base_url,
            service_key,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryConfig::from_env(),
        })
    }
}

// =============================================================================
// Client
// =============================================================================

/// Client for the hosted store's REST surface.
#[derive(Clone)]
pub struct RestClient {
    http: Client,
    config: StoreConfig,
    base_url: String,
}

impl RestClient {
    /// Create a new store client.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("hirepath-store/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StoreError::Network)?;

        let base_url = format!("{}/rest/v1", config.base_url.trim_end_matches('/'));

        Ok(Self {
            http,
            config,
            base_url,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Self::new(StoreConfig::from_env()?)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
    }

    // =========================================================================
    // Row Operations
    // =========================================================================

    /// Select rows matching the given filters.
    ///
    /// Filters use the store's query operators, e.g. `("id", "eq.u-1")`.
    pub async fn select<T>(&self, table: &str, filters: &[(&str, String)]) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let operation = "select";
        self.instrumented(operation, table, || async {
            let response = self
                .authorized(self.http.get(self.table_url(table)).query(filters))
                .send()
                .await?;
            Self::decode_rows(table, response).await
        })
        .await
    }

    /// Select at most one row matching the given filters.
    pub async fn select_one<T>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let mut rows: Vec<T> = self.select(table, filters).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// Insert a row, returning the stored representation.
    ///
    /// Not retried: insertion is not idempotent.
    pub async fn insert<T, B>(&self, table: &str, row: &B) -> StoreResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let start = Instant::now();
        let result = async {
            let response = self
                .authorized(self.http.post(self.table_url(table)))
                .header("Prefer", "return=representation")
                .json(row)
                .send()
                .await?;

            let status = response.status();
            match status {
                StatusCode::OK | StatusCode::CREATED => {
                    let mut rows: Vec<T> = response.json().await?;
                    if rows.is_empty() {
                        Err(StoreError::invalid_response(format!(
                            "{}: insert returned no rows",
                            table
                        )))
                    } else {
                        Ok(rows.swap_remove(0))
                    }
                }
                StatusCode::CONFLICT => Err(StoreError::AlreadyExists(table.to_string())),
                _ => Err(Self::handle_error_response(table, status, response).await),
            }
        }
        .await;

        record_latency("insert", &result, start);
        result
    }

    /// Update rows matching the filters, returning the first updated row.
    pub async fn update<T, B>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        patch: &B,
    ) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let operation = "update";
        self.instrumented(operation, table, || async {
            let response = self
                .authorized(self.http.patch(self.table_url(table)).query(filters))
                .header("Prefer", "return=representation")
                .json(patch)
                .send()
                .await?;
            let mut rows: Vec<T> = Self::decode_rows(table, response).await?;
            Ok(if rows.is_empty() {
                None
            } else {
                Some(rows.swap_remove(0))
            })
        })
        .await
    }

    /// Delete rows matching the filters.
    pub async fn delete(&self, table: &str, filters: &[(&str, String)]) -> StoreResult<()> {
        let operation = "delete";
        self.instrumented(operation, table, || async {
            let response = self
                .authorized(self.http.delete(self.table_url(table)).query(filters))
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(Self::handle_error_response(table, status, response).await)
            }
        })
        .await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Run an idempotent operation with retry and metrics.
    async fn instrumented<T, F, Fut>(&self, operation: &str, table: &str, op: F) -> StoreResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = StoreResult<T>>,
    {
        let start = Instant::now();
        debug!(operation, table, "store request");

        let result = with_retry(&self.config.retry, operation, op).await;

        record_latency(operation, &result, start);
        result
    }

    async fn decode_rows<T: DeserializeOwned>(table: &str, response: Response) -> StoreResult<Vec<T>> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::handle_error_response(table, status, response).await)
        }
    }

    async fn handle_error_response(
        table: &str,
        status: StatusCode,
        response: Response,
    ) -> StoreError {
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(1000);
            return StoreError::RateLimited(retry_after_ms);
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => {
                StoreError::auth_error(format!("{}: {}", table, body))
            }
            StatusCode::FORBIDDEN => StoreError::PermissionDenied(format!("{}: {}", table, body)),
            StatusCode::NOT_FOUND => StoreError::not_found(format!("{}: {}", table, body)),
            s if s.is_server_error() => StoreError::ServerError(s.as_u16(), body),
            s => StoreError::request_failed(format!("{} ({}): {}", table, s.as_u16(), body)),
        }
    }
}

fn record_latency<T>(operation: &str, result: &StoreResult<T>, start: Instant) {
    let status = match result {
        Ok(_) => 200,
        Err(e) => error_status(e),
    };
    record_request(operation, status, start.elapsed().as_millis() as f64);
}

fn error_status(error: &StoreError) -> u16 {
    match error {
        StoreError::AuthError(_) => 401,
        StoreError::PermissionDenied(_) => 403,
        StoreError::NotFound(_) => 404,
        StoreError::AlreadyExists(_) => 409,
        StoreError::RateLimited(_) => 429,
        StoreError::ServerError(status, _) => *status,
        _ => 0,
    }
}
