//! Axum HTTP API server for the HirePath job board.
//!
//! This crate provides:
//! - The access-gate middleware guarding role-tiered route groups
//! - JSON handlers for jobs, applications, accounts, and auth entry
//! - Security headers, request ids, CORS, and per-IP rate limiting
//! - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
