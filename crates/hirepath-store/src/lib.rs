//! REST client for the hosted relational backend.
//!
//! The store exposes a PostgREST-style HTTP surface; this crate wraps it
//! with a pooled, timeout-bounded client plus typed repositories for
//! accounts, job postings, and applications.

pub mod client;
pub mod error;
pub mod metrics;
pub mod repos;
pub mod retry;

#[cfg(test)]
mod client_tests;

pub use client::{RestClient, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use repos::{AccountRepository, ApplicationRepository, JobPatch, JobRepository, ProfilePatch};
pub use retry::RetryConfig;
