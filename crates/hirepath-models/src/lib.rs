//! Shared data models for the HirePath backend.
//!
//! This crate provides Serde-serializable types for:
//! - Accounts and authorization roles
//! - Authenticated sessions
//! - Job postings
//! - Candidate applications

pub mod account;
pub mod application;
pub mod job;
pub mod role;
pub mod session;

// Re-export common types
pub use account::{Account, AccountId};
pub use application::{Application, ApplicationId, ApplicationStatus, StatusParseError};
pub use job::{EmploymentType, JobId, JobPosting, JobStatus};
pub use role::{Role, RoleParseError};
pub use session::Session;
