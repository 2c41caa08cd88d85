//! Request handlers.

pub mod accounts;
pub mod applications;
pub mod auth_entry;
pub mod health;
pub mod jobs;

pub use accounts::*;
pub use applications::*;
pub use auth_entry::*;
pub use health::*;
pub use jobs::*;
