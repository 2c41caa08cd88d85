//! Role-based access gate.
//!
//! Intercepts requests whose path falls inside a static prefix table,
//! resolves the caller's session and role, and produces exactly one
//! decision: pass the request through, or redirect it.
//!
//! The gate never errors: session resolution failures degrade to "no
//! session" (fail open to the sign-in redirect) and role lookup failures
//! degrade to "not admin" (fail closed away from admin paths).

pub mod decision;
pub mod gate;
pub mod policy;

pub use decision::{decide, Decision};
pub use gate::{Gate, RoleLookup, SessionResolver};
pub use policy::{RouteClass, RoutePolicy, REDIRECTED_FROM_PARAM, SIGN_IN_PATH};
